use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config_handlers, handlers, state::AppState};

/// Create the main application router with all API endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Records
        .route(
            "/api/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/api/records/:id", delete(handlers::delete_record))
        // Derived views
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/report", get(handlers::get_report))
        // Configuration
        .route(
            "/api/config",
            get(config_handlers::get_config).patch(config_handlers::patch_config),
        )
        .route("/api/config/categories", post(config_handlers::add_category))
        .route(
            "/api/config/categories/:name",
            delete(config_handlers::remove_category),
        )
        .route("/api/config/branches", post(config_handlers::add_branch))
        .route(
            "/api/config/branches/:name",
            delete(config_handlers::remove_branch),
        )
        .route("/api/config/sales", put(config_handlers::set_monthly_sales))
        .route(
            "/api/config/threshold",
            put(config_handlers::set_waste_threshold),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
