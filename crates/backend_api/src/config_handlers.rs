use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use models::{AppConfig, ConfigPatch};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use store::admin;

use crate::{
    extract::{ApiJson, ApiPath},
    state::AppState,
    Result,
};

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdBody {
    pub waste_threshold: Decimal,
}

/// GET /api/config
/// Current configuration, initialized with defaults on first access
pub async fn get_config(State(state): State<AppState>) -> Result<Json<AppConfig>> {
    Ok(Json(store::get_or_init(state.config.as_ref()).await?))
}

/// PATCH /api/config
pub async fn patch_config(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<ConfigPatch>,
) -> Result<Json<AppConfig>> {
    Ok(Json(state.config.upsert(patch).await?))
}

/// POST /api/config/categories
pub async fn add_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NameBody>,
) -> Result<impl IntoResponse> {
    let config = state
        .config
        .update(Box::new(move |c| admin::add_category(&c, &body.name)))
        .await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// DELETE /api/config/categories/:name
pub async fn remove_category(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<AppConfig>> {
    let config = state
        .config
        .update(Box::new(move |c| admin::remove_category(&c, &name)))
        .await?;
    Ok(Json(config))
}

/// POST /api/config/branches
pub async fn add_branch(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NameBody>,
) -> Result<impl IntoResponse> {
    let config = state
        .config
        .update(Box::new(move |c| admin::add_branch(&c, &body.name)))
        .await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// DELETE /api/config/branches/:name
/// Records already filed under the branch are kept
pub async fn remove_branch(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<AppConfig>> {
    let config = state
        .config
        .update(Box::new(move |c| admin::remove_branch(&c, &name)))
        .await?;
    Ok(Json(config))
}

/// PUT /api/config/sales
/// Body is a `{branch: amount}` map; branches not listed keep their value
pub async fn set_monthly_sales(
    State(state): State<AppState>,
    ApiJson(edits): ApiJson<BTreeMap<String, Decimal>>,
) -> Result<Json<AppConfig>> {
    let config = state
        .config
        .update(Box::new(move |c| admin::set_monthly_sales(&c, edits)))
        .await?;
    Ok(Json(config))
}

/// PUT /api/config/threshold
pub async fn set_waste_threshold(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ThresholdBody>,
) -> Result<Json<AppConfig>> {
    let config = state
        .config
        .update(Box::new(move |c| admin::set_waste_threshold(&c, body.waste_threshold)))
        .await?;
    Ok(Json(config))
}
