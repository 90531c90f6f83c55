use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use dashboard_engine::{
    build_dashboard, build_report, filter_records, round2, sort_records, total_value,
};
use models::{NewWasteRecord, RecordFilter, RecordSort, SortDirection, SortField, WasteRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
    Result,
};

/// Query string shared by the record list and the report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub branch: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortField>,
    pub dir: Option<SortDirection>,
}

impl RecordQuery {
    pub fn into_parts(self) -> (RecordFilter, RecordSort) {
        let filter = RecordFilter {
            branch: self.branch,
            category: self.category,
            date_from: self.date_from,
            date_to: self.date_to,
            search: self.search,
        };
        let sort = RecordSort {
            sort: self.sort.unwrap_or_default(),
            dir: self.dir.unwrap_or_default(),
        };
        (filter, sort)
    }
}

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub records: Vec<WasteRecord>,
    pub count: usize,
    pub total: Decimal,
}

/// GET /api/records
pub async fn list_records(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> Result<impl IntoResponse> {
    let (filter, sort) = query.into_parts();
    let all = state.records.list_all().await?;

    let mut records = filter_records(&all, &filter);
    sort_records(&mut records, sort);
    let total = round2(total_value(&records));

    Ok(Json(RecordList {
        count: records.len(),
        total,
        records,
    }))
}

/// POST /api/records
pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(record): ApiJson<NewWasteRecord>,
) -> Result<impl IntoResponse> {
    let config = store::get_or_init(state.config.as_ref()).await?;
    let stored = store::submit_record(state.records.as_ref(), &config, record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// DELETE /api/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse> {
    state.records.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub month: Option<String>,
}

/// Accepts `YYYY-MM`; anything else is rejected rather than matching no records.
pub fn parse_month(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let valid = raw.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").is_ok();
    if valid {
        Ok(raw.to_string())
    } else {
        Err(ApiError::InvalidMonth(raw.to_string()))
    }
}

/// GET /api/dashboard
/// Dashboard for `?month=YYYY-MM`, defaulting to the current local month
pub async fn get_dashboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let month = match query.month.as_deref().filter(|m| !m.is_empty()) {
        Some(m) => parse_month(m)?,
        None => Local::now().format("%Y-%m").to_string(),
    };

    if let Some(dashboard) = state.live.get(&month) {
        return Ok(Json(dashboard));
    }

    let generation = state.live.generation();
    let records = state.records.list_all().await?;
    let config = store::get_or_init(state.config.as_ref()).await?;
    let dashboard = build_dashboard(&records, &config, &month, Utc::now());
    tracing::debug!(
        "Computed dashboard for {} over {} records",
        month,
        records.len()
    );
    state.live.store(generation, &dashboard);

    Ok(Json(dashboard))
}

/// GET /api/report
pub async fn get_report(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> Result<impl IntoResponse> {
    let (filter, sort) = query.into_parts();
    let records = state.records.list_all().await?;
    let config = store::get_or_init(state.config.as_ref()).await?;
    let options = dashboard_engine::ReportOptions {
        currency_symbol: state.currency_symbol.clone(),
    };

    let report = build_report(&records, &config, &filter, sort, &options, Utc::now());
    Ok(Json(report))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mermas-api"
    }))
}
