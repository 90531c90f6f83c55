//! # Dashboard Engine
//!
//! Pure aggregation over waste records: filtering, per-branch and per-category
//! summaries, monthly trends and budget threshold classification. Nothing here
//! performs I/O; callers pass in the full record list and the current config and
//! recompute whenever either changes.
//!
//! ```rust,no_run
//! use dashboard_engine::{build_dashboard, filter_records};
//! use models::{AppConfig, RecordFilter};
//!
//! let records: Vec<models::WasteRecord> = vec![];
//! let config = AppConfig::default();
//! let dashboard = build_dashboard(&records, &config, "2024-02", chrono::Utc::now());
//! let only_a = filter_records(&records, &RecordFilter {
//!     branch: Some("Atitlán Central".to_string()),
//!     ..Default::default()
//! });
//! ```

pub mod aggregate;
pub mod budget;
pub mod dashboard;
pub mod filter;
pub mod money;
pub mod report;
pub mod trend;

pub use aggregate::{aggregate_by_branch, aggregate_by_category, average_value, total_value};
pub use budget::{
    branches_over_threshold, budget_statuses, classify, evaluate, global_status, threshold_pct,
    warning_ratio, waste_percentage, ZERO_SALES_STATUS,
};
pub use dashboard::build_dashboard;
pub use filter::{
    describe, describe_line, filter_records, matches, narrow_for_trend, records_in_month,
    sort_records,
};
pub use money::{format_amount, format_money, format_percentage, round2};
pub use report::{build_report, format_row, ReportOptions};
pub use trend::{month_key, month_label, monthly_trend, DASHBOARD_TREND_MONTHS, REPORT_TREND_MONTHS};
