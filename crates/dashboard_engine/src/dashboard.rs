use chrono::{DateTime, Utc};
use models::{AppConfig, Dashboard, DashboardMetadata, WasteRecord};

use crate::aggregate::{aggregate_by_branch, aggregate_by_category, average_value, total_value};
use crate::budget::{branches_over_threshold, budget_statuses, global_status};
use crate::filter::records_in_month;
use crate::money::round2;
use crate::trend::{monthly_trend, DASHBOARD_TREND_MONTHS};

/// Builds the dashboard for the `YYYY-MM` month.
///
/// Summaries and budget statuses cover only that month; the trend spans the full record set.
pub fn build_dashboard(
    records: &[WasteRecord],
    config: &AppConfig,
    month: &str,
    generated_at: DateTime<Utc>,
) -> Dashboard {
    let period = records_in_month(records, month);
    let budget = budget_statuses(&period, config);
    let branches_over_threshold = branches_over_threshold(&budget);

    Dashboard {
        metadata: DashboardMetadata {
            generated_at: generated_at.to_rfc3339(),
            month: month.to_string(),
        },
        total: round2(total_value(&period)),
        count: period.len(),
        average: average_value(&period),
        branches: aggregate_by_branch(&period),
        categories: aggregate_by_category(&period),
        trend: monthly_trend(records, DASHBOARD_TREND_MONTHS),
        global: global_status(&period, config, None),
        budget,
        branches_over_threshold,
    }
}
