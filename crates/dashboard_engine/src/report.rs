use chrono::{DateTime, Utc};
use models::{AppConfig, RecordFilter, RecordSort, Report, ReportMetadata, ReportRow, WasteRecord};

use crate::aggregate::{aggregate_by_branch, aggregate_by_category, total_value};
use crate::budget::{budget_statuses, global_status};
use crate::filter::{describe_line, filter_records, narrow_for_trend, sort_records};
use crate::money::{format_money, round2};
use crate::trend::{monthly_trend, REPORT_TREND_MONTHS};

const EMPTY_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub currency_symbol: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "Q".to_string(),
        }
    }
}

fn or_placeholder(s: &str) -> String {
    if s.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        s.to_string()
    }
}

/// Formats one record for export. The displayed value uses the same rounding as every total.
pub fn format_row(record: &WasteRecord, currency_symbol: &str) -> ReportRow {
    ReportRow {
        id: record.id.clone(),
        date: record.date.clone(),
        branch: record.branch.clone(),
        category: record.category.clone(),
        code: or_placeholder(&record.code),
        inventory_number: or_placeholder(&record.inventory_number),
        description: or_placeholder(&record.description),
        notes: or_placeholder(&record.notes),
        value: round2(record.value),
        value_display: format_money(record.value, currency_symbol),
    }
}

pub fn build_report(
    records: &[WasteRecord],
    config: &AppConfig,
    filter: &RecordFilter,
    sort: RecordSort,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> Report {
    let mut filtered = filter_records(records, filter);
    sort_records(&mut filtered, sort);

    let total = total_value(&filtered);
    let trend_source = narrow_for_trend(records, filter);

    Report {
        metadata: ReportMetadata {
            generated_at: generated_at.to_rfc3339(),
            filters: filter.clone(),
            filter_description: describe_line(filter),
            sort,
        },
        rows: filtered
            .iter()
            .map(|r| format_row(r, &options.currency_symbol))
            .collect(),
        count: filtered.len(),
        total: round2(total),
        total_display: format_money(total, &options.currency_symbol),
        branches: aggregate_by_branch(&filtered),
        categories: aggregate_by_category(&filtered),
        trend: monthly_trend(&trend_source, REPORT_TREND_MONTHS),
        budget: budget_statuses(&filtered, config),
        global: global_status(&filtered, config, filter.branch()),
    }
}
