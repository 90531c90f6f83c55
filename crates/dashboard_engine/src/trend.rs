use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use models::{MonthlyTrendPoint, WasteRecord};
use rust_decimal::Decimal;

use crate::money::round2;

pub const DASHBOARD_TREND_MONTHS: usize = 6;
pub const REPORT_TREND_MONTHS: usize = 12;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// `YYYY-MM` prefix of a record date. Shorter dates bucket under themselves.
pub fn month_key(date: &str) -> &str {
    date.get(..7).unwrap_or(date)
}

/// Short display label for a `YYYY-MM` key, e.g. `ene 24`. Unparseable keys are returned as-is.
pub fn month_label(month: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d") {
        Ok(date) => format!(
            "{} {:02}",
            MONTH_ABBREVIATIONS[date.month0() as usize],
            date.year().rem_euclid(100)
        ),
        Err(_) => month.to_string(),
    }
}

/// Sums record values per month, ascending by month key, keeping the last `window` months.
///
/// Callers pass the full record set (optionally narrowed by branch or category), never a
/// date-filtered one.
pub fn monthly_trend(records: &[WasteRecord], window: usize) -> Vec<MonthlyTrendPoint> {
    let mut buckets: BTreeMap<&str, Decimal> = BTreeMap::new();
    for r in records {
        let total = buckets.entry(month_key(&r.date)).or_insert(Decimal::ZERO);
        *total = total.saturating_add(r.value);
    }
    let skip = buckets.len().saturating_sub(window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(month, total)| MonthlyTrendPoint {
            month: month.to_string(),
            label: month_label(month),
            total: round2(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{d, record};

    #[test]
    fn test_trend_sorted_and_windowed() {
        let mut records = Vec::new();
        for (i, month) in ["2024-03", "2023-11", "2024-01", "2023-12", "2024-02", "2023-10", "2023-09", "2024-04"]
            .iter()
            .enumerate()
        {
            records.push(record(&i.to_string(), "A", "X", &format!("{}-15", month), "1"));
        }
        let trend = monthly_trend(&records, DASHBOARD_TREND_MONTHS);
        let months: Vec<&str> = trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2023-11", "2023-12", "2024-01", "2024-02", "2024-03", "2024-04"]
        );

        let full = monthly_trend(&records, REPORT_TREND_MONTHS);
        assert_eq!(full.len(), 8);
        assert_eq!(full[0].month, "2023-09");
    }

    #[test]
    fn test_trend_sums_and_rounds_per_month() {
        let records = vec![
            record("1", "A", "X", "2024-01-05", "0.005"),
            record("2", "B", "X", "2024-01-25", "10"),
            record("3", "A", "X", "2024-02-01", "3.333"),
        ];
        let trend = monthly_trend(&records, 6);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].total, d("10.01"));
        assert_eq!(trend[1].total, d("3.33"));
    }

    #[test]
    fn test_month_total_clamps_at_max() {
        let huge = "50000000000000000000000000000";
        let records = vec![
            record("1", "A", "X", "2024-01-05", huge),
            record("2", "B", "X", "2024-01-25", huge),
            record("3", "A", "X", "2024-02-01", "2"),
        ];
        let trend = monthly_trend(&records, 6);
        assert_eq!(trend[0].total, Decimal::MAX);
        assert_eq!(trend[1].total, d("2"));
    }

    #[test]
    fn test_window_zero_and_empty_input() {
        let records = vec![record("1", "A", "X", "2024-01-05", "1")];
        assert!(monthly_trend(&records, 0).is_empty());
        assert!(monthly_trend(&[], 6).is_empty());
    }

    #[test]
    fn test_month_key_and_label() {
        assert_eq!(month_key("2024-01-05"), "2024-01");
        assert_eq!(month_key("2024"), "2024");
        assert_eq!(month_label("2024-01"), "ene 24");
        assert_eq!(month_label("2023-12"), "dic 23");
        assert_eq!(month_label("bogus"), "bogus");
    }
}
