use models::{AppConfig, BudgetStatus, GlobalStatus, WasteRecord, WasteStatus};
use rust_decimal::Decimal;

use crate::aggregate::total_value;
use crate::money::{round2, saturating_sum};

/// Status reported for any branch without configured sales, whatever its waste.
/// Zero sales means there is not enough data to raise an alert.
pub const ZERO_SALES_STATUS: WasteStatus = WasteStatus::Safe;

/// Share of the threshold at which a branch enters `warning`.
pub fn warning_ratio() -> Decimal {
    Decimal::new(8, 1)
}

/// Threshold ratio expressed as a percentage, e.g. 0.03 -> 3.
pub fn threshold_pct(waste_threshold: Decimal) -> Decimal {
    waste_threshold.saturating_mul(Decimal::ONE_HUNDRED)
}

/// `waste / sales * 100` rounded to cents, zero when there are no sales.
/// A ratio too large to represent reads as `Decimal::MAX`.
pub fn waste_percentage(waste: Decimal, sales: Decimal) -> Decimal {
    if sales <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    waste
        .checked_div(sales)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::MAX, round2)
}

pub fn classify(percentage: Decimal, threshold_pct: Decimal) -> WasteStatus {
    if percentage >= threshold_pct {
        WasteStatus::Danger
    } else if percentage >= threshold_pct.saturating_mul(warning_ratio()) {
        WasteStatus::Warning
    } else {
        WasteStatus::Safe
    }
}

/// Percentage and status for a waste amount against sales and the configured ratio.
pub fn evaluate(waste: Decimal, sales: Decimal, waste_threshold: Decimal) -> (Decimal, WasteStatus) {
    if sales <= Decimal::ZERO {
        return (Decimal::ZERO, ZERO_SALES_STATUS);
    }
    let percentage = waste_percentage(waste, sales);
    (percentage, classify(percentage, threshold_pct(waste_threshold)))
}

/// One status per configured branch, in configuration order.
///
/// `period_records` must already be narrowed to the active period.
pub fn budget_statuses(period_records: &[WasteRecord], config: &AppConfig) -> Vec<BudgetStatus> {
    config
        .branches
        .iter()
        .map(|branch| {
            let waste = saturating_sum(
                period_records
                    .iter()
                    .filter(|r| &r.branch == branch)
                    .map(|r| r.value),
            );
            let sales = config.sales_for(branch);
            let (percentage, status) = evaluate(waste, sales, config.waste_threshold);
            BudgetStatus {
                branch: branch.clone(),
                sales,
                waste: round2(waste),
                percentage,
                threshold: threshold_pct(config.waste_threshold),
                status,
            }
        })
        .collect()
}

/// Aggregate status of the period. Sales are the selected branch's when a branch
/// filter is active, otherwise the sum over all configured branches.
pub fn global_status(
    period_records: &[WasteRecord],
    config: &AppConfig,
    branch_filter: Option<&str>,
) -> GlobalStatus {
    let waste = total_value(period_records);
    let sales = match branch_filter {
        Some(branch) => config.sales_for(branch),
        None => saturating_sum(config.branches.iter().map(|b| config.sales_for(b))),
    };
    let (percentage, status) = evaluate(waste, sales, config.waste_threshold);
    GlobalStatus {
        sales,
        waste: round2(waste),
        percentage,
        threshold: threshold_pct(config.waste_threshold),
        status,
    }
}

pub fn branches_over_threshold(statuses: &[BudgetStatus]) -> usize {
    statuses
        .iter()
        .filter(|s| s.status == WasteStatus::Danger)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{d, record};
    use std::collections::BTreeMap;

    fn config(sales: &[(&str, &str)]) -> AppConfig {
        AppConfig {
            categories: vec!["X".to_string()],
            branches: sales.iter().map(|(b, _)| b.to_string()).collect(),
            monthly_sales: sales
                .iter()
                .map(|(b, s)| (b.to_string(), d(s)))
                .collect::<BTreeMap<_, _>>(),
            waste_threshold: d("0.03"),
        }
    }

    #[test]
    fn test_classification_bands() {
        let threshold = d("0.03");
        assert_eq!(
            evaluate(d("35"), d("1000"), threshold),
            (d("3.5"), WasteStatus::Danger)
        );
        assert_eq!(
            evaluate(d("25"), d("1000"), threshold),
            (d("2.5"), WasteStatus::Warning)
        );
        assert_eq!(
            evaluate(d("10"), d("1000"), threshold),
            (d("1.0"), WasteStatus::Safe)
        );
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let threshold = d("0.03");
        assert_eq!(evaluate(d("30"), d("1000"), threshold).1, WasteStatus::Danger);
        assert_eq!(evaluate(d("24"), d("1000"), threshold).1, WasteStatus::Warning);
        assert_eq!(evaluate(d("23.99"), d("1000"), threshold).1, WasteStatus::Safe);
    }

    #[test]
    fn test_zero_sales_is_always_safe() {
        assert_eq!(ZERO_SALES_STATUS, WasteStatus::Safe);
        assert_eq!(
            evaluate(d("5000"), Decimal::ZERO, d("0.03")),
            (Decimal::ZERO, WasteStatus::Safe)
        );
        // even a zero threshold does not turn a branch without sales into danger
        assert_eq!(evaluate(d("1"), Decimal::ZERO, Decimal::ZERO).1, WasteStatus::Safe);
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        assert_eq!(waste_percentage(d("1"), d("3")), d("33.33"));
        assert_eq!(waste_percentage(d("2"), d("3")), d("66.67"));
        assert_eq!(threshold_pct(d("0.03")), d("3"));
        assert_eq!(d("3") * warning_ratio(), d("2.4"));
    }

    #[test]
    fn test_extreme_amounts_saturate_instead_of_panicking() {
        let waste = d("100000000000000000000000000");
        let (percentage, status) = evaluate(waste, d("0.01"), d("0.03"));
        assert_eq!(percentage, Decimal::MAX);
        assert_eq!(status, WasteStatus::Danger);
        assert_eq!(waste_percentage(d("1"), d("0.0000000000000000000000000001")), Decimal::MAX);
        assert_eq!(threshold_pct(Decimal::MAX), Decimal::MAX);

        let huge = "50000000000000000000000000000";
        let cfg = config(&[("A", huge), ("B", huge)]);
        let records = vec![
            record("1", "A", "X", "2024-01-05", huge),
            record("2", "A", "X", "2024-01-06", huge),
        ];
        let statuses = budget_statuses(&records, &cfg);
        assert_eq!(statuses[0].waste, Decimal::MAX);
        let global = global_status(&records, &cfg, None);
        assert_eq!(global.sales, Decimal::MAX);
        assert_eq!(global.waste, Decimal::MAX);
        assert_eq!(global.status, WasteStatus::Danger);
    }

    #[test]
    fn test_budget_statuses_follow_config_order() {
        let cfg = config(&[("A", "1000"), ("B", "0"), ("C", "2000")]);
        let records = vec![
            record("1", "A", "X", "2024-01-05", "35"),
            record("2", "B", "X", "2024-01-06", "999"),
            record("3", "C", "X", "2024-01-07", "10"),
            record("4", "Z", "X", "2024-01-07", "10"),
        ];
        let statuses = budget_statuses(&records, &cfg);
        let summary: Vec<(&str, WasteStatus)> = statuses
            .iter()
            .map(|s| (s.branch.as_str(), s.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", WasteStatus::Danger),
                ("B", WasteStatus::Safe),
                ("C", WasteStatus::Safe),
            ]
        );
        assert_eq!(statuses[0].threshold, d("3"));
        assert_eq!(statuses[1].waste, d("999"));
        assert_eq!(statuses[1].percentage, Decimal::ZERO);
        assert_eq!(statuses[2].percentage, d("0.5"));
        assert_eq!(branches_over_threshold(&statuses), 1);
    }

    #[test]
    fn test_unset_sales_count_as_zero() {
        let mut cfg = config(&[("A", "1000")]);
        cfg.branches.push("New".to_string());
        let records = vec![record("1", "New", "X", "2024-01-05", "100")];
        let statuses = budget_statuses(&records, &cfg);
        assert_eq!(statuses[1].sales, Decimal::ZERO);
        assert_eq!(statuses[1].status, WasteStatus::Safe);
    }

    #[test]
    fn test_global_status_all_branches_and_selected_branch() {
        let cfg = config(&[("A", "1000"), ("B", "1000")]);
        let records = vec![
            record("1", "A", "X", "2024-01-05", "45"),
            record("2", "B", "X", "2024-01-06", "5"),
        ];
        let global = global_status(&records, &cfg, None);
        assert_eq!(global.sales, d("2000"));
        assert_eq!(global.waste, d("50"));
        assert_eq!(global.percentage, d("2.5"));
        assert_eq!(global.status, WasteStatus::Warning);

        let only_a: Vec<WasteRecord> = records.iter().filter(|r| r.branch == "A").cloned().collect();
        let selected = global_status(&only_a, &cfg, Some("A"));
        assert_eq!(selected.sales, d("1000"));
        assert_eq!(selected.percentage, d("4.5"));
        assert_eq!(selected.status, WasteStatus::Danger);
    }
}
