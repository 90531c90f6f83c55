use std::collections::HashMap;

use models::{BranchSummary, CategorySummary, WasteRecord};
use rust_decimal::Decimal;

use crate::money::{round2, saturating_sum};

/// Groups records by `key`, summing value and counting per group.
///
/// Groups start in first-seen order and are then sorted by descending total with a
/// stable sort, so ties keep first-seen order.
fn group_by<F>(records: &[WasteRecord], key: F) -> Vec<(String, Decimal, usize)>
where
    F: Fn(&WasteRecord) -> &str,
{
    let mut groups: Vec<(String, Decimal, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in records {
        let k = key(r);
        match index.get(k) {
            Some(&i) => {
                groups[i].1 = groups[i].1.saturating_add(r.value);
                groups[i].2 += 1;
            }
            None => {
                index.insert(k, groups.len());
                groups.push((k.to_string(), r.value, 1));
            }
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

pub fn aggregate_by_branch(records: &[WasteRecord]) -> Vec<BranchSummary> {
    group_by(records, |r| r.branch.as_str())
        .into_iter()
        .map(|(branch, total, count)| BranchSummary {
            branch,
            total,
            count,
        })
        .collect()
}

pub fn aggregate_by_category(records: &[WasteRecord]) -> Vec<CategorySummary> {
    group_by(records, |r| r.category.as_str())
        .into_iter()
        .map(|(category, total, count)| CategorySummary {
            category,
            total,
            count,
        })
        .collect()
}

/// Sum of record values, clamped at `Decimal::MAX`.
pub fn total_value(records: &[WasteRecord]) -> Decimal {
    saturating_sum(records.iter().map(|r| r.value))
}

/// Mean value per record rounded to cents, zero for an empty list.
pub fn average_value(records: &[WasteRecord]) -> Decimal {
    if records.is_empty() {
        return Decimal::ZERO;
    }
    round2(total_value(records) / Decimal::from(records.len()))
}
