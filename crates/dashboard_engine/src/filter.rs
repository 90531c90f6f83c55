use models::{RecordFilter, RecordSort, SortDirection, SortField, WasteRecord};

/// Returns true when the record satisfies every active predicate of the filter.
///
/// Dates are compared as strings, which is valid for the fixed-width `YYYY-MM-DD` format.
pub fn matches(record: &WasteRecord, filter: &RecordFilter) -> bool {
    if let Some(branch) = filter.branch() {
        if record.branch != branch {
            return false;
        }
    }
    if let Some(category) = filter.category() {
        if record.category != category {
            return false;
        }
    }
    if let Some(from) = filter.date_from() {
        if record.date.as_str() < from {
            return false;
        }
    }
    if let Some(to) = filter.date_to() {
        if record.date.as_str() > to {
            return false;
        }
    }
    if let Some(search) = filter.search() {
        let needle = search.to_lowercase();
        let found = [
            &record.code,
            &record.description,
            &record.inventory_number,
            &record.notes,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
        if !found {
            return false;
        }
    }
    true
}

/// Subsequence of `records` matching the filter, in input order.
pub fn filter_records(records: &[WasteRecord], filter: &RecordFilter) -> Vec<WasteRecord> {
    records
        .iter()
        .filter(|r| matches(r, filter))
        .cloned()
        .collect()
}

/// Records whose date falls in the given `YYYY-MM` month.
pub fn records_in_month(records: &[WasteRecord], month: &str) -> Vec<WasteRecord> {
    records
        .iter()
        .filter(|r| r.date.starts_with(month))
        .cloned()
        .collect()
}

/// Applies only the branch and category predicates. Used before trend building,
/// which always spans the full date range.
pub fn narrow_for_trend(records: &[WasteRecord], filter: &RecordFilter) -> Vec<WasteRecord> {
    let narrowed = RecordFilter {
        branch: filter.branch.clone(),
        category: filter.category.clone(),
        ..Default::default()
    };
    filter_records(records, &narrowed)
}

/// Stable sort by the requested field.
pub fn sort_records(records: &mut [WasteRecord], sort: RecordSort) {
    records.sort_by(|a, b| {
        let cmp = match sort.sort {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Value => a.value.cmp(&b.value),
            SortField::Branch => a.branch.cmp(&b.branch),
            SortField::Category => a.category.cmp(&b.category),
        };
        match sort.dir {
            SortDirection::Asc => cmp,
            SortDirection::Desc => cmp.reverse(),
        }
    });
}

/// Human readable list of the active predicates.
pub fn describe(filter: &RecordFilter) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(v) = filter.branch() {
        parts.push(format!("Branch: {}", v));
    }
    if let Some(v) = filter.category() {
        parts.push(format!("Category: {}", v));
    }
    if let Some(v) = filter.date_from() {
        parts.push(format!("From: {}", v));
    }
    if let Some(v) = filter.date_to() {
        parts.push(format!("To: {}", v));
    }
    if let Some(v) = filter.search() {
        parts.push(format!("Search: {}", v));
    }
    parts
}

pub fn describe_line(filter: &RecordFilter) -> String {
    let parts = describe(filter);
    if parts.is_empty() {
        "No filters applied".to_string()
    } else {
        parts.join(" | ")
    }
}
