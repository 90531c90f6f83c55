//! Checks applied to a waste record before it is written. A record that fails any
//! check is rejected whole; nothing is stored.

use std::sync::LazyLock;

use chrono::NaiveDate;
use models::{AppConfig, NewWasteRecord};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{Result, StoreError};

/// Largest record value or monthly sales figure accepted (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"));

/// True for a fixed-width `YYYY-MM-DD` string naming a real calendar day.
pub fn is_iso_date(date: &str) -> bool {
    ISO_DATE.is_match(date) && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Trims identifying fields, fills an empty date with `today` and checks required fields.
pub fn normalize_new_record(mut record: NewWasteRecord, today: NaiveDate) -> Result<NewWasteRecord> {
    record.branch = record.branch.trim().to_string();
    record.category = record.category.trim().to_string();
    record.date = record.date.trim().to_string();

    if record.branch.is_empty() {
        return Err(StoreError::Validation("branch is required".into()));
    }
    if record.category.is_empty() {
        return Err(StoreError::Validation("category is required".into()));
    }
    match record.value {
        None => return Err(StoreError::Validation("value is required".into())),
        Some(v) if v < Decimal::ZERO => {
            return Err(StoreError::Validation(format!(
                "value must not be negative, got {}",
                v
            )))
        }
        Some(v) if v > MAX_AMOUNT => {
            return Err(StoreError::Validation(format!(
                "value must not exceed {}, got {}",
                MAX_AMOUNT, v
            )))
        }
        Some(_) => {}
    }
    if record.date.is_empty() {
        record.date = today.format("%Y-%m-%d").to_string();
    } else if !is_iso_date(&record.date) {
        return Err(StoreError::Validation(format!(
            "invalid date '{}', expected YYYY-MM-DD",
            record.date
        )));
    }
    Ok(record)
}

/// Branch and category must be configured.
pub fn check_against_config(record: &NewWasteRecord, config: &AppConfig) -> Result<()> {
    if !config.has_branch(&record.branch) {
        return Err(StoreError::Validation(format!(
            "unknown branch '{}'",
            record.branch
        )));
    }
    if !config.has_category(&record.category) {
        return Err(StoreError::Validation(format!(
            "unknown category '{}'",
            record.category
        )));
    }
    Ok(())
}
