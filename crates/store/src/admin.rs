//! Administrative edits to the configuration document.
//!
//! Every edit goes through [`merge_patch`], which keeps `monthlySales` in step with
//! `branches`: entries for removed branches are dropped, branches without an entry
//! get zero sales, and sales for unknown branches are rejected.

use std::collections::{BTreeMap, HashSet};

use models::{AppConfig, ConfigPatch};
use rust_decimal::Decimal;

use crate::error::{Result, StoreError};
use crate::validation::MAX_AMOUNT;

const CATEGORY: &str = "Category";
const BRANCH: &str = "Branch";

/// Merges a partial config over `config`, validating and reconciling the result.
pub fn merge_patch(mut config: AppConfig, patch: ConfigPatch) -> Result<AppConfig> {
    if let Some(categories) = patch.categories {
        config.categories = normalize_names(CATEGORY, categories)?;
    }
    if let Some(branches) = patch.branches {
        config.branches = normalize_names(BRANCH, branches)?;
    }
    if let Some(sales) = patch.monthly_sales {
        for (branch, amount) in &sales {
            if !config.has_branch(branch) {
                return Err(StoreError::UnknownBranch(branch.clone()));
            }
            if *amount < Decimal::ZERO {
                return Err(StoreError::Validation(format!(
                    "monthly sales for '{}' must not be negative",
                    branch
                )));
            }
            if *amount > MAX_AMOUNT {
                return Err(StoreError::Validation(format!(
                    "monthly sales for '{}' must not exceed {}",
                    branch, MAX_AMOUNT
                )));
            }
        }
        config.monthly_sales.extend(sales);
    }
    if let Some(threshold) = patch.waste_threshold {
        validate_threshold(threshold)?;
        config.waste_threshold = threshold;
    }
    reconcile_sales(&mut config);
    Ok(config)
}

fn normalize_names(kind: &'static str, names: Vec<String>) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let name = clean_name(kind, &name)?;
        if !seen.insert(name.clone()) {
            return Err(StoreError::Duplicate { kind, name });
        }
        out.push(name);
    }
    Ok(out)
}

fn clean_name(kind: &'static str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation(format!(
            "{} name must not be empty",
            kind.to_lowercase()
        )));
    }
    Ok(name.to_string())
}

fn validate_threshold(threshold: Decimal) -> Result<()> {
    if threshold < Decimal::ZERO || threshold > Decimal::ONE {
        return Err(StoreError::Validation(format!(
            "waste threshold must be between 0 and 1, got {}",
            threshold
        )));
    }
    Ok(())
}

fn reconcile_sales(config: &mut AppConfig) {
    let branches: HashSet<&String> = config.branches.iter().collect();
    config.monthly_sales.retain(|branch, _| branches.contains(branch));
    for branch in &config.branches {
        config
            .monthly_sales
            .entry(branch.clone())
            .or_insert(Decimal::ZERO);
    }
}

pub fn add_category(config: &AppConfig, name: &str) -> Result<AppConfig> {
    let name = clean_name(CATEGORY, name)?;
    if config.has_category(&name) {
        return Err(StoreError::Duplicate {
            kind: CATEGORY,
            name,
        });
    }
    let mut categories = config.categories.clone();
    categories.push(name);
    merge_patch(
        config.clone(),
        ConfigPatch {
            categories: Some(categories),
            ..Default::default()
        },
    )
}

pub fn remove_category(config: &AppConfig, name: &str) -> Result<AppConfig> {
    if !config.has_category(name) {
        return Err(StoreError::NotConfigured {
            kind: CATEGORY,
            name: name.to_string(),
        });
    }
    let categories = config
        .categories
        .iter()
        .filter(|c| c.as_str() != name)
        .cloned()
        .collect();
    merge_patch(
        config.clone(),
        ConfigPatch {
            categories: Some(categories),
            ..Default::default()
        },
    )
}

/// Adds a branch with zero monthly sales.
pub fn add_branch(config: &AppConfig, name: &str) -> Result<AppConfig> {
    let name = clean_name(BRANCH, name)?;
    if config.has_branch(&name) {
        return Err(StoreError::Duplicate { kind: BRANCH, name });
    }
    let mut branches = config.branches.clone();
    branches.push(name);
    merge_patch(
        config.clone(),
        ConfigPatch {
            branches: Some(branches),
            ..Default::default()
        },
    )
}

/// Removes a branch and its sales entry. Records already filed under it are kept.
pub fn remove_branch(config: &AppConfig, name: &str) -> Result<AppConfig> {
    if !config.has_branch(name) {
        return Err(StoreError::NotConfigured {
            kind: BRANCH,
            name: name.to_string(),
        });
    }
    let branches = config
        .branches
        .iter()
        .filter(|b| b.as_str() != name)
        .cloned()
        .collect();
    merge_patch(
        config.clone(),
        ConfigPatch {
            branches: Some(branches),
            ..Default::default()
        },
    )
}

pub fn set_monthly_sales(config: &AppConfig, edits: BTreeMap<String, Decimal>) -> Result<AppConfig> {
    merge_patch(
        config.clone(),
        ConfigPatch {
            monthly_sales: Some(edits),
            ..Default::default()
        },
    )
}

pub fn set_waste_threshold(config: &AppConfig, threshold: Decimal) -> Result<AppConfig> {
    merge_patch(
        config.clone(),
        ConfigPatch {
            waste_threshold: Some(threshold),
            ..Default::default()
        },
    )
}

/// Inconsistencies between `monthlySales` and `branches` in a stored document that
/// was written outside [`merge_patch`].
#[derive(Debug, Default, PartialEq)]
pub struct SalesDrift {
    pub orphan_sales: Vec<String>,
    pub missing_sales: Vec<String>,
}

impl SalesDrift {
    pub fn is_clean(&self) -> bool {
        self.orphan_sales.is_empty() && self.missing_sales.is_empty()
    }
}

pub fn sales_drift(config: &AppConfig) -> SalesDrift {
    SalesDrift {
        orphan_sales: config
            .monthly_sales
            .keys()
            .filter(|b| !config.has_branch(b))
            .cloned()
            .collect(),
        missing_sales: config
            .branches
            .iter()
            .filter(|b| !config.monthly_sales.contains_key(*b))
            .cloned()
            .collect(),
    }
}
