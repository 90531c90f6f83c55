use anyhow::{Context, Result, anyhow};
use clap::Parser;
use models::AppConfig;
use rust_decimal::Decimal;
use serde_json::Value;
use std::{collections::HashSet, fs, path::Path, path::PathBuf};
use store::{CONFIG_FILE, RECORDS_FILE, admin::sales_drift, validation::is_iso_date};

#[derive(Parser, Debug)]
#[command(
    name = "validate-store",
    about = "Check the waste records and config documents in a data directory."
)]
struct Args {
    /// Directory holding waste_records.json and app_config.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,
}

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Report {
    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
    fn print(&self, file: &str) {
        for w in &self.warnings {
            println!("[WARN] {}: {}", file, w);
        }
        for e in &self.errors {
            println!("[ERROR] {}: {}", file, e);
        }
    }
    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn validate_config(config: &AppConfig) -> Report {
    let mut rep = Report::default();

    for (kind, names) in [("category", &config.categories), ("branch", &config.branches)] {
        let mut seen = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                rep.error(format!("empty {} name", kind));
            } else if !seen.insert(name.as_str()) {
                rep.error(format!("duplicate {} '{}'", kind, name));
            }
        }
    }

    let drift = sales_drift(config);
    for branch in drift.orphan_sales {
        rep.warn(format!("monthlySales has entry for unconfigured branch '{}'", branch));
    }
    for branch in drift.missing_sales {
        rep.warn(format!("branch '{}' has no monthlySales entry (treated as 0)", branch));
    }
    for (branch, sales) in &config.monthly_sales {
        if *sales < Decimal::ZERO {
            rep.error(format!("monthlySales for '{}' is negative", branch));
        }
    }

    if config.waste_threshold < Decimal::ZERO || config.waste_threshold > Decimal::ONE {
        rep.error(format!(
            "wasteThreshold {} is outside [0, 1]",
            config.waste_threshold
        ));
    }

    rep
}

fn validate_records(val: &Value, config: &AppConfig) -> Report {
    let mut rep = Report::default();

    let Some(records) = val.as_array() else {
        rep.error("expected a JSON array of records");
        return rep;
    };

    let mut ids = HashSet::new();
    for (i, r) in records.iter().enumerate() {
        let field = |name: &str| r.get(name).and_then(|v| v.as_str()).unwrap_or("");

        let id = field("id");
        if id.is_empty() {
            rep.error(format!("records[{}] missing 'id'", i));
        } else if !ids.insert(id.to_string()) {
            rep.error(format!("records[{}] duplicate id '{}'", i, id));
        }

        let branch = field("branch");
        if branch.is_empty() {
            rep.error(format!("records[{}] missing 'branch'", i));
        } else if !config.has_branch(branch) {
            // removing a branch keeps its records
            rep.warn(format!("records[{}] branch '{}' is not configured", i, branch));
        }

        let category = field("category");
        if category.is_empty() {
            rep.error(format!("records[{}] missing 'category'", i));
        } else if !config.has_category(category) {
            rep.warn(format!("records[{}] category '{}' is not configured", i, category));
        }

        let date = field("date");
        if !is_iso_date(date) {
            rep.error(format!(
                "records[{}] invalid date '{}', expected YYYY-MM-DD",
                i, date
            ));
        }

        match r.get("value").and_then(|v| v.as_f64()) {
            None => rep.error(format!("records[{}] missing or non-numeric 'value'", i)),
            Some(v) if v < 0.0 => rep.error(format!("records[{}] negative value {}", i, v)),
            Some(_) => {}
        }
    }

    rep
}

fn load_config(path: &Path, rep: &mut Report) -> Result<AppConfig> {
    if !path.exists() {
        rep.warn("not found; defaults will be written on first use");
        return Ok(AppConfig::default());
    }
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.data_dir.exists() {
        return Err(anyhow!(
            "data directory not found: {}",
            args.data_dir.display()
        ));
    }

    let mut config_report = Report::default();
    let config = load_config(&args.data_dir.join(CONFIG_FILE), &mut config_report)?;
    let checked = validate_config(&config);
    config_report.errors.extend(checked.errors);
    config_report.warnings.extend(checked.warnings);
    config_report.print(CONFIG_FILE);

    let records_path = args.data_dir.join(RECORDS_FILE);
    let records_report = if records_path.exists() {
        let txt = fs::read_to_string(&records_path)
            .with_context(|| format!("reading {}", records_path.display()))?;
        let val: Value = serde_json::from_str(&txt)
            .with_context(|| format!("parsing {}", records_path.display()))?;
        validate_records(&val, &config)
    } else {
        let mut rep = Report::default();
        rep.warn("not found; an empty collection will be created on first use");
        rep
    };
    records_report.print(RECORDS_FILE);

    if config_report.has_errors() || records_report.has_errors() {
        Err(anyhow!("Validation failed"))
    } else {
        println!("Data directory passed validation.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_records_pass() {
        let val = json!([
            {"id": "a", "branch": "Atitlán Central", "category": "Mermas Bodega", "date": "2024-01-05", "value": 10.5},
            {"id": "b", "branch": "Bodega Central", "category": "Mermas restaurantes", "date": "2024-01-06", "value": 0}
        ]);
        let rep = validate_records(&val, &AppConfig::default());
        assert!(!rep.has_errors());
        assert!(rep.warnings.is_empty());
    }

    #[test]
    fn test_record_errors_and_warnings() {
        let val = json!([
            {"id": "a", "branch": "Cerrada", "category": "Mermas Bodega", "date": "2024-01-05", "value": 1},
            {"id": "a", "branch": "Atitlán Central", "category": "Mermas Bodega", "date": "05/01/2024", "value": -2}
        ]);
        let rep = validate_records(&val, &AppConfig::default());
        assert_eq!(rep.warnings.len(), 1);
        assert!(rep.errors.iter().any(|e| e.contains("duplicate id")));
        assert!(rep.errors.iter().any(|e| e.contains("invalid date")));
        assert!(rep.errors.iter().any(|e| e.contains("negative value")));
    }

    #[test]
    fn test_config_drift_is_a_warning() {
        let mut config = AppConfig::default();
        config.monthly_sales.insert("Cerrada".to_string(), Decimal::TEN);
        let rep = validate_config(&config);
        assert!(!rep.has_errors());
        assert_eq!(rep.warnings.len(), 1);

        config.waste_threshold = Decimal::TWO;
        assert!(validate_config(&config).has_errors());
    }
}
