use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dashboard_engine::{ReportOptions, build_report, format_percentage};
use models::{AppConfig, RecordFilter, RecordSort, Report, SortDirection, SortField, WasteRecord};
use std::{fs, path::Path, path::PathBuf};
use store::{CONFIG_FILE, RECORDS_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "generate-report",
    about = "Build a filtered waste report from a data directory and write it as JSON."
)]
struct Args {
    /// Directory holding waste_records.json and app_config.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long)]
    branch: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// Inclusive lower date bound (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Inclusive upper date bound (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Case-insensitive text matched against code, description, inventory number and notes
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum, default_value_t = SortArg::Date)]
    sort: SortArg,

    #[arg(long, value_enum, default_value_t = DirArg::Desc)]
    dir: DirArg,

    #[arg(long, default_value = "Q")]
    currency: String,

    /// Output path; prints to stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Date,
    Value,
    Branch,
    Category,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortField::Date,
            SortArg::Value => SortField::Value,
            SortArg::Branch => SortField::Branch,
            SortArg::Category => SortField::Category,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DirArg {
    Asc,
    Desc,
}

impl From<DirArg> for SortDirection {
    fn from(arg: DirArg) -> Self {
        match arg {
            DirArg::Asc => SortDirection::Asc,
            DirArg::Desc => SortDirection::Desc,
        }
    }
}

fn load_records(path: &Path) -> Result<Vec<WasteRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
}

fn summary(report: &Report) -> String {
    format!(
        "{} records, total {}, global waste {}% ({:?})",
        report.count,
        report.total_display,
        format_percentage(report.global.percentage),
        report.global.status
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    let records = load_records(&args.data_dir.join(RECORDS_FILE))?;
    let config = load_config(&args.data_dir.join(CONFIG_FILE))?;

    let filter = RecordFilter {
        branch: args.branch,
        category: args.category,
        date_from: args.from,
        date_to: args.to,
        search: args.search,
    };
    let sort = RecordSort {
        sort: args.sort.into(),
        dir: args.dir.into(),
    };
    let options = ReportOptions {
        currency_symbol: args.currency,
    };

    let report = build_report(&records, &config, &filter, sort, &options, Utc::now());
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
            eprintln!("{}", report.metadata.filter_description);
            eprintln!("{}", summary(&report));
            eprintln!("Report written to {}", out.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
