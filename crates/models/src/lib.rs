use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Stored documents

/// A single inventory loss event. Immutable once stored; only deletion is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecord {
	pub id: String,
	#[serde(default)]
	pub branch: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub code: String,
	#[serde(default)]
	pub inventory_number: String,
	#[serde(default)]
	pub description: String,
	/// YYYY-MM-DD
	#[serde(default)]
	pub date: String,
	#[serde(default)]
	pub value: Decimal,
	#[serde(default)]
	pub notes: String,
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
}

impl WasteRecord {
	/// Builds a stored record from a submitted one. `value` must already be validated.
	pub fn from_new(new: NewWasteRecord, id: String, created_at: DateTime<Utc>) -> Self {
		Self {
			id,
			branch: new.branch,
			category: new.category,
			code: new.code,
			inventory_number: new.inventory_number,
			description: new.description,
			date: new.date,
			value: new.value.unwrap_or_default(),
			notes: new.notes,
			created_at,
		}
	}
}

/// A record as submitted for insertion, before the store assigns `id` and `createdAt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWasteRecord {
	#[serde(default)]
	pub branch: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub code: String,
	#[serde(default)]
	pub inventory_number: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub date: String,
	#[serde(default)]
	pub value: Option<Decimal>,
	#[serde(default)]
	pub notes: String,
}

pub const DEFAULT_CATEGORIES: [&str; 3] = [
	"Usadas sin control de inventario",
	"Mermas restaurantes",
	"Mermas Bodega",
];

pub const DEFAULT_BRANCHES: [&str; 7] = [
	"Atitlán Central",
	"Atitlán Mirador",
	"Atitlán San Juan",
	"Atitlán Santiago",
	"Atitlán Café",
	"Atitlán Café Bar",
	"Bodega Central",
];

/// Singleton configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	#[serde(default = "default_categories")]
	pub categories: Vec<String>,
	#[serde(default = "default_branches")]
	pub branches: Vec<String>,
	#[serde(default = "default_monthly_sales")]
	pub monthly_sales: BTreeMap<String, Decimal>,
	/// Max allowed waste/sales ratio, in [0, 1].
	#[serde(default = "default_waste_threshold")]
	pub waste_threshold: Decimal,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			categories: default_categories(),
			branches: default_branches(),
			monthly_sales: default_monthly_sales(),
			waste_threshold: default_waste_threshold(),
		}
	}
}

impl AppConfig {
	/// Configured monthly sales for a branch, zero when unset.
	pub fn sales_for(&self, branch: &str) -> Decimal {
		self.monthly_sales.get(branch).copied().unwrap_or(Decimal::ZERO)
	}

	pub fn has_branch(&self, branch: &str) -> bool {
		self.branches.iter().any(|b| b == branch)
	}

	pub fn has_category(&self, category: &str) -> bool {
		self.categories.iter().any(|c| c == category)
	}
}

fn default_categories() -> Vec<String> {
	DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn default_branches() -> Vec<String> {
	DEFAULT_BRANCHES.iter().map(|s| s.to_string()).collect()
}

fn default_monthly_sales() -> BTreeMap<String, Decimal> {
	DEFAULT_BRANCHES
		.iter()
		.map(|b| (b.to_string(), Decimal::ZERO))
		.collect()
}

fn default_waste_threshold() -> Decimal {
	Decimal::new(3, 2)
}

/// Partial config for merge-writes. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub categories: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub branches: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub monthly_sales: Option<BTreeMap<String, Decimal>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub waste_threshold: Option<Decimal>,
}

impl From<AppConfig> for ConfigPatch {
	fn from(config: AppConfig) -> Self {
		Self {
			categories: Some(config.categories),
			branches: Some(config.branches),
			monthly_sales: Some(config.monthly_sales),
			waste_threshold: Some(config.waste_threshold),
		}
	}
}

// Queries

/// Record filter. Absent or empty fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
	#[serde(default)]
	pub branch: Option<String>,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub date_from: Option<String>,
	#[serde(default)]
	pub date_to: Option<String>,
	#[serde(default)]
	pub search: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
	field.as_deref().filter(|s| !s.is_empty())
}

impl RecordFilter {
	pub fn branch(&self) -> Option<&str> {
		non_empty(&self.branch)
	}
	pub fn category(&self) -> Option<&str> {
		non_empty(&self.category)
	}
	pub fn date_from(&self) -> Option<&str> {
		non_empty(&self.date_from)
	}
	pub fn date_to(&self) -> Option<&str> {
		non_empty(&self.date_to)
	}
	pub fn search(&self) -> Option<&str> {
		non_empty(&self.search)
	}

	pub fn is_empty(&self) -> bool {
		self.branch().is_none()
			&& self.category().is_none()
			&& self.date_from().is_none()
			&& self.date_to().is_none()
			&& self.search().is_none()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
	#[default]
	Date,
	Value,
	Branch,
	Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSort {
	#[serde(default)]
	pub sort: SortField,
	#[serde(default)]
	pub dir: SortDirection,
}

// Derived outputs, recomputed on every query

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummary {
	pub branch: String,
	pub total: Decimal,
	pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
	pub category: String,
	pub total: Decimal,
	pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
	/// YYYY-MM
	pub month: String,
	pub label: String,
	pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteStatus {
	Safe,
	Warning,
	Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
	pub branch: String,
	pub sales: Decimal,
	pub waste: Decimal,
	pub percentage: Decimal,
	pub threshold: Decimal,
	pub status: WasteStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatus {
	pub sales: Decimal,
	pub waste: Decimal,
	pub percentage: Decimal,
	pub threshold: Decimal,
	pub status: WasteStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
	pub generated_at: String,
	pub month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
	pub metadata: DashboardMetadata,
	pub total: Decimal,
	pub count: usize,
	pub average: Decimal,
	pub branches: Vec<BranchSummary>,
	pub categories: Vec<CategorySummary>,
	pub trend: Vec<MonthlyTrendPoint>,
	pub budget: Vec<BudgetStatus>,
	pub global: GlobalStatus,
	pub branches_over_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
	pub id: String,
	pub date: String,
	pub branch: String,
	pub category: String,
	pub code: String,
	pub inventory_number: String,
	pub description: String,
	pub notes: String,
	pub value: Decimal,
	pub value_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
	pub generated_at: String,
	pub filters: RecordFilter,
	pub filter_description: String,
	pub sort: RecordSort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
	pub metadata: ReportMetadata,
	pub rows: Vec<ReportRow>,
	pub count: usize,
	pub total: Decimal,
	pub total_display: String,
	pub branches: Vec<BranchSummary>,
	pub categories: Vec<CategorySummary>,
	pub trend: Vec<MonthlyTrendPoint>,
	pub budget: Vec<BudgetStatus>,
	pub global: GlobalStatus,
}

// Settings models

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	#[serde(default = "default_data_dir")]
	pub data_dir: PathBuf,
	#[serde(default = "default_currency_symbol")]
	pub currency_symbol: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			data_dir: default_data_dir(),
			currency_symbol: default_currency_symbol(),
		}
	}
}

fn default_host() -> String {
	"127.0.0.1".to_string()
}
fn default_port() -> u16 {
	3000
}
fn default_data_dir() -> PathBuf {
	PathBuf::from("data")
}
fn default_currency_symbol() -> String {
	"Q".to_string()
}
