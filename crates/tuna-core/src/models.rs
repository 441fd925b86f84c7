//! Domain models for TUNA

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A seasonal budgeting/reconciliation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    /// Owning user
    pub owner: String,
    pub season: Season,
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CampaignStatus,
    /// Recomputed after every successful budget upload
    pub total_budget: f64,
    pub exchange_rate: f64,
    pub created_at: DateTime<Utc>,
}

/// Half-year campaign window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// January through June
    FirstHalf,
    /// July through December
    SecondHalf,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstHalf => "first_half",
            Self::SecondHalf => "second_half",
        }
    }

    /// Season containing the given date
    pub fn for_date(date: NaiveDate) -> Self {
        if date.month() <= 6 {
            Self::FirstHalf
        } else {
            Self::SecondHalf
        }
    }

    /// The six calendar months covered by this season
    pub fn months(&self) -> [u32; 6] {
        match self {
            Self::FirstHalf => [1, 2, 3, 4, 5, 6],
            Self::SecondHalf => [7, 8, 9, 10, 11, 12],
        }
    }

    /// Campaign window bounds for the given year
    pub fn window(&self, year: i32) -> (NaiveDate, NaiveDate) {
        match self {
            Self::FirstHalf => (
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(year, 6, 30).unwrap(),
            ),
            Self::SecondHalf => (
                NaiveDate::from_ymd_opt(year, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            ),
        }
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_half" | "primera" => Ok(Self::FirstHalf),
            "second_half" | "segunda" => Ok(Self::SecondHalf),
            _ => Err(format!("Unknown season: {}", s)),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Closed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown campaign status: {}", s)),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three sequential production stages of an agricultural campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    Nursery,
    Field,
    Packing,
}

impl Process {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nursery => "nursery",
            Self::Field => "field",
            Self::Packing => "packing",
        }
    }

    /// All processes in production order
    pub fn all() -> &'static [Process] {
        &[Self::Nursery, Self::Field, Self::Packing]
    }

    /// Spanish label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nursery => "Almacigo",
            Self::Field => "Campo",
            Self::Packing => "Empaque",
        }
    }

    /// Parse the single-letter type code used on production-order ledgers
    /// (A = almacigo/nursery, C = campo/field, E = empaque/packing)
    pub fn from_type_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().chars().next()? {
            'A' => Some(Self::Nursery),
            'C' => Some(Self::Field),
            'E' => Some(Self::Packing),
            _ => None,
        }
    }
}

impl std::str::FromStr for Process {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nursery" | "almacigo" | "almácigo" => Ok(Self::Nursery),
            "field" | "campo" => Ok(Self::Field),
            "packing" | "empaque" => Ok(Self::Packing),
            _ => Err(format!("Unknown process: {}", s)),
        }
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line item of planned spend from a budget sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRow {
    pub id: i64,
    pub campaign_id: i64,
    pub code: Option<String>,
    /// Free text, Spanish, may contain abbreviations
    pub category: String,
    pub process: Process,
    pub budget_usd: f64,
    pub actual_usd: Option<f64>,
    /// Exchange rate at capture time
    pub exchange_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A budget row parsed from an upload, before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudgetRow {
    pub code: Option<String>,
    pub category: String,
    pub process: Process,
    pub budget_usd: f64,
    pub actual_usd: Option<f64>,
    pub exchange_rate: Option<f64>,
}

/// Production-order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Other,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Other => "other",
        }
    }

    /// Parse the free-text status cell from the ledger
    pub fn parse_cell(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        if s.contains("cerrad") || s.contains("closed") {
            Self::Closed
        } else if s.contains("abiert") || s.contains("open") || s.contains("proceso") {
            Self::Open
        } else {
            Self::Other
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One manufacturing/work order from the production ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: i64,
    pub campaign_id: i64,
    pub order_number: String,
    pub process: Process,
    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub product_code: Option<String>,
    pub product_name: String,
    pub estimated_qty: f64,
    pub produced_qty: f64,
    /// produced - estimated
    pub qty_variance: f64,
    pub period_expense: f64,
    pub cumulative_expense: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub labor_hours: f64,
    pub created_at: DateTime<Utc>,
}

/// A production order parsed from an upload, before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductionOrder {
    pub order_number: String,
    pub process: Process,
    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub product_code: Option<String>,
    pub product_name: String,
    pub estimated_qty: f64,
    pub produced_qty: f64,
    pub qty_variance: f64,
    pub period_expense: f64,
    pub cumulative_expense: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub labor_hours: f64,
}

/// One row from a pre-aggregated variance worksheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRow {
    pub id: i64,
    pub campaign_id: i64,
    pub rubric: String,
    pub budget_usd: f64,
    pub actual_usd: f64,
    pub variance: f64,
    /// (actual - budget) / budget * 100, 0 when budget is 0
    pub variance_pct: f64,
    pub created_at: DateTime<Utc>,
}

/// A variance row parsed from an upload, before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVarianceRow {
    pub rubric: String,
    pub budget_usd: f64,
    pub actual_usd: f64,
    pub variance: f64,
    pub variance_pct: f64,
}

/// Aggregate spend for one EEFF concept, split by process
///
/// Derived once per production-order upload and fully replaced on each
/// upload for a campaign. This is the sole source of the concept list the
/// reconciliation engine matches against.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConceptTotal {
    pub concept: String,
    pub nursery_usd: f64,
    pub field_usd: f64,
    pub packing_usd: f64,
    pub total_usd: f64,
}

impl ConceptTotal {
    pub fn add(&mut self, process: Process, amount: f64) {
        match process {
            Process::Nursery => self.nursery_usd += amount,
            Process::Field => self.field_usd += amount,
            Process::Packing => self.packing_usd += amount,
        }
        self.total_usd += amount;
    }
}

/// How a category mapping was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Normalized strings matched directly; auto-confirmed
    Exact,
    /// AI or alias proposal; pending human confirmation
    Suggested,
    /// No match found in any pass; pending manual resolution
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Suggested => "suggested",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "suggested" => Ok(Self::Suggested),
            "none" => Ok(Self::None),
            _ => Err(format!("Unknown match type: {}", s)),
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The reconciliation artifact: links one (category, process) pair to an
/// EEFF concept. At most one row per (campaign, category, process).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub id: i64,
    pub campaign_id: i64,
    pub category: String,
    pub process: Process,
    /// Empty when match_type is none
    pub eeff_concept: String,
    /// 0-100
    pub confidence: f64,
    pub match_type: MatchType,
    pub confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Human-readable reasoning from the AI pass
    pub reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Upload task states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown upload status: {}", s)),
        }
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One upload operation, tracked for history/auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub id: i64,
    pub campaign_id: i64,
    pub file_name: String,
    pub kind: String,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    pub status: UploadStatus,
    pub processed_rows: i64,
    pub skipped_rows: i64,
    /// JSON array of warning strings
    pub warnings: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
