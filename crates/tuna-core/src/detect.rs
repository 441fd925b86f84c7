//! Spreadsheet type detection
//!
//! Classifies an uploaded workbook as budget sheet, production-order ledger,
//! or variance sheet. Detection cascades from cheapest signal to most
//! expensive: filename hints, then worksheet names, then header keywords in
//! the first rows. Never fails: anything unrecognizable is `Unknown` and the
//! caller surfaces a "select the type manually" error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::normalize;
use crate::workbook;

/// Classification of an uploaded workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Budget,
    ProductionOrders,
    Variance,
    Unknown,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::ProductionOrders => "production_orders",
            Self::Variance => "variance",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for SheetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "budget" | "presupuesto" => Ok(Self::Budget),
            "production_orders" | "orders" | "ordenes" => Ok(Self::ProductionOrders),
            "variance" | "variacion" => Ok(Self::Variance),
            _ => Err(format!("Unknown sheet kind: {}", s)),
        }
    }
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an uploaded file from its name and raw bytes
pub fn detect_sheet_kind(file_name: &str, data: &[u8]) -> SheetKind {
    // Filename hints take priority
    if let Some(kind) = kind_from_label(&normalize(file_name)) {
        debug!(file = file_name, kind = %kind, "Detected sheet kind from filename");
        return kind;
    }

    // Then worksheet names (Excel only)
    for name in workbook::sheet_names(file_name, data) {
        if let Some(kind) = kind_from_label(&normalize(&name)) {
            debug!(file = file_name, sheet = %name, kind = %kind, "Detected sheet kind from sheet name");
            return kind;
        }
    }

    // Finally header keywords in the first rows; an unreadable buffer is
    // not an error here, it just yields Unknown
    let grid = match workbook::load_grid(file_name, data) {
        Ok(grid) => grid,
        Err(_) => return SheetKind::Unknown,
    };

    let kind = kind_from_headers(&grid);
    debug!(file = file_name, kind = %kind, "Detected sheet kind from headers");
    kind
}

/// Match a normalized filename or worksheet name against kind keywords
fn kind_from_label(label: &str) -> Option<SheetKind> {
    if label.contains("presupuesto") || label.contains("budget") {
        return Some(SheetKind::Budget);
    }
    if label.contains("orden") || label.contains("produccion") {
        return Some(SheetKind::ProductionOrders);
    }
    if label.contains("variacion") || label.contains("variance") || label.contains("desviacion") {
        return Some(SheetKind::Variance);
    }
    None
}

/// Header-keyword classification over the first scanned rows
fn kind_from_headers(grid: &[Vec<String>]) -> SheetKind {
    let mut cells: Vec<String> = Vec::new();
    for row in grid.iter().take(5) {
        for cell in row {
            let n = normalize(cell);
            if !n.is_empty() {
                cells.push(n);
            }
        }
    }

    let has = |kw: &str| cells.iter().any(|c| c.contains(kw));

    // Variance sheets either name the variance column outright or pair a
    // rubric column with budget and actual columns; a process column means
    // budget sheet, which can carry the same trio
    if has("variacion")
        || has("desviacion")
        || ((has("rubro") || has("concepto"))
            && has("presupuesto")
            && has("real")
            && !has("proceso"))
    {
        return SheetKind::Variance;
    }

    // Order-number-like columns mark the production ledger
    if has("orden") || (has("op") && has("estado")) {
        return SheetKind::ProductionOrders;
    }

    // Cost/price columns mark a budget sheet
    if has("presupuesto") || has("costo") || has("precio") {
        return SheetKind::Budget;
    }

    SheetKind::Unknown
}
