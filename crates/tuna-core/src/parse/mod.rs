//! Sheet parsers for the three recognized workbook types
//!
//! Row-level policy shared by all three: a row whose designated name cell is
//! empty is skipped and counted, numeric cells that fail to parse default to
//! 0, and only an unreadable buffer or a missing required column is an error.

mod budget;
mod orders;
mod variance;

pub use budget::parse_budget_sheet;
pub use orders::{parse_orders_sheet, ParsedOrders};
pub use variance::parse_variance_sheet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Process;

/// Per-parse accounting surfaced to the user after a (partial) import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseSummary {
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub warnings: Vec<String>,
}

impl ParseSummary {
    pub(crate) fn skip(&mut self, row: usize, reason: &str) {
        self.skipped_rows += 1;
        self.warnings.push(format!("Row {}: {}", row + 1, reason));
    }
}

/// Rows plus summary, the uniform parser output
#[derive(Debug, Clone)]
pub struct ParsedSheet<T> {
    pub rows: Vec<T>,
    pub summary: ParseSummary,
}

/// Tolerant numeric parsing: strips currency symbols, thousands separators
/// and whitespace; anything else parses as 0.
pub(crate) fn parse_number(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '\u{a0}'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }
    // Accounting negatives: (123.45)
    if let Some(inner) = cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return -inner.parse::<f64>().unwrap_or(0.0);
    }
    cleaned.parse().unwrap_or(0.0)
}

/// Tolerant date parsing over the formats seen in exports; None on failure
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Parse a process cell, falling back to Field (the dominant stage) when the
/// value is missing or unrecognized
pub(crate) fn parse_process(s: &str) -> Process {
    s.parse()
        .ok()
        .or_else(|| Process::from_type_code(s))
        .unwrap_or(Process::Field)
}

/// Option wrapper for cells that are legitimately optional
pub(crate) fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
