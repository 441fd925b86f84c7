//! Reporting and aggregation views
//!
//! Five independent read-only views over the normalized tables:
//! - `category` - variance by budget category, across processes
//! - `process` - variance partitioned by process with rollups
//! - `monthly` - month-by-month execution with running cumulatives
//! - `lots` - per-packing-order profitability estimates
//! - `ratios` - campaign-level KPI set
//!
//! All views are pure functions over fetched rows, tolerate empty input,
//! and guard every division so no report ever carries NaN or infinity.
//! Structs carry unrounded values; formatting (currency 2 decimals,
//! percentages 1 decimal) is the renderer's job.

use serde::Serialize;

pub mod category;
pub mod lots;
pub mod monthly;
pub mod process;
pub mod ratios;

/// Dead zone half-width for variance classification, in percent
pub const VARIANCE_BAND_PCT: f64 = 2.0;

/// Variance verdict for one aggregate.
///
/// Under-spend is favorable, over-spend is unfavorable, and anything inside
/// the ±2% band is neutral so noise is not flagged as signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Favorable,
    Desfavorable,
    Neutral,
}

impl Classification {
    /// Classify a variance percentage against the ±2 band
    pub fn for_variance_pct(variance_pct: f64) -> Self {
        if variance_pct < -VARIANCE_BAND_PCT {
            Self::Favorable
        } else if variance_pct > VARIANCE_BAND_PCT {
            Self::Desfavorable
        } else {
            Self::Neutral
        }
    }

    /// Spanish label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Favorable => "Favorable",
            Self::Desfavorable => "Desfavorable",
            Self::Neutral => "Neutral",
        }
    }
}

/// (actual - budget) / budget * 100, 0 when budget is 0
pub(crate) fn variance_pct(budget: f64, actual: f64) -> f64 {
    if budget == 0.0 {
        0.0
    } else {
        (actual - budget) / budget * 100.0
    }
}

/// numerator / denominator, 0 when the denominator is 0
pub(crate) fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
