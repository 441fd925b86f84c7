//! End-to-end upload pipeline
//!
//! One call takes a file name plus raw bytes and drives detection, column
//! mapping, parsing, and replacement persistence for the owning campaign.
//! Each call writes an upload record that moves `processing` → `completed`
//! or `failed` before returning, so history always reflects the terminal
//! state.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::columns::{ColumnMap, SheetLayout};
use crate::db::Database;
use crate::detect::{detect_sheet_kind, SheetKind};
use crate::error::{Error, Result};
use crate::models::{Campaign, CampaignStatus};
use crate::parse::{
    parse_budget_sheet, parse_orders_sheet, parse_variance_sheet, ParseSummary,
};
use crate::workbook::load_grid;

/// Result of one processed upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub upload_id: i64,
    pub campaign_id: i64,
    pub kind: SheetKind,
    pub summary: ParseSummary,
    /// Recomputed campaign total, present after budget uploads
    pub total_budget: Option<f64>,
}

/// SHA-256 fingerprint of uploaded bytes, for history deduplication
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Ingest one spreadsheet into a campaign.
///
/// With `campaign_id` the upload targets that campaign; otherwise the
/// owner's current-season campaign is used, created on first upload. The
/// sheet kind is auto-detected unless `kind_override` is given; an
/// undetectable file fails with `UnknownSheetKind` before anything is
/// written. Row-level problems are warnings in the outcome, not errors.
pub fn process_upload(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    file_name: &str,
    data: &[u8],
    kind_override: Option<SheetKind>,
) -> Result<UploadOutcome> {
    let campaign = match campaign_id {
        Some(id) => db.get_campaign(id)?,
        None => db.ensure_current_campaign(owner)?,
    };
    if campaign.status == CampaignStatus::Closed {
        return Err(Error::InvalidData(format!(
            "Campaign {} is closed; re-open or start a new season before uploading",
            campaign.id
        )));
    }

    let kind = match kind_override {
        Some(kind) => kind,
        None => detect_sheet_kind(file_name, data),
    };
    if kind == SheetKind::Unknown {
        return Err(Error::UnknownSheetKind(file_name.to_string()));
    }

    let hash = content_hash(data);
    let upload_id = db.create_upload(campaign.id, file_name, kind.as_str(), &hash)?;

    match ingest(db, &campaign, kind, file_name, data) {
        Ok((summary, total_budget)) => {
            db.finish_upload(
                upload_id,
                summary.processed_rows,
                summary.skipped_rows,
                &summary.warnings,
            )?;
            info!(
                file = file_name,
                kind = %kind,
                campaign_id = campaign.id,
                processed = summary.processed_rows,
                skipped = summary.skipped_rows,
                "Upload complete"
            );
            Ok(UploadOutcome {
                upload_id,
                campaign_id: campaign.id,
                kind,
                summary,
                total_budget,
            })
        }
        Err(e) => {
            // Best effort: the original error is what the caller needs
            let _ = db.fail_upload(upload_id, &e.to_string());
            Err(e)
        }
    }
}

/// Parse and persist one sheet; returns the parse summary and, for budget
/// uploads, the recomputed campaign total
fn ingest(
    db: &Database,
    campaign: &Campaign,
    kind: SheetKind,
    file_name: &str,
    data: &[u8],
) -> Result<(ParseSummary, Option<f64>)> {
    let grid = load_grid(file_name, data)?;

    match kind {
        SheetKind::Budget => {
            let map = ColumnMap::detect(&grid, SheetLayout::Budget);
            let parsed = parse_budget_sheet(&grid, &map)?;
            db.replace_budget_rows(campaign.id, &parsed.rows)?;
            let total = db.refresh_total_budget(campaign.id)?;
            Ok((parsed.summary, Some(total)))
        }
        SheetKind::ProductionOrders => {
            let map = ColumnMap::detect(&grid, SheetLayout::Orders);
            let parsed = parse_orders_sheet(&grid, &map)?;
            db.replace_orders(campaign.id, &parsed.orders)?;
            db.replace_concept_totals(campaign.id, &parsed.concept_totals)?;
            Ok((parsed.summary, None))
        }
        SheetKind::Variance => {
            let map = ColumnMap::detect(&grid, SheetLayout::Variance);
            let parsed = parse_variance_sheet(&grid, &map)?;
            db.replace_variance_rows(campaign.id, &parsed.rows)?;
            Ok((parsed.summary, None))
        }
        SheetKind::Unknown => Err(Error::UnknownSheetKind(file_name.to_string())),
    }
}
