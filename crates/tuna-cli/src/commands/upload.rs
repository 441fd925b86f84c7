//! Spreadsheet upload command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tuna_core::db::Database;
use tuna_core::detect::SheetKind;
use tuna_core::upload::process_upload;

pub fn cmd_upload(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    file: &Path,
    kind_str: Option<&str>,
) -> Result<()> {
    let kind_override: Option<SheetKind> = kind_str
        .map(|s| {
            s.parse().map_err(|_| {
                anyhow::anyhow!(
                    "Unknown sheet kind: {}\nSpecify --kind with one of: budget, orders, variance",
                    s
                )
            })
        })
        .transpose()?;

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid file name")?;
    let data = fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;
    debug!(file = file_name, bytes = data.len(), "Read upload file");

    println!("📥 Uploading {}...", file.display());

    let outcome = process_upload(db, owner, campaign_id, file_name, &data, kind_override)?;

    println!("✅ Upload complete!");
    println!("   Campaign: {}", outcome.campaign_id);
    println!("   Kind: {}", outcome.kind);
    println!("   Processed: {} rows", outcome.summary.processed_rows);
    if outcome.summary.skipped_rows > 0 {
        println!("   Skipped: {} rows", outcome.summary.skipped_rows);
    }
    if let Some(total) = outcome.total_budget {
        println!("   Total budget: ${:.2}", total);
    }

    if !outcome.summary.warnings.is_empty() {
        println!();
        println!("⚠️  {} warnings:", outcome.summary.warnings.len());
        for warning in outcome.summary.warnings.iter().take(10) {
            println!("   - {}", warning);
        }
        if outcome.summary.warnings.len() > 10 {
            println!("   ... and {} more", outcome.summary.warnings.len() - 10);
        }
    }

    if outcome.kind == SheetKind::ProductionOrders {
        println!();
        println!("   Run 'tuna reconcile' to map budget categories to concepts.");
    }

    Ok(())
}
