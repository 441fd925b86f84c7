//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_campaign` - Resolve an explicit or current-season campaign
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Database and campaign status

use std::path::Path;

use anyhow::{Context, Result};
use tuna_core::db::Database;
use tuna_core::models::Campaign;
use tuna_core::settings::AiSettings;

/// Open (and migrate) the database at the given path
pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::new(&db_path.to_string_lossy()).context("Failed to open database")
}

/// Explicit campaign by ID, or the owner's current-season campaign
pub fn resolve_campaign(db: &Database, owner: &str, campaign_id: Option<i64>) -> Result<Campaign> {
    match campaign_id {
        Some(id) => db
            .get_campaign(id)
            .with_context(|| format!("Campaign {} not found", id)),
        None => db
            .ensure_current_campaign(owner)
            .context("Failed to resolve current campaign"),
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Upload a budget: tuna upload --file presupuesto.xlsx");
    println!("  2. Upload orders:   tuna upload --file ordenes.xlsx");
    println!("  3. Reconcile:       tuna reconcile");

    Ok(())
}

pub fn cmd_status(db_path: &Path, owner: &str, campaign_id: Option<i64>) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Tuna Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    match AiSettings::uncached().current() {
        Some(config) => println!("   🤖 AI: configured ({} @ {})", config.model, config.host),
        None => println!(
            "   💡 AI: not configured (set {} to enable semantic matching)",
            tuna_core::settings::AI_HOST_ENV
        ),
    }

    if !db_path.exists() {
        println!();
        return Ok(());
    }

    let db = open_db(db_path)?;
    let campaign = resolve_campaign(&db, owner, campaign_id)?;

    println!();
    println!(
        "   Campaign {}: {} {} ({})",
        campaign.id, campaign.season, campaign.year, campaign.status
    );
    println!("   Total budget: ${:.2}", campaign.total_budget);
    println!(
        "   Budget rows: {}",
        db.list_budget_rows(campaign.id)?.len()
    );
    println!("   Production orders: {}", db.list_orders(campaign.id)?.len());
    println!(
        "   EEFF concepts: {}",
        db.list_concept_totals(campaign.id)?.len()
    );

    let mappings = db.list_mappings(campaign.id)?;
    let pending = db.pending_mapping_count(campaign.id)?;
    println!("   Mappings: {} ({} pending)", mappings.len(), pending);

    let uploads = db.list_uploads(campaign.id)?;
    if !uploads.is_empty() {
        println!();
        println!("   Recent uploads:");
        for upload in uploads.iter().take(5) {
            println!(
                "   - #{} {} [{}] {} ({} rows, {} skipped)",
                upload.id,
                super::truncate(&upload.file_name, 30),
                upload.kind,
                upload.status,
                upload.processed_rows,
                upload.skipped_rows
            );
        }
    }

    if pending > 0 {
        println!();
        println!(
            "   Run 'tuna mappings list --pending' to review {} suggestions.",
            pending
        );
    }

    println!();
    Ok(())
}
