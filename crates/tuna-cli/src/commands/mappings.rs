//! Category mapping commands (list, confirm, set)

use anyhow::Result;
use tuna_core::db::{Database, MappingUpdate};

use super::{resolve_campaign, truncate};

pub fn cmd_mappings_list(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    pending_only: bool,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let mappings = db.list_mappings(campaign.id)?;

    let shown: Vec<_> = mappings
        .iter()
        .filter(|m| !pending_only || !m.confirmed)
        .collect();

    println!();
    println!("🔗 Mappings for campaign {} ({} {})", campaign.id, campaign.season, campaign.year);

    if shown.is_empty() {
        if pending_only {
            println!("   No pending mappings.");
        } else {
            println!("   No mappings yet. Run 'tuna reconcile' first.");
        }
        return Ok(());
    }

    println!(
        "   {:>4} │ {:20} │ {:8} │ {:25} │ {:>5} │ {:9} │ {}",
        "ID", "Category", "Process", "Concept", "Conf", "Match", "Status"
    );
    println!("   ─────┼──────────────────────┼──────────┼───────────────────────────┼───────┼───────────┼─────────");

    for mapping in &shown {
        let concept = if mapping.eeff_concept.is_empty() {
            "(unmatched)".to_string()
        } else {
            truncate(&mapping.eeff_concept, 25)
        };
        println!(
            "   {:>4} │ {:20} │ {:8} │ {:25} │ {:>4.0}% │ {:9} │ {}",
            mapping.id,
            truncate(&mapping.category, 20),
            mapping.process.label(),
            concept,
            mapping.confidence,
            mapping.match_type.as_str(),
            if mapping.confirmed { "✅" } else { "⏳" }
        );
    }

    println!();
    Ok(())
}

pub fn cmd_mappings_confirm(db: &Database, id: i64) -> Result<()> {
    let mapping = db.update_mapping(
        id,
        &MappingUpdate {
            confirmed: Some(true),
            ..Default::default()
        },
    )?;

    println!(
        "✅ Confirmed: {} ({}) → {}",
        mapping.category,
        mapping.process.label(),
        mapping.eeff_concept
    );
    Ok(())
}

pub fn cmd_mappings_set(db: &Database, id: i64, concept: &str) -> Result<()> {
    let mapping = db.update_mapping(
        id,
        &MappingUpdate {
            eeff_concept: Some(concept.to_string()),
            ..Default::default()
        },
    )?;

    println!(
        "✅ Mapped: {} ({}) → {} (manual)",
        mapping.category,
        mapping.process.label(),
        mapping.eeff_concept
    );
    Ok(())
}
