//! Reconciliation command

use anyhow::{Context, Result};
use tuna_core::db::Database;
use tuna_core::models::MatchType;
use tuna_core::recon::ReconciliationEngine;
use tuna_core::settings::AiSettings;
use tuna_core::{AiClient, AliasTable};

use super::resolve_campaign;

pub async fn cmd_reconcile(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    no_ai: bool,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;

    let categories = db.budget_categories(campaign.id)?;
    let concepts = db.concept_names(campaign.id)?;

    if categories.is_empty() {
        anyhow::bail!(
            "Campaign {} has no budget rows. Upload a budget sheet first.",
            campaign.id
        );
    }
    if concepts.is_empty() {
        anyhow::bail!(
            "Campaign {} has no EEFF concepts. Upload a production-order sheet first.",
            campaign.id
        );
    }

    println!(
        "🔎 Reconciling {} categories against {} concepts (campaign {})...",
        categories.len(),
        concepts.len(),
        campaign.id
    );

    let aliases = AliasTable::load().context("Failed to load alias table")?;
    let ai = if no_ai {
        println!("   AI pass disabled (--no-ai)");
        None
    } else {
        let client = AiClient::from_settings(&AiSettings::default());
        match &client {
            Some(_) => println!("   🤖 AI pass enabled"),
            None => println!(
                "   💡 Tip: Set {} to enable semantic matching",
                tuna_core::settings::AI_HOST_ENV
            ),
        }
        client
    };

    let engine = ReconciliationEngine::new(ai, aliases);
    let candidates = engine.reconcile(&categories, &concepts).await;
    let saved = db.save_mappings(campaign.id, &candidates)?;

    let exact = candidates
        .iter()
        .filter(|c| c.match_type == MatchType::Exact)
        .count();
    let suggested = candidates
        .iter()
        .filter(|c| c.match_type == MatchType::Suggested)
        .count();
    let unmatched = candidates
        .iter()
        .filter(|c| c.match_type == MatchType::None)
        .count();

    println!();
    println!("✅ Reconciliation complete!");
    println!("   Saved: {} mappings", saved);
    println!("   Exact: {}", exact);
    println!("   Suggested: {}", suggested);
    if unmatched > 0 {
        println!("   ❓ Unmatched: {}", unmatched);
    }

    if suggested > 0 {
        println!();
        println!(
            "   Run 'tuna mappings list --pending' to review {} suggestions.",
            suggested
        );
    }

    Ok(())
}
