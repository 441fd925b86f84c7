//! Campaign management commands (list, close, rate)

use anyhow::Result;
use tuna_core::db::Database;

pub fn cmd_campaigns_list(db: &Database, owner: &str) -> Result<()> {
    let campaigns = db.list_campaigns(owner)?;

    println!();
    println!("🌱 Campaigns for {}", owner);

    if campaigns.is_empty() {
        println!("   No campaigns yet. The first upload creates one.");
        return Ok(());
    }

    println!(
        "   {:>4} │ {:11} │ {:4} │ {:10} │ {:10} │ {:6} │ {:>12}",
        "ID", "Season", "Year", "Start", "End", "Status", "Budget"
    );
    println!("   ─────┼─────────────┼──────┼────────────┼────────────┼────────┼──────────────");
    for campaign in &campaigns {
        println!(
            "   {:>4} │ {:11} │ {:4} │ {} │ {} │ {:6} │ {:>12.2}",
            campaign.id,
            campaign.season,
            campaign.year,
            campaign.start_date,
            campaign.end_date,
            campaign.status,
            campaign.total_budget
        );
    }

    println!();
    Ok(())
}

pub fn cmd_campaigns_close(db: &Database, id: i64) -> Result<()> {
    db.close_campaign(id)?;
    println!("✅ Campaign {} closed. Uploads to it are now rejected.", id);
    Ok(())
}

pub fn cmd_campaigns_rate(db: &Database, id: i64, rate: f64) -> Result<()> {
    if rate <= 0.0 {
        anyhow::bail!("Exchange rate must be positive, got {}", rate);
    }
    db.set_exchange_rate(id, rate)?;
    println!("✅ Campaign {} exchange rate set to {:.4}", id, rate);
    Ok(())
}
