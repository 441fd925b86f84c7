//! Report command implementations
//!
//! Each report either prints a table or, with --output, writes the CSV
//! rendering from tuna_core::export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tuna_core::db::Database;
use tuna_core::export;
use tuna_core::reports::{category, lots, monthly, process, ratios};

use super::{resolve_campaign, truncate};

fn write_csv(path: &Path, csv: &str) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(csv.as_bytes())?;

    // Subtract the title and header rows
    let rows = csv.lines().count().saturating_sub(2);
    println!("✅ Exported {} rows to {}", rows, path.display());
    Ok(())
}

pub fn cmd_report_category(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    output: Option<&Path>,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let report = category::variance_by_category(&db.list_budget_rows(campaign.id)?);

    if let Some(path) = output {
        return write_csv(path, &export::category_csv(&report)?);
    }

    println!();
    println!("📊 Variance by Category (campaign {})", campaign.id);

    if report.is_empty() {
        println!("   No budget rows. Upload a budget sheet first.");
        return Ok(());
    }

    println!(
        "   {:25} │ {:>10} │ {:>10} │ {:>10} │ {:>7} │ {}",
        "Category", "Budget", "Actual", "Variance", "Var %", "Class"
    );
    println!("   ──────────────────────────┼────────────┼────────────┼────────────┼─────────┼─────────────");
    for row in &report {
        println!(
            "   {:25} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>6.1}% │ {}",
            truncate(&row.category, 25),
            row.budget_usd,
            row.actual_usd,
            row.variance,
            row.variance_pct,
            row.classification.label()
        );
    }

    println!();
    Ok(())
}

pub fn cmd_report_process(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    output: Option<&Path>,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let report = process::variance_by_process(&db.list_budget_rows(campaign.id)?);

    if let Some(path) = output {
        return write_csv(path, &export::process_csv(&report)?);
    }

    println!();
    println!("📊 Variance by Process (campaign {})", campaign.id);

    if report.groups.is_empty() {
        println!("   No budget rows. Upload a budget sheet first.");
        return Ok(());
    }

    for group in &report.groups {
        println!();
        println!(
            "   {}: budget {:.2}, actual {:.2}, variance {:.2} ({:.1}%, {})",
            group.process.label(),
            group.budget_usd,
            group.actual_usd,
            group.variance,
            group.variance_pct,
            group.classification.label()
        );
        for row in &group.categories {
            println!(
                "     {:25} │ {:>10.2} │ {:>10.2} │ {:>6.1}%",
                truncate(&row.category, 25),
                row.budget_usd,
                row.actual_usd,
                row.variance_pct
            );
        }
    }

    println!();
    println!(
        "   Total: budget {:.2}, actual {:.2}, variance {:.2} ({:.1}%, {})",
        report.total_budget_usd,
        report.total_actual_usd,
        report.total_variance,
        report.total_variance_pct,
        report.classification.label()
    );
    println!();
    Ok(())
}

pub fn cmd_report_monthly(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    output: Option<&Path>,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let report = monthly::monthly_execution(&campaign, &db.list_orders(campaign.id)?);

    if let Some(path) = output {
        return write_csv(path, &export::monthly_csv(&report)?);
    }

    println!();
    println!(
        "📅 Monthly Execution (campaign {}, {} {})",
        campaign.id, campaign.season, campaign.year
    );
    println!(
        "   {:10} │ {:>10} │ {:>10} │ {:>12} │ {:>12} │ {:>7}",
        "Month", "Budget", "Actual", "Cum. Budget", "Cum. Actual", "Var %"
    );
    println!("   ───────────┼────────────┼────────────┼──────────────┼──────────────┼─────────");
    for row in &report {
        println!(
            "   {:10} │ {:>10.2} │ {:>10.2} │ {:>12.2} │ {:>12.2} │ {:>6.1}%",
            row.label,
            row.budget_usd,
            row.actual_usd,
            row.cumulative_budget_usd,
            row.cumulative_actual_usd,
            row.variance_pct
        );
    }

    println!();
    Ok(())
}

pub fn cmd_report_lots(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    output: Option<&Path>,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let report = lots::lot_profitability(&db.list_orders(campaign.id)?);

    if let Some(path) = output {
        return write_csv(path, &export::lots_csv(&report)?);
    }

    println!();
    println!("📦 Lot Profitability (campaign {})", campaign.id);

    if report.is_empty() {
        println!("   No packing orders yet.");
        return Ok(());
    }

    println!(
        "   {:12} │ {:25} │ {:>9} │ {:>10} │ {:>10} │ {:>10} │ {:>7}",
        "Order", "Product", "Qty", "Cost", "Est. Sale", "Utility", "Margin"
    );
    println!("   ─────────────┼───────────────────────────┼───────────┼────────────┼────────────┼────────────┼─────────");
    for row in &report {
        println!(
            "   {:12} │ {:25} │ {:>9.2} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>6.1}%",
            truncate(&row.order_number, 12),
            truncate(&row.product_name, 25),
            row.produced_qty,
            row.total_cost_usd,
            row.estimated_sale_usd,
            row.utility_usd,
            row.margin_pct
        );
    }

    println!();
    Ok(())
}

pub fn cmd_report_ratios(
    db: &Database,
    owner: &str,
    campaign_id: Option<i64>,
    hectares: f64,
    output: Option<&Path>,
) -> Result<()> {
    let campaign = resolve_campaign(db, owner, campaign_id)?;
    let report = ratios::campaign_ratios(&campaign, &db.list_orders(campaign.id)?, hectares);

    if let Some(path) = output {
        return write_csv(path, &export::ratios_csv(&report)?);
    }

    println!();
    println!("📈 Campaign Ratios (campaign {})", campaign.id);
    if hectares == 0.0 {
        println!("   💡 Tip: pass --hectares for per-hectare ratios");
    }
    println!("   Cost per kg:           {:.2}", report.cost_per_kg);
    println!("   Cost per hectare:      {:.2}", report.cost_per_hectare);
    println!("   Cost per order:        {:.2}", report.cost_per_order);
    println!("   Yield per hectare:     {:.2}", report.yield_per_hectare);
    println!("   Total production:      {:.2}", report.total_production);
    println!("   Closed orders:         {:.1}%", report.closed_order_pct);
    println!("   Budget execution:      {:.1}%", report.budget_execution_pct);
    println!("   Variance:              {:.1}%", report.variance_pct);
    println!("   Efficiency:            {:.1}%", report.efficiency_pct);
    println!();
    Ok(())
}
