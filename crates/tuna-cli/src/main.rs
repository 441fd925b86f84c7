//! Tuna CLI - Budget reconciliation for agricultural campaigns
//!
//! Usage:
//!   tuna init                       Initialize database
//!   tuna upload --file sheet.xlsx   Ingest a spreadsheet (auto-detects kind)
//!   tuna reconcile                  Map budget categories to EEFF concepts
//!   tuna report category            Show variance reports

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Upload {
            file,
            kind,
            campaign,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_upload(&db, &cli.owner, campaign, &file, kind.as_deref())
        }
        Commands::Reconcile { campaign, no_ai } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_reconcile(&db, &cli.owner, campaign, no_ai).await
        }
        Commands::Mappings { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_mappings_list(&db, &cli.owner, None, false),
                Some(MappingsAction::List { campaign, pending }) => {
                    commands::cmd_mappings_list(&db, &cli.owner, campaign, pending)
                }
                Some(MappingsAction::Confirm { id }) => commands::cmd_mappings_confirm(&db, id),
                Some(MappingsAction::Set { id, concept }) => {
                    commands::cmd_mappings_set(&db, id, &concept)
                }
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db)?;
            match report_type {
                ReportType::Category { campaign, output } => {
                    commands::cmd_report_category(&db, &cli.owner, campaign, output.as_deref())
                }
                ReportType::Process { campaign, output } => {
                    commands::cmd_report_process(&db, &cli.owner, campaign, output.as_deref())
                }
                ReportType::Monthly { campaign, output } => {
                    commands::cmd_report_monthly(&db, &cli.owner, campaign, output.as_deref())
                }
                ReportType::Lots { campaign, output } => {
                    commands::cmd_report_lots(&db, &cli.owner, campaign, output.as_deref())
                }
                ReportType::Ratios {
                    campaign,
                    hectares,
                    output,
                } => commands::cmd_report_ratios(
                    &db,
                    &cli.owner,
                    campaign,
                    hectares,
                    output.as_deref(),
                ),
            }
        }
        Commands::Campaigns { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(CampaignsAction::List) => {
                    commands::cmd_campaigns_list(&db, &cli.owner)
                }
                Some(CampaignsAction::Close { id }) => commands::cmd_campaigns_close(&db, id),
                Some(CampaignsAction::Rate { id, rate }) => {
                    commands::cmd_campaigns_rate(&db, id, rate)
                }
            }
        }
        Commands::Status { campaign } => commands::cmd_status(&cli.db, &cli.owner, campaign),
    }
}
