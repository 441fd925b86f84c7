//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tuna - Agricultural campaign budget reconciliation
#[derive(Parser)]
#[command(name = "tuna")]
#[command(about = "Budget vs. actuals reconciliation for agricultural campaigns", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tuna.db", global = true)]
    pub db: PathBuf,

    /// Campaign owner (separates campaigns per user)
    #[arg(long, default_value = "default", global = true)]
    pub owner: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Upload a budget, production-order, or variance spreadsheet
    Upload {
        /// Spreadsheet file to ingest (.xlsx, .xls, .csv, .tsv)
        #[arg(short, long)]
        file: PathBuf,

        /// Sheet kind (auto-detected if not specified): budget, orders, variance
        #[arg(short, long)]
        kind: Option<String>,

        /// Target campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,
    },

    /// Run category-to-concept reconciliation for a campaign
    Reconcile {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Skip the AI pass; exact matching with alias fallback only
        #[arg(long)]
        no_ai: bool,
    },

    /// Manage category mappings (list, confirm, set)
    Mappings {
        #[command(subcommand)]
        action: Option<MappingsAction>,
    },

    /// Generate campaign reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Manage campaigns (list, close, rate)
    Campaigns {
        #[command(subcommand)]
        action: Option<CampaignsAction>,
    },

    /// Show database and campaign status
    Status {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum MappingsAction {
    /// List mappings for a campaign
    List {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Only show unconfirmed mappings
        #[arg(long)]
        pending: bool,
    },

    /// Confirm a suggested mapping
    Confirm {
        /// Mapping ID
        id: i64,
    },

    /// Manually map a category to an EEFF concept
    Set {
        /// Mapping ID
        id: i64,
        /// EEFF concept to assign
        concept: String,
    },
}

#[derive(Subcommand)]
pub enum CampaignsAction {
    /// List campaigns for the owner
    List,

    /// Close a campaign (blocks further uploads)
    Close {
        /// Campaign ID
        id: i64,
    },

    /// Set the campaign exchange rate
    Rate {
        /// Campaign ID
        id: i64,
        /// Local-currency units per USD
        rate: f64,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Budget vs. actual variance by category
    Category {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Write CSV to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Variance grouped by production process with subtotals
    Process {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Write CSV to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Month-by-month budget execution
    Monthly {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Write CSV to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Profitability per packing lot
    Lots {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Write CSV to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Campaign KPI set (cost per kg, yield, execution, ...)
    Ratios {
        /// Campaign ID (defaults to the owner's current season)
        #[arg(short, long)]
        campaign: Option<i64>,

        /// Planted hectares for per-hectare ratios
        #[arg(long, default_value = "0")]
        hectares: f64,

        /// Write CSV to this file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
