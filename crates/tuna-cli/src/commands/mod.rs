//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `campaigns` - Campaign management commands (list, close, rate)
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `mappings` - Category mapping commands (list, confirm, set)
//! - `reconcile` - Reconciliation command
//! - `reports` - Report generation and CSV export commands
//! - `upload` - Spreadsheet upload command

pub mod campaigns;
pub mod core;
pub mod mappings;
pub mod reconcile;
pub mod reports;
pub mod upload;

// Re-export command functions for main.rs
pub use campaigns::*;
pub use core::*;
pub use mappings::*;
pub use reconcile::*;
pub use reports::*;
pub use upload::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
