//! Tuna Core Library
//!
//! Shared functionality for the Tuna budget reconciliation tool:
//! - Spreadsheet type detection and Spanish-header column auto-mapping
//! - Sheet parsers for budget, production-order, and variance workbooks
//! - Three-pass category-to-EEFF-concept reconciliation engine
//! - SQLite persistence with idempotent per-campaign replacement
//! - Reporting views (category, process, monthly, lots, ratios) and CSV
//!   export

pub mod ai;
pub mod aliases;
pub mod columns;
pub mod db;
pub mod detect;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod recon;
pub mod reports;
pub mod settings;
pub mod upload;
pub mod workbook;

pub use ai::{AiClient, Completion, CompletionBackend, MockBackend, OpenAICompatibleBackend};
pub use aliases::AliasTable;
pub use columns::{ColumnMap, FieldId, SheetLayout};
pub use db::{Database, MappingUpdate};
pub use detect::{detect_sheet_kind, SheetKind};
pub use error::{Error, Result};
pub use recon::{CategoryInput, MappingCandidate, ReconciliationEngine};
pub use settings::{AiConfig, AiSettings};
pub use upload::{process_upload, UploadOutcome};
