//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `campaigns` - Campaign lifecycle operations
//! - `budget` - Budget row storage and category listing
//! - `orders` - Production order storage
//! - `variance` - Pre-aggregated variance row storage
//! - `concepts` - EEFF concept totals derived from orders
//! - `mappings` - Category-to-concept mapping persistence
//! - `uploads` - Upload history tracking
//!
//! Sheet-derived tables (budget rows, orders, variance rows, concept totals)
//! are replaced wholesale per campaign on every upload; see `batch`.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod batch;
mod budget;
mod campaigns;
mod concepts;
mod mappings;
mod orders;
mod uploads;
mod variance;

pub use mappings::MappingUpdate;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/tuna_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Campaigns (half-year budgeting cycles)
            CREATE TABLE IF NOT EXISTS campaigns (
                id INTEGER PRIMARY KEY,
                owner TEXT NOT NULL,
                season TEXT NOT NULL,               -- first_half, second_half
                year INTEGER NOT NULL,
                start_date DATE NOT NULL,
                end_date DATE NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                total_budget REAL NOT NULL DEFAULT 0,
                exchange_rate REAL NOT NULL DEFAULT 1.0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(owner, season, year)
            );

            CREATE INDEX IF NOT EXISTS idx_campaigns_owner ON campaigns(owner);
            CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status);

            -- Budget rows (planned spend line items, replaced per upload)
            CREATE TABLE IF NOT EXISTS budget_rows (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                code TEXT,
                category TEXT NOT NULL,
                process TEXT NOT NULL,              -- nursery, field, packing
                budget_usd REAL NOT NULL DEFAULT 0,
                actual_usd REAL,
                exchange_rate REAL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_budget_rows_campaign ON budget_rows(campaign_id);
            CREATE INDEX IF NOT EXISTS idx_budget_rows_process ON budget_rows(process);

            -- Production orders (work-order ledger rows, replaced per upload)
            CREATE TABLE IF NOT EXISTS production_orders (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                order_number TEXT NOT NULL,
                process TEXT NOT NULL,
                open_date DATE,
                close_date DATE,
                status TEXT NOT NULL DEFAULT 'other',
                product_code TEXT,
                product_name TEXT NOT NULL,
                estimated_qty REAL NOT NULL DEFAULT 0,
                produced_qty REAL NOT NULL DEFAULT 0,
                qty_variance REAL NOT NULL DEFAULT 0,
                period_expense REAL NOT NULL DEFAULT 0,
                cumulative_expense REAL NOT NULL DEFAULT 0,
                unit_cost REAL NOT NULL DEFAULT 0,
                total_cost REAL NOT NULL DEFAULT 0,
                labor_hours REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_orders_campaign ON production_orders(campaign_id);
            CREATE INDEX IF NOT EXISTS idx_orders_process ON production_orders(process);
            CREATE INDEX IF NOT EXISTS idx_orders_open_date ON production_orders(open_date);

            -- Variance rows (pre-aggregated worksheet rows, replaced per upload)
            CREATE TABLE IF NOT EXISTS variance_rows (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                rubric TEXT NOT NULL,
                budget_usd REAL NOT NULL DEFAULT 0,
                actual_usd REAL NOT NULL DEFAULT 0,
                variance REAL NOT NULL DEFAULT 0,
                variance_pct REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_variance_rows_campaign ON variance_rows(campaign_id);

            -- Concept totals (EEFF concept x process spend matrix, derived
            -- from production orders and replaced alongside them)
            CREATE TABLE IF NOT EXISTS concept_totals (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                concept TEXT NOT NULL,
                nursery_usd REAL NOT NULL DEFAULT 0,
                field_usd REAL NOT NULL DEFAULT 0,
                packing_usd REAL NOT NULL DEFAULT 0,
                total_usd REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_concept_totals_campaign ON concept_totals(campaign_id);

            -- Category mappings (reconciliation artifacts; upserted, never
            -- wholesale-replaced, so confirmations survive re-reconciliation)
            CREATE TABLE IF NOT EXISTS category_mappings (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                category TEXT NOT NULL,
                process TEXT NOT NULL,
                eeff_concept TEXT NOT NULL DEFAULT '',
                confidence REAL NOT NULL DEFAULT 0,
                match_type TEXT NOT NULL DEFAULT 'none',
                confirmed BOOLEAN NOT NULL DEFAULT 0,
                confirmed_at DATETIME,
                reasoning TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(campaign_id, category, process)
            );

            CREATE INDEX IF NOT EXISTS idx_mappings_campaign ON category_mappings(campaign_id);
            CREATE INDEX IF NOT EXISTS idx_mappings_match_type ON category_mappings(match_type);

            -- Uploads (tracks each sheet ingestion for history/auditing)
            CREATE TABLE IF NOT EXISTS uploads (
                id INTEGER PRIMARY KEY,
                campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                file_name TEXT NOT NULL,
                kind TEXT NOT NULL,                 -- budget, orders, variance
                content_hash TEXT NOT NULL,         -- SHA-256 of the uploaded bytes
                status TEXT NOT NULL DEFAULT 'processing',
                processed_rows INTEGER NOT NULL DEFAULT 0,
                skipped_rows INTEGER NOT NULL DEFAULT 0,
                warnings TEXT,                      -- JSON array of warning strings
                error TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                finished_at DATETIME
            );

            CREATE INDEX IF NOT EXISTS idx_uploads_campaign ON uploads(campaign_id);
            CREATE INDEX IF NOT EXISTS idx_uploads_hash ON uploads(content_hash);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
