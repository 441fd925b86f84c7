//! Budget row storage and category listing

use rusqlite::{params, Row};

use crate::error::Result;
use crate::models::{BudgetRow, NewBudgetRow, Process};
use crate::recon::CategoryInput;

use super::{parse_datetime, Database};

fn budget_row_from_row(row: &Row<'_>) -> rusqlite::Result<BudgetRow> {
    let process_str: String = row.get(4)?;
    let created_str: String = row.get(8)?;

    Ok(BudgetRow {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        code: row.get(2)?,
        category: row.get(3)?,
        process: process_str.parse().unwrap_or(Process::Field),
        budget_usd: row.get(5)?,
        actual_usd: row.get(6)?,
        exchange_rate: row.get(7)?,
        created_at: parse_datetime(&created_str),
    })
}

impl Database {
    /// Replace all budget rows for a campaign with a freshly parsed sheet
    pub fn replace_budget_rows(&self, campaign_id: i64, rows: &[NewBudgetRow]) -> Result<usize> {
        self.replace_rows(
            "budget_rows",
            campaign_id,
            "INSERT INTO budget_rows
                (campaign_id, code, category, process, budget_usd, actual_usd, exchange_rate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rows,
            |stmt, row| {
                stmt.execute(params![
                    campaign_id,
                    row.code,
                    row.category,
                    row.process.as_str(),
                    row.budget_usd,
                    row.actual_usd,
                    row.exchange_rate,
                ])
            },
        )
    }

    /// All budget rows for a campaign, in sheet order
    pub fn list_budget_rows(&self, campaign_id: i64) -> Result<Vec<BudgetRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, code, category, process, budget_usd, actual_usd,
                    exchange_rate, created_at
             FROM budget_rows WHERE campaign_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![campaign_id], budget_row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Distinct (category, process) pairs for a campaign, in sheet order.
    ///
    /// This is the reconciliation engine's input list; order matters because
    /// the engine's tie-break is first-in-order-wins.
    pub fn budget_categories(&self, campaign_id: i64) -> Result<Vec<CategoryInput>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, process FROM budget_rows
             WHERE campaign_id = ?1
             GROUP BY category, process
             ORDER BY MIN(id)",
        )?;
        let categories = stmt
            .query_map(params![campaign_id], |row| {
                let process_str: String = row.get(1)?;
                Ok(CategoryInput {
                    category: row.get(0)?,
                    process: process_str.parse().unwrap_or(Process::Field),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }
}
