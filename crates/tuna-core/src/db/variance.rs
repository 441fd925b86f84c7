//! Pre-aggregated variance row storage

use rusqlite::{params, Row};

use crate::error::Result;
use crate::models::{NewVarianceRow, VarianceRow};

use super::{parse_datetime, Database};

fn variance_row_from_row(row: &Row<'_>) -> rusqlite::Result<VarianceRow> {
    let created_str: String = row.get(7)?;

    Ok(VarianceRow {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        rubric: row.get(2)?,
        budget_usd: row.get(3)?,
        actual_usd: row.get(4)?,
        variance: row.get(5)?,
        variance_pct: row.get(6)?,
        created_at: parse_datetime(&created_str),
    })
}

impl Database {
    /// Replace all variance rows for a campaign with a freshly parsed sheet
    pub fn replace_variance_rows(
        &self,
        campaign_id: i64,
        rows: &[NewVarianceRow],
    ) -> Result<usize> {
        self.replace_rows(
            "variance_rows",
            campaign_id,
            "INSERT INTO variance_rows
                (campaign_id, rubric, budget_usd, actual_usd, variance, variance_pct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rows,
            |stmt, row| {
                stmt.execute(params![
                    campaign_id,
                    row.rubric,
                    row.budget_usd,
                    row.actual_usd,
                    row.variance,
                    row.variance_pct,
                ])
            },
        )
    }

    /// All variance rows for a campaign, in sheet order
    pub fn list_variance_rows(&self, campaign_id: i64) -> Result<Vec<VarianceRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, rubric, budget_usd, actual_usd, variance, variance_pct,
                    created_at
             FROM variance_rows WHERE campaign_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![campaign_id], variance_row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
