//! Campaign lifecycle operations

use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Campaign, CampaignStatus, Season};

use super::{parse_datetime, Database};

fn campaign_from_row(row: &Row<'_>) -> rusqlite::Result<Campaign> {
    let season_str: String = row.get(2)?;
    let status_str: String = row.get(6)?;
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let created_str: String = row.get(9)?;

    Ok(Campaign {
        id: row.get(0)?,
        owner: row.get(1)?,
        season: season_str.parse().unwrap_or(Season::FirstHalf),
        year: row.get(3)?,
        start_date: NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").unwrap_or_default(),
        end_date: NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").unwrap_or_default(),
        status: status_str.parse().unwrap_or(CampaignStatus::Active),
        total_budget: row.get(7)?,
        exchange_rate: row.get(8)?,
        created_at: parse_datetime(&created_str),
    })
}

const CAMPAIGN_COLUMNS: &str = "id, owner, season, year, start_date, end_date, status, \
     total_budget, exchange_rate, created_at";

impl Database {
    /// Find the campaign for (owner, season, year), creating it if missing.
    ///
    /// Uploads always land in a campaign; this is how one comes to exist.
    pub fn ensure_campaign(&self, owner: &str, season: Season, year: i32) -> Result<Campaign> {
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                &format!(
                    "SELECT {} FROM campaigns WHERE owner = ?1 AND season = ?2 AND year = ?3",
                    CAMPAIGN_COLUMNS
                ),
                params![owner, season.as_str(), year],
                campaign_from_row,
            )
            .optional()?;

        if let Some(campaign) = existing {
            return Ok(campaign);
        }

        let (start, end) = season.window(year);
        conn.execute(
            "INSERT INTO campaigns (owner, season, year, start_date, end_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, 'active')",
            params![
                owner,
                season.as_str(),
                year,
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!(owner, season = %season, year, id, "Created campaign");
        self.get_campaign(id)
    }

    /// Campaign for the current date's season, creating it if missing
    pub fn ensure_current_campaign(&self, owner: &str) -> Result<Campaign> {
        let today = Utc::now().date_naive();
        self.ensure_campaign(owner, Season::for_date(today), today.year())
    }

    /// Fetch one campaign by id
    pub fn get_campaign(&self, id: i64) -> Result<Campaign> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM campaigns WHERE id = ?1", CAMPAIGN_COLUMNS),
            params![id],
            campaign_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("campaign {}", id)))
    }

    /// All campaigns for an owner, newest first
    pub fn list_campaigns(&self, owner: &str) -> Result<Vec<Campaign>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM campaigns WHERE owner = ?1 ORDER BY year DESC, season DESC",
            CAMPAIGN_COLUMNS
        ))?;
        let campaigns = stmt
            .query_map(params![owner], campaign_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(campaigns)
    }

    /// Recompute and store a campaign's total budget from its budget rows
    pub fn refresh_total_budget(&self, campaign_id: i64) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(budget_usd), 0) FROM budget_rows WHERE campaign_id = ?1",
            params![campaign_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "UPDATE campaigns SET total_budget = ?1 WHERE id = ?2",
            params![total, campaign_id],
        )?;
        Ok(total)
    }

    /// Update a campaign's USD exchange rate
    pub fn set_exchange_rate(&self, campaign_id: i64, rate: f64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE campaigns SET exchange_rate = ?1 WHERE id = ?2",
            params![rate, campaign_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("campaign {}", campaign_id)));
        }
        Ok(())
    }

    /// Close a campaign; uploads against a closed campaign are rejected
    pub fn close_campaign(&self, campaign_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE campaigns SET status = 'closed' WHERE id = ?1",
            params![campaign_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("campaign {}", campaign_id)));
        }
        info!(campaign_id, "Closed campaign");
        Ok(())
    }
}
