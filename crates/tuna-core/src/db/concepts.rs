//! EEFF concept totals derived from production orders

use rusqlite::params;

use crate::error::Result;
use crate::models::ConceptTotal;

use super::Database;

impl Database {
    /// Replace all concept totals for a campaign.
    ///
    /// Always replaced together with the production orders they were derived
    /// from, so the two tables never disagree.
    pub fn replace_concept_totals(
        &self,
        campaign_id: i64,
        totals: &[ConceptTotal],
    ) -> Result<usize> {
        self.replace_rows(
            "concept_totals",
            campaign_id,
            "INSERT INTO concept_totals
                (campaign_id, concept, nursery_usd, field_usd, packing_usd, total_usd)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            totals,
            |stmt, total| {
                stmt.execute(params![
                    campaign_id,
                    total.concept,
                    total.nursery_usd,
                    total.field_usd,
                    total.packing_usd,
                    total.total_usd,
                ])
            },
        )
    }

    /// All concept totals for a campaign, in insertion order
    pub fn list_concept_totals(&self, campaign_id: i64) -> Result<Vec<ConceptTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT concept, nursery_usd, field_usd, packing_usd, total_usd
             FROM concept_totals WHERE campaign_id = ?1 ORDER BY id",
        )?;
        let totals = stmt
            .query_map(params![campaign_id], |row| {
                Ok(ConceptTotal {
                    concept: row.get(0)?,
                    nursery_usd: row.get(1)?,
                    field_usd: row.get(2)?,
                    packing_usd: row.get(3)?,
                    total_usd: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    /// Concept names for a campaign, the reconciliation engine's match pool
    pub fn concept_names(&self, campaign_id: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT concept FROM concept_totals WHERE campaign_id = ?1 ORDER BY id",
        )?;
        let names = stmt
            .query_map(params![campaign_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}
