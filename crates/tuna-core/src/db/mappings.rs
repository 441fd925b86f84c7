//! Category-to-concept mapping persistence
//!
//! Mappings are upserted on (campaign, category, process) rather than
//! wholesale-replaced: a human-confirmed mapping survives any later
//! re-reconciliation run.

use rusqlite::{params, types::Value, OptionalExtension, Row};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{CategoryMapping, MatchType, Process};
use crate::recon::MappingCandidate;

use super::{parse_datetime, Database};

/// Patch-style update for a single mapping; `None` fields are left untouched
#[derive(Debug, Default, Clone)]
pub struct MappingUpdate {
    pub eeff_concept: Option<String>,
    pub confidence: Option<f64>,
    pub confirmed: Option<bool>,
}

fn mapping_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryMapping> {
    let process_str: String = row.get(3)?;
    let match_type_str: String = row.get(6)?;
    let confirmed_at_str: Option<String> = row.get(8)?;
    let created_str: String = row.get(10)?;

    Ok(CategoryMapping {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        category: row.get(2)?,
        process: process_str.parse().unwrap_or(Process::Field),
        eeff_concept: row.get(4)?,
        confidence: row.get(5)?,
        match_type: match_type_str.parse().unwrap_or(MatchType::None),
        confirmed: row.get(7)?,
        confirmed_at: confirmed_at_str.map(|s| parse_datetime(&s)),
        reasoning: row.get(9)?,
        created_at: parse_datetime(&created_str),
    })
}

const MAPPING_COLUMNS: &str = "id, campaign_id, category, process, eeff_concept, confidence, \
     match_type, confirmed, confirmed_at, reasoning, created_at";

impl Database {
    /// Upsert reconciliation candidates for a campaign.
    ///
    /// Exact matches are auto-confirmed; everything else lands unconfirmed.
    /// Rows already confirmed by a human are never overwritten. Returns the
    /// number of candidates written.
    pub fn save_mappings(&self, campaign_id: i64, candidates: &[MappingCandidate]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO category_mappings
                    (campaign_id, category, process, eeff_concept, confidence,
                     match_type, confirmed, confirmed_at, reasoning)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                         CASE WHEN ?7 THEN CURRENT_TIMESTAMP END, ?8)
                 ON CONFLICT(campaign_id, category, process) DO UPDATE SET
                    eeff_concept = excluded.eeff_concept,
                    confidence = excluded.confidence,
                    match_type = excluded.match_type,
                    confirmed = excluded.confirmed,
                    confirmed_at = excluded.confirmed_at,
                    reasoning = excluded.reasoning
                 WHERE category_mappings.confirmed = 0",
            )?;

            for candidate in candidates {
                let auto_confirmed = candidate.match_type == MatchType::Exact;
                stmt.execute(params![
                    campaign_id,
                    candidate.category,
                    candidate.process.as_str(),
                    candidate.eeff_concept,
                    candidate.confidence,
                    candidate.match_type.as_str(),
                    auto_confirmed,
                    candidate.reasoning,
                ])?;
                written += 1;
            }
        }

        tx.commit()?;
        info!(campaign_id, written, "Saved category mappings");
        Ok(written)
    }

    /// All mappings for a campaign, in sheet order of first appearance
    pub fn list_mappings(&self, campaign_id: i64) -> Result<Vec<CategoryMapping>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM category_mappings WHERE campaign_id = ?1 ORDER BY id",
            MAPPING_COLUMNS
        ))?;
        let mappings = stmt
            .query_map(params![campaign_id], mapping_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }

    /// Fetch one mapping by id
    pub fn get_mapping(&self, id: i64) -> Result<CategoryMapping> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM category_mappings WHERE id = ?1", MAPPING_COLUMNS),
            params![id],
            mapping_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("mapping {}", id)))
    }

    /// Apply a patch-style update to one mapping.
    ///
    /// Setting `eeff_concept` marks the row as a confirmed manual override;
    /// `confirmed: Some(true)` alone accepts the suggestion as-is.
    pub fn update_mapping(&self, id: i64, update: &MappingUpdate) -> Result<CategoryMapping> {
        let conn = self.conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ref concept) = update.eeff_concept {
            sets.push("eeff_concept = ?");
            values.push(Value::Text(concept.clone()));
            sets.push("match_type = ?");
            values.push(Value::Text(MatchType::Exact.as_str().to_string()));
            sets.push("confidence = ?");
            values.push(Value::Real(100.0));
            sets.push("confirmed = 1");
            sets.push("confirmed_at = CURRENT_TIMESTAMP");
        }
        if let Some(confidence) = update.confidence {
            sets.push("confidence = ?");
            values.push(Value::Real(confidence));
        }
        if let Some(confirmed) = update.confirmed {
            if confirmed {
                sets.push("confirmed = 1");
                sets.push("confirmed_at = CURRENT_TIMESTAMP");
            } else {
                sets.push("confirmed = 0");
                sets.push("confirmed_at = NULL");
            }
        }

        if sets.is_empty() {
            return self.get_mapping(id);
        }

        // Positional placeholders are numbered in order of appearance
        let mut sql = String::from("UPDATE category_mappings SET ");
        let mut next = 1;
        let rendered: Vec<String> = sets
            .iter()
            .map(|clause| {
                if clause.contains('?') {
                    let numbered = clause.replace('?', &format!("?{}", next));
                    next += 1;
                    numbered
                } else {
                    clause.to_string()
                }
            })
            .collect();
        sql.push_str(&rendered.join(", "));
        sql.push_str(&format!(" WHERE id = ?{}", next));
        values.push(Value::Integer(id));

        let updated = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        if updated == 0 {
            return Err(Error::NotFound(format!("mapping {}", id)));
        }

        self.get_mapping(id)
    }

    /// Count of mappings still awaiting confirmation or manual resolution
    pub fn pending_mapping_count(&self, campaign_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM category_mappings
             WHERE campaign_id = ?1 AND confirmed = 0",
            params![campaign_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
