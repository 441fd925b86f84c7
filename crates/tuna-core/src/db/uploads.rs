//! Upload history tracking

use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::models::{Upload, UploadStatus};

use super::{parse_datetime, Database};

fn upload_from_row(row: &Row<'_>) -> rusqlite::Result<Upload> {
    let status_str: String = row.get(5)?;
    let created_str: String = row.get(10)?;
    let finished_str: Option<String> = row.get(11)?;

    Ok(Upload {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        file_name: row.get(2)?,
        kind: row.get(3)?,
        content_hash: row.get(4)?,
        status: status_str.parse().unwrap_or(UploadStatus::Failed),
        processed_rows: row.get(6)?,
        skipped_rows: row.get(7)?,
        warnings: row.get(8)?,
        error: row.get(9)?,
        created_at: parse_datetime(&created_str),
        finished_at: finished_str.map(|s| parse_datetime(&s)),
    })
}

const UPLOAD_COLUMNS: &str = "id, campaign_id, file_name, kind, content_hash, status, \
     processed_rows, skipped_rows, warnings, error, created_at, finished_at";

impl Database {
    /// Record the start of an upload; status begins as `processing`
    pub fn create_upload(
        &self,
        campaign_id: i64,
        file_name: &str,
        kind: &str,
        content_hash: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO uploads (campaign_id, file_name, kind, content_hash, status)
             VALUES (?1, ?2, ?3, ?4, 'processing')",
            params![campaign_id, file_name, kind, content_hash],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Mark an upload completed with its row counts and warnings
    pub fn finish_upload(
        &self,
        upload_id: i64,
        processed_rows: usize,
        skipped_rows: usize,
        warnings: &[String],
    ) -> Result<()> {
        let warnings_json = if warnings.is_empty() {
            None
        } else {
            Some(serde_json::to_string(warnings)?)
        };

        let conn = self.conn()?;
        conn.execute(
            "UPDATE uploads
             SET status = 'completed', processed_rows = ?1, skipped_rows = ?2,
                 warnings = ?3, finished_at = CURRENT_TIMESTAMP
             WHERE id = ?4",
            params![processed_rows as i64, skipped_rows as i64, warnings_json, upload_id],
        )?;
        Ok(())
    }

    /// Mark an upload failed with its error message
    pub fn fail_upload(&self, upload_id: i64, error: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE uploads
             SET status = 'failed', error = ?1, finished_at = CURRENT_TIMESTAMP
             WHERE id = ?2",
            params![error, upload_id],
        )?;
        Ok(())
    }

    /// Fetch one upload by id
    pub fn get_upload(&self, id: i64) -> Result<Upload> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM uploads WHERE id = ?1", UPLOAD_COLUMNS),
            params![id],
            upload_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("upload {}", id)))
    }

    /// Upload history for a campaign, newest first
    pub fn list_uploads(&self, campaign_id: i64) -> Result<Vec<Upload>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM uploads WHERE campaign_id = ?1 ORDER BY id DESC",
            UPLOAD_COLUMNS
        ))?;
        let uploads = stmt
            .query_map(params![campaign_id], upload_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(uploads)
    }
}
