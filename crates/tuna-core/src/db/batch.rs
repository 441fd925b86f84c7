//! Delete-then-insert replacement for sheet-derived tables
//!
//! Re-uploading a sheet for a campaign must be idempotent: existing rows for
//! the campaign are deleted, then the parsed rows are inserted in fixed-size
//! batches, each batch in its own transaction. A mid-stream failure leaves
//! earlier batches committed and surfaces as `Error::PartialReplace` naming
//! the table, failed batch, and committed row count, so the caller can tell
//! the table is in a partially-replaced state.

use rusqlite::params;

use crate::error::{Error, Result};

use super::Database;

/// Rows per insert transaction
pub(crate) const INSERT_BATCH_SIZE: usize = 100;

impl Database {
    /// Replace all rows of `table` belonging to `campaign_id` with `rows`.
    ///
    /// `bind` executes the prepared `insert_sql` once per row. Returns the
    /// number of rows inserted.
    pub(crate) fn replace_rows<T>(
        &self,
        table: &str,
        campaign_id: i64,
        insert_sql: &str,
        rows: &[T],
        bind: impl Fn(&mut rusqlite::Statement<'_>, &T) -> rusqlite::Result<usize>,
    ) -> Result<usize> {
        let mut conn = self.conn()?;

        conn.execute(
            &format!("DELETE FROM {} WHERE campaign_id = ?1", table),
            params![campaign_id],
        )?;

        let mut committed = 0usize;
        for (batch, chunk) in rows.chunks(INSERT_BATCH_SIZE).enumerate() {
            let tx = conn.transaction()?;

            let inserted = {
                let mut stmt = match tx.prepare(insert_sql) {
                    Ok(stmt) => stmt,
                    Err(e) => return Err(partial(table, batch, committed, e)),
                };
                let mut inserted = 0usize;
                let mut failure = None;
                for row in chunk {
                    match bind(&mut stmt, row) {
                        Ok(_) => inserted += 1,
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                if let Some(e) = failure {
                    return Err(partial(table, batch, committed, e));
                }
                inserted
            };

            if let Err(e) = tx.commit() {
                return Err(partial(table, batch, committed, e));
            }
            committed += inserted;
        }

        Ok(committed)
    }
}

fn partial(table: &str, batch: usize, committed: usize, source: rusqlite::Error) -> Error {
    Error::PartialReplace {
        table: table.to_string(),
        batch,
        committed,
        source,
    }
}
