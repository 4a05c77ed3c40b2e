use super::models::{ClassifierMode, RunRecord, RunStatus};
use super::store::RunStore;
use crate::error::{Error, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

impl RunStore {
    /// Insert or replace a run, then drop the oldest runs beyond the history limit.
    pub fn save(&self, record: &RunRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let tx = self.connection().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO run (run_id, status, mode, created_at, updated_at, record) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(run_id) DO UPDATE SET \
             status = excluded.status, updated_at = excluded.updated_at, record = excluded.record",
            params![
                record.run_id,
                record.status.as_str(),
                record.mode.as_str(),
                record.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
                json,
            ],
        )?;

        let trimmed = tx.execute(
            "DELETE FROM run WHERE seq NOT IN \
             (SELECT seq FROM run ORDER BY seq DESC LIMIT ?1)",
            params![self.max_history_items() as i64],
        )?;

        tx.commit()?;

        if trimmed > 0 {
            debug!("Trimmed {} run(s) beyond history limit", trimmed);
        }
        Ok(())
    }

    pub fn get(&self, run_id: &str) -> Result<Option<RunRecord>> {
        let json: Option<String> = self
            .connection()
            .query_row(
                "SELECT record FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Runs newest first, optionally filtered by status and mode.
    pub fn list(
        &self,
        status: Option<RunStatus>,
        mode: Option<ClassifierMode>,
    ) -> Result<Vec<RunRecord>> {
        let mut stmt = self.connection().prepare(
            "SELECT record FROM run \
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR mode = ?2) \
             ORDER BY seq DESC",
        )?;

        let rows = stmt
            .query_map(
                params![status.map(|s| s.as_str()), mode.map(|m| m.as_str())],
                |row| row.get::<_, String>(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(Error::from))
            .collect()
    }

    pub fn delete(&self, run_id: &str) -> Result<()> {
        let deleted = self
            .connection()
            .execute("DELETE FROM run WHERE run_id = ?1", params![run_id])?;
        if deleted == 0 {
            return Err(Error::RunNotFound(run_id.to_string()));
        }
        debug!("Deleted run {}", run_id);
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
