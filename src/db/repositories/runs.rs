use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{millis_to_datetime, parse_datetime, to_i64, to_u64},
    models::RunSummary,
};
use crate::models::{BatteryResults, BatteryRun, PickerPlan, RunRecord, RunUnavailable};
use crate::scoring::score_battery;

fn row_to_summary(row: &Row) -> Result<RunSummary> {
    let version: i64 = row.get("version")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(RunSummary {
        run_id: row.get("run_id")?,
        version: to_u64(version, "version")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Upserts the run record stored under `run_id`.
    pub async fn save_run(&self, run_id: &str, record: &RunRecord) -> Result<()> {
        let run_id = run_id.to_string();
        let payload = record
            .to_json()
            .context("failed to serialize run record")?;
        let version = record.version;
        let created_at = millis_to_datetime(record.created_at_ms, "createdAtMs")?;

        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO runs (run_id, version, payload, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(run_id) DO UPDATE SET
                     version = excluded.version,
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                params![
                    run_id,
                    to_i64(version)?,
                    payload,
                    created_at.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to save run {run_id}"))?;
            Ok(())
        })
        .await
    }

    /// Loads the run record for `run_id`.
    ///
    /// `Ok(None)` means no record exists. A stored record with another version or
    /// an unreadable payload is returned as a [`RunUnavailable`] error.
    pub async fn load_run(&self, run_id: &str) -> Result<Option<RunRecord>> {
        let key = run_id.to_string();
        let payload: Option<String> = self
            .execute(move |conn| {
                let payload = conn
                    .query_row(
                        "SELECT payload FROM runs WHERE run_id = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()
                    .context("failed to query run")?;
                Ok(payload)
            })
            .await?;

        match payload {
            None => Ok(None),
            Some(raw) => match RunRecord::from_json(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(reason) => {
                    warn!("Rejected stored run {run_id}: {reason}");
                    Err(anyhow::Error::new(reason))
                }
            },
        }
    }

    /// Overwrites the stored run with a fresh empty record. Irreversible.
    pub async fn clear_run(
        &self,
        run_id: &str,
        repeats: u32,
        picker_plan: PickerPlan,
    ) -> Result<RunRecord> {
        let record = BatteryRun::new(run_id, repeats, picker_plan, Utc::now()).to_record();
        self.save_run(run_id, &record).await?;
        info!("Cleared saved progress for run {run_id}");
        Ok(record)
    }

    pub async fn delete_run(&self, run_id: &str) -> Result<bool> {
        let run_id = run_id.to_string();
        self.execute(move |conn| {
            let deleted = conn
                .execute("DELETE FROM runs WHERE run_id = ?1", params![run_id])
                .context("failed to delete run")?;
            Ok(deleted > 0)
        })
        .await
    }

    /// All stored runs, most recently updated first.
    pub async fn list_runs(&self) -> Result<Vec<RunSummary>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT run_id, version, created_at, updated_at
                 FROM runs
                 ORDER BY updated_at DESC, run_id ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut runs = Vec::new();
            while let Some(row) = rows.next()? {
                runs.push(row_to_summary(row)?);
            }

            Ok(runs)
        })
        .await
    }

    /// Scores the stored run with the same algorithm clients use locally.
    pub async fn get_results(&self, run_id: &str, repeats: u32) -> Result<BatteryResults> {
        let record = self
            .load_run(run_id)
            .await?
            .ok_or_else(|| anyhow::Error::new(RunUnavailable::Missing))?;
        let run = BatteryRun::from_record(run_id, record)?;
        Ok(score_battery(&run, repeats))
    }
}
