//! Progress repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist per-day completion records with upsert semantics.
//! - Exclude records of tombstoned goals from owner-level queries.
//!
//! # Invariants
//! - At most one row exists per `(goal_uuid, date)` (schema PRIMARY KEY).
//! - Concurrent upserts of the same pair are last-write-wins.
//! - Records are never deleted independently of their goal.

use crate::model::goal::{GoalId, OwnerId};
use crate::model::progress::ProgressRecord;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PROGRESS_COLUMNS: &[&str] = &["goal_uuid", "date", "completed", "value"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for progress persistence.
pub trait ProgressRepository {
    /// Returns the record for `(goal, date)`, or `None` when the day was
    /// never acted upon.
    fn get_progress(&self, goal: GoalId, date: NaiveDate) -> RepoResult<Option<ProgressRecord>>;
    /// Lists all records of the owner's visible goals.
    fn list_progress(&self, owner: OwnerId) -> RepoResult<Vec<ProgressRecord>>;
    /// Inserts or replaces the record for `(goal, date)`.
    fn upsert_progress(
        &self,
        goal: GoalId,
        date: NaiveDate,
        completed: bool,
        value: Option<f64>,
    ) -> RepoResult<ProgressRecord>;
}

/// SQLite-backed progress repository.
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "progress", PROGRESS_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn get_progress(&self, goal: GoalId, date: NaiveDate) -> RepoResult<Option<ProgressRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT goal_uuid, date, completed, value
             FROM progress
             WHERE goal_uuid = ?1 AND date = ?2;",
        )?;

        let mut rows = stmt.query(params![
            goal.to_string(),
            date.format(DATE_FORMAT).to_string()
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_progress_row(row)?));
        }

        Ok(None)
    }

    fn list_progress(&self, owner: OwnerId) -> RepoResult<Vec<ProgressRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.goal_uuid, p.date, p.completed, p.value
             FROM progress p
             JOIN goals g ON g.uuid = p.goal_uuid
             WHERE g.owner_uuid = ?1
               AND g.is_deleted = 0
             ORDER BY p.date ASC, p.goal_uuid ASC;",
        )?;

        let mut rows = stmt.query(params![owner.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_progress_row(row)?);
        }

        Ok(records)
    }

    fn upsert_progress(
        &self,
        goal: GoalId,
        date: NaiveDate,
        completed: bool,
        value: Option<f64>,
    ) -> RepoResult<ProgressRecord> {
        self.conn.execute(
            "INSERT INTO progress (goal_uuid, date, completed, value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (goal_uuid, date) DO UPDATE SET
                completed = excluded.completed,
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                goal.to_string(),
                date.format(DATE_FORMAT).to_string(),
                i64::from(completed),
                value,
            ],
        )?;

        Ok(ProgressRecord {
            goal,
            date,
            completed,
            value,
        })
    }
}

fn parse_progress_row(row: &Row<'_>) -> RepoResult<ProgressRecord> {
    let goal_text: String = row.get("goal_uuid")?;
    let goal = Uuid::parse_str(&goal_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{goal_text}` in progress.goal_uuid"
        ))
    })?;

    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in progress.date"))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in progress.completed"
            )));
        }
    };

    Ok(ProgressRecord {
        goal,
        date,
        completed,
        value: row.get("value")?,
    })
}
