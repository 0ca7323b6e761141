//! Goal repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over `goals` storage.
//! - Keep SQL and column mapping inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Goal::validate()` before SQL mutations.
//! - Read paths reject structurally invalid persisted state; an empty
//!   weekly day set is tolerated and degrades to "never active".
//! - List order is creation order (insertion order of the collection).

use crate::model::goal::{Goal, GoalId, OwnerId, Recurrence, WeekdaySet};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    name,
    description,
    recurrence,
    days_of_week,
    target_value,
    created_at,
    is_deleted
FROM goals";

const GOAL_COLUMNS: &[&str] = &[
    "uuid",
    "owner_uuid",
    "name",
    "description",
    "recurrence",
    "days_of_week",
    "target_value",
    "created_at",
    "is_deleted",
];

const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Repository interface for goal persistence.
pub trait GoalRepository {
    /// Persists a new goal and returns its stable id.
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    /// Gets one goal by id with optional tombstone visibility.
    fn get_goal(&self, id: GoalId, include_deleted: bool) -> RepoResult<Option<Goal>>;
    /// Lists the owner's visible goals in creation order.
    fn list_goals(&self, owner: OwnerId) -> RepoResult<Vec<Goal>>;
    /// Soft-deletes a goal; its progress rows stay behind as orphans.
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "goals", GOAL_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;

        let (recurrence, days_of_week) = recurrence_to_db(&goal.recurrence);
        self.conn.execute(
            "INSERT INTO goals (
                uuid,
                owner_uuid,
                name,
                description,
                recurrence,
                days_of_week,
                target_value,
                created_at,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                goal.uuid.to_string(),
                goal.owner.to_string(),
                goal.name.as_str(),
                goal.description.as_str(),
                recurrence,
                days_of_week,
                goal.target_value,
                goal.created_at.format(CREATED_AT_FORMAT).to_string(),
                i64::from(goal.is_deleted),
            ],
        )?;

        Ok(goal.uuid)
    }

    fn get_goal(&self, id: GoalId, include_deleted: bool) -> RepoResult<Option<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), i64::from(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }

        Ok(None)
    }

    fn list_goals(&self, owner: OwnerId) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE owner_uuid = ?1
               AND is_deleted = 0
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query(params![owner.to_string()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }

        Ok(goals)
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in goals.uuid"))
    })?;

    let owner_text: String = row.get("owner_uuid")?;
    let owner = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{owner_text}` in goals.owner_uuid"
        ))
    })?;

    let recurrence_text: String = row.get("recurrence")?;
    let days_of_week: Option<String> = row.get("days_of_week")?;
    let recurrence = parse_recurrence(&recurrence_text, days_of_week.as_deref())?;

    let created_at_text: String = row.get("created_at")?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_text, CREATED_AT_FORMAT)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{created_at_text}` in goals.created_at"
            ))
        })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in goals.is_deleted"
            )));
        }
    };

    Ok(Goal {
        uuid,
        owner,
        name: row.get("name")?,
        description: row.get("description")?,
        recurrence,
        target_value: row.get("target_value")?,
        created_at,
        is_deleted,
    })
}

fn recurrence_to_db(recurrence: &Recurrence) -> (&'static str, Option<String>) {
    match recurrence {
        Recurrence::Once => ("once", None),
        Recurrence::Daily => ("daily", None),
        Recurrence::Weekly(days) => {
            let csv = days
                .indices()
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            ("weekly", Some(csv))
        }
        Recurrence::Monthly => ("monthly", None),
    }
}

fn parse_recurrence(kind: &str, days_of_week: Option<&str>) -> RepoResult<Recurrence> {
    match kind {
        "once" => Ok(Recurrence::Once),
        "daily" => Ok(Recurrence::Daily),
        "weekly" => Ok(Recurrence::Weekly(parse_weekday_csv(
            days_of_week.unwrap_or(""),
        )?)),
        "monthly" => Ok(Recurrence::Monthly),
        other => Err(RepoError::InvalidData(format!(
            "invalid recurrence `{other}` in goals.recurrence"
        ))),
    }
}

fn parse_weekday_csv(csv: &str) -> RepoResult<WeekdaySet> {
    let mut indices = Vec::new();
    for token in csv.split(',').filter(|token| !token.trim().is_empty()) {
        let index: u8 = token.trim().parse().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid weekday token `{token}` in goals.days_of_week"
            ))
        })?;
        if index > 6 {
            return Err(RepoError::InvalidData(format!(
                "weekday index `{index}` out of range in goals.days_of_week"
            )));
        }
        indices.push(index);
    }
    Ok(WeekdaySet::from_indices(&indices))
}

#[cfg(test)]
mod tests {
    use super::{parse_recurrence, parse_weekday_csv, recurrence_to_db};
    use crate::model::goal::{Recurrence, WeekdaySet};

    #[test]
    fn weekly_days_roundtrip_through_csv() {
        let recurrence = Recurrence::Weekly(WeekdaySet::from_indices(&[5, 1, 3]));
        let (kind, csv) = recurrence_to_db(&recurrence);
        assert_eq!(kind, "weekly");
        assert_eq!(csv.as_deref(), Some("1,3,5"));

        let parsed = parse_recurrence(kind, csv.as_deref()).unwrap();
        assert_eq!(parsed, recurrence);
    }

    #[test]
    fn weekly_without_stored_days_degrades_to_empty_set() {
        let parsed = parse_recurrence("weekly", None).unwrap();
        assert_eq!(parsed, Recurrence::Weekly(WeekdaySet::EMPTY));
    }

    #[test]
    fn weekday_csv_rejects_junk_tokens() {
        assert!(parse_weekday_csv("1,segunda").is_err());
        assert!(parse_weekday_csv("9").is_err());
    }
}
