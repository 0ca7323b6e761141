//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the UI shell via FRB.
//! - Hold the per-process store path and signed-in owner.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Response envelopes carry an empty `error` string on success.
//! - Every mutation requires a signed-in owner; calls without one fail
//!   with an auth error instead of touching storage.

use chrono::NaiveDate;
use metas_core::db::open_db;
use metas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, iso_date,
    ping as ping_inner, GoalBoard, GoalDraft, GoalService, Recurrence, Session,
    SqliteGoalRepository, SqliteProgressRepository, WeekdaySet,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const ERR_STORE_NOT_OPEN: &str = "store_not_open: call open_store first";
const ERR_AUTH_REQUIRED: &str = "auth_required: no signed-in owner";

static STORE_PATH: OnceLock<PathBuf> = OnceLock::new();
static SIGNED_IN_OWNER: Mutex<Option<Uuid>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; reconfiguration attempts
///   return an error message.
/// - Never panics; returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the SQLite store path for this process.
///
/// # FFI contract
/// - First call wins; a repeated call with the same path is a no-op and a
///   different path returns an error.
/// - Never panics; returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn open_store(db_path: String) -> String {
    let requested = PathBuf::from(db_path);
    let active = STORE_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "store already opened at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// Records the authenticated owner for subsequent calls.
///
/// Authentication happens in the host app; this only installs the verified
/// owner id as the session context.
#[flutter_rust_bridge::frb(sync)]
pub fn sign_in(owner_uuid: String) -> String {
    let owner = match Uuid::parse_str(&owner_uuid) {
        Ok(owner) => owner,
        Err(_) => return format!("invalid owner uuid `{owner_uuid}`"),
    };
    if let Ok(mut guard) = SIGNED_IN_OWNER.lock() {
        *guard = Some(owner);
        log::info!("event=sign_in module=ffi status=ok");
        String::new()
    } else {
        "session state poisoned".to_string()
    }
}

/// Clears the signed-in owner; later mutations fail with an auth error.
#[flutter_rust_bridge::frb(sync)]
pub fn sign_out() -> String {
    if let Ok(mut guard) = SIGNED_IN_OWNER.lock() {
        *guard = None;
        log::info!("event=sign_out module=ffi status=ok");
        String::new()
    } else {
        "session state poisoned".to_string()
    }
}

/// One goal row for list display.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalItem {
    pub goal_id: String,
    pub name: String,
    pub description: String,
    /// `once|daily|weekly|monthly`.
    pub recurrence: String,
    /// Weekday indices 0=Sunday..6=Saturday; empty unless weekly.
    pub days_of_week: Vec<u8>,
    pub target_value: Option<f64>,
    /// ISO `YYYY-MM-DD` anchor day.
    pub created_on: String,
}

/// Response envelope for goal list calls.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalListResponse {
    pub items: Vec<GoalItem>,
    pub error: String,
}

/// Response envelope for goal creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGoalResponse {
    pub goal_id: String,
    pub error: String,
}

/// Active-goal count for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayMarker {
    pub date: String,
    pub active_goals: u32,
}

/// Response envelope for calendar marker queries.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthMarkersResponse {
    pub days: Vec<DayMarker>,
    pub error: String,
}

/// Display state of one goal on the selected day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGoalItem {
    pub goal_id: String,
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub value: Option<f64>,
    pub target_value: Option<f64>,
}

/// Response envelope for day-detail queries.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGoalsResponse {
    pub items: Vec<DayGoalItem>,
    pub error: String,
}

/// Response envelope for toggle calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleResponse {
    pub completed: bool,
    pub error: String,
}

/// Creates a goal for the signed-in owner.
#[flutter_rust_bridge::frb(sync)]
pub fn create_goal(
    name: String,
    description: String,
    recurrence: String,
    days_of_week: Vec<u8>,
    target_value: Option<f64>,
) -> CreateGoalResponse {
    let result = parse_recurrence(&recurrence, &days_of_week).and_then(|recurrence| {
        with_service(|service| {
            let draft = GoalDraft {
                name,
                description,
                recurrence,
                target_value,
            };
            service
                .create_goal(&draft)
                .map(|goal| goal.uuid.to_string())
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(goal_id) => CreateGoalResponse {
            goal_id,
            error: String::new(),
        },
        Err(error) => CreateGoalResponse {
            goal_id: String::new(),
            error,
        },
    }
}

/// Lists the signed-in owner's goals in creation order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_goals() -> GoalListResponse {
    let result = with_service(|service| {
        service.list_goals().map_err(|err| err.to_string()).map(|goals| {
            goals
                .iter()
                .map(|goal| {
                    let (recurrence, days_of_week) = describe_recurrence(&goal.recurrence);
                    GoalItem {
                        goal_id: goal.uuid.to_string(),
                        name: goal.name.clone(),
                        description: goal.description.clone(),
                        recurrence,
                        days_of_week,
                        target_value: goal.target_value,
                        created_on: iso_date(goal.anchor_date()),
                    }
                })
                .collect()
        })
    });

    match result {
        Ok(items) => GoalListResponse {
            items,
            error: String::new(),
        },
        Err(error) => GoalListResponse {
            items: Vec::new(),
            error,
        },
    }
}

/// Soft-deletes one of the signed-in owner's goals.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_goal(goal_id: String) -> String {
    let result = parse_goal_id(&goal_id).and_then(|goal| {
        with_service(|service| service.delete_goal(goal).map_err(|err| err.to_string()))
    });
    match result {
        Ok(()) => String::new(),
        Err(error) => error,
    }
}

/// Per-day active-goal counts for the month containing `year`/`month`.
#[flutter_rust_bridge::frb(sync)]
pub fn month_markers(year: i32, month: u32) -> MonthMarkersResponse {
    let reference = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(reference) => reference,
        None => {
            return MonthMarkersResponse {
                days: Vec::new(),
                error: format!("invalid month `{year}-{month}`"),
            }
        }
    };

    let result = with_board(|board| {
        Ok(board
            .month_markers(reference)
            .into_iter()
            .map(|(date, count)| DayMarker {
                date,
                active_goals: count as u32,
            })
            .collect())
    });

    match result {
        Ok(days) => MonthMarkersResponse {
            days,
            error: String::new(),
        },
        Err(error) => MonthMarkersResponse {
            days: Vec::new(),
            error,
        },
    }
}

/// Goals active on the selected day, joined with progress state.
#[flutter_rust_bridge::frb(sync)]
pub fn day_goals(date: String) -> DayGoalsResponse {
    let result = parse_iso_date(&date).and_then(|day| {
        with_board(|board| {
            Ok(board
                .day_view(day)
                .into_iter()
                .map(|view| DayGoalItem {
                    goal_id: view.goal.to_string(),
                    name: view.name,
                    description: view.description,
                    completed: view.completed,
                    value: view.value,
                    target_value: view.target_value,
                })
                .collect())
        })
    });

    match result {
        Ok(items) => DayGoalsResponse {
            items,
            error: String::new(),
        },
        Err(error) => DayGoalsResponse {
            items: Vec::new(),
            error,
        },
    }
}

/// Toggles completion of one goal on one day and persists the change.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_progress(goal_id: String, date: String) -> ToggleResponse {
    let result = parse_goal_id(&goal_id).and_then(|goal| {
        let day = parse_iso_date(&date)?;
        with_service(|service| {
            service
                .toggle(goal, day)
                .map(|record| record.completed)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(completed) => ToggleResponse {
            completed,
            error: String::new(),
        },
        Err(error) => ToggleResponse {
            completed: false,
            error,
        },
    }
}

fn with_service<T>(
    f: impl FnOnce(
        &GoalService<SqliteGoalRepository<'_>, SqliteProgressRepository<'_>>,
    ) -> Result<T, String>,
) -> Result<T, String> {
    let path = STORE_PATH.get().ok_or_else(|| ERR_STORE_NOT_OPEN.to_string())?;
    let owner = SIGNED_IN_OWNER
        .lock()
        .map_err(|_| "session state poisoned".to_string())?
        .ok_or_else(|| ERR_AUTH_REQUIRED.to_string())?;

    let conn = open_db(path).map_err(|err| err.to_string())?;
    let goal_repo = SqliteGoalRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let progress_repo = SqliteProgressRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = GoalService::new(Session::new(owner), goal_repo, progress_repo);
    f(&service)
}

fn with_board<T>(f: impl FnOnce(&GoalBoard) -> Result<T, String>) -> Result<T, String> {
    with_service(|service| {
        let mut board = GoalBoard::new();
        board.reload(service).map_err(|err| err.to_string())?;
        f(&board)
    })
}

fn parse_goal_id(goal_id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(goal_id).map_err(|_| format!("invalid goal uuid `{goal_id}`"))
}

fn parse_iso_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{date}`; expected YYYY-MM-DD"))
}

fn parse_recurrence(kind: &str, days_of_week: &[u8]) -> Result<Recurrence, String> {
    match kind {
        "once" => Ok(Recurrence::Once),
        "daily" => Ok(Recurrence::Daily),
        "weekly" => {
            if days_of_week.iter().any(|index| *index > 6) {
                return Err("weekday index out of range 0..=6".to_string());
            }
            Ok(Recurrence::Weekly(WeekdaySet::from_indices(days_of_week)))
        }
        "monthly" => Ok(Recurrence::Monthly),
        other => Err(format!(
            "invalid recurrence `{other}`; expected once|daily|weekly|monthly"
        )),
    }
}

fn describe_recurrence(recurrence: &Recurrence) -> (String, Vec<u8>) {
    match recurrence {
        Recurrence::Once => ("once".to_string(), Vec::new()),
        Recurrence::Daily => ("daily".to_string(), Vec::new()),
        Recurrence::Weekly(days) => ("weekly".to_string(), days.indices()),
        Recurrence::Monthly => ("monthly".to_string(), Vec::new()),
    }
}
