use chrono::NaiveDate;
use metas_core::db::{open_db, open_db_in_memory};
use metas_core::repo::{RepoError, RepoResult};
use metas_core::{
    Goal, GoalBoard, GoalDraft, GoalId, GoalRepository, GoalService, OwnerId, ProgressRecord,
    ProgressRepository, Recurrence, ServiceError, Session, SqliteGoalRepository,
    SqliteProgressRepository,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily_draft(name: &str) -> GoalDraft {
    GoalDraft {
        name: name.to_string(),
        description: "todos os dias".to_string(),
        recurrence: Recurrence::Daily,
        target_value: None,
    }
}

#[test]
fn toggle_cycles_between_completed_states() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );
    let goal = service.create_goal(&daily_draft("Meditar")).unwrap();
    let day = date(2024, 3, 5);

    assert!(service.get_progress(goal.uuid, day).unwrap().is_none());

    let first = service.toggle(goal.uuid, day).unwrap();
    assert!(first.completed);

    let second = service.toggle(goal.uuid, day).unwrap();
    assert!(!second.completed);

    let third = service.toggle(goal.uuid, day).unwrap();
    assert!(third.completed);

    // The explicit false record is persisted, unlike a never-touched day.
    let fourth = service.toggle(goal.uuid, day).unwrap();
    assert!(!fourth.completed);
    let stored = service.get_progress(goal.uuid, day).unwrap().unwrap();
    assert!(!stored.completed);
}

#[test]
fn toggle_keeps_recorded_value_untouched() {
    let conn = open_db_in_memory().unwrap();
    let goal_repo = SqliteGoalRepository::try_new(&conn).unwrap();
    let progress_repo = SqliteProgressRepository::try_new(&conn).unwrap();
    let service = GoalService::new(Session::new(Uuid::new_v4()), goal_repo, progress_repo);

    let goal = service.create_goal(&daily_draft("Beber água")).unwrap();
    let day = date(2024, 3, 5);

    // Seed a record carrying a partial numeric value.
    SqliteProgressRepository::try_new(&conn)
        .unwrap()
        .upsert_progress(goal.uuid, day, false, Some(1.5))
        .unwrap();

    let flipped = service.toggle(goal.uuid, day).unwrap();
    assert!(flipped.completed);
    assert_eq!(flipped.value, Some(1.5));

    let flipped_back = service.toggle(goal.uuid, day).unwrap();
    assert!(!flipped_back.completed);
    assert_eq!(flipped_back.value, Some(1.5));
}

#[test]
fn toggling_someone_elses_goal_reads_as_not_found() {
    let conn = open_db_in_memory().unwrap();
    let owner_service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );
    let goal = owner_service.create_goal(&daily_draft("Privada")).unwrap();

    let intruder_service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );
    let err = intruder_service
        .toggle(goal.uuid, date(2024, 3, 5))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::NotFound(id)) if id == goal.uuid
    ));
}

#[test]
fn persisted_toggle_survives_full_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metas.db");
    let owner = Uuid::new_v4();
    let day = date(2024, 3, 5);

    // First session: create the goal and toggle one day.
    let goal_id = {
        let conn = open_db(&path).unwrap();
        let service = GoalService::new(
            Session::new(owner),
            SqliteGoalRepository::try_new(&conn).unwrap(),
            SqliteProgressRepository::try_new(&conn).unwrap(),
        );
        let goal = service.create_goal(&daily_draft("Beber água")).unwrap();

        let mut board = GoalBoard::new();
        board.reload(&service).unwrap();

        let before = board.day_view(day);
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "Beber água");
        assert!(!before[0].completed);

        let record = board.toggle(&service, goal.uuid, day).unwrap();
        assert_eq!(record.date, day);
        assert!(record.completed);
        goal.uuid
    };

    // Second session: reload collections from disk and recompute.
    let conn = open_db(&path).unwrap();
    let service = GoalService::new(
        Session::new(owner),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );
    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();

    let view = board.day_view(day);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].goal, goal_id);
    assert!(view[0].completed);
    assert!(!view[0].pending);
}

#[test]
fn pending_pair_blocks_second_toggle_until_completed() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );
    let goal = service.create_goal(&daily_draft("Beber água")).unwrap();
    let day = date(2024, 3, 5);

    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();

    board.begin_toggle(goal.uuid, day).unwrap();
    assert!(board.is_pending(goal.uuid, day));
    let view = board.day_view(day);
    assert!(view[0].pending);

    // The pair stays gated while the first mutation is outstanding.
    let err = board.begin_toggle(goal.uuid, day).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ToggleInFlight { goal: id, date: d } if id == goal.uuid && d == day
    ));

    let outcome = service.toggle(goal.uuid, day);
    let record = board.complete_toggle(goal.uuid, day, outcome).unwrap();
    assert!(record.completed);
    assert!(!board.is_pending(goal.uuid, day));

    let settled = board.day_view(day);
    assert!(settled[0].completed);
    assert!(!settled[0].pending);
}

// Minimal in-memory doubles for exercising failure paths without SQLite.
struct StaticGoals(Vec<Goal>);

impl GoalRepository for StaticGoals {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        Ok(goal.uuid)
    }

    fn get_goal(&self, id: GoalId, include_deleted: bool) -> RepoResult<Option<Goal>> {
        Ok(self
            .0
            .iter()
            .find(|goal| goal.uuid == id && (include_deleted || !goal.is_deleted))
            .cloned())
    }

    fn list_goals(&self, owner: OwnerId) -> RepoResult<Vec<Goal>> {
        Ok(self
            .0
            .iter()
            .filter(|goal| goal.owner == owner && !goal.is_deleted)
            .cloned()
            .collect())
    }

    fn delete_goal(&self, _id: GoalId) -> RepoResult<()> {
        Ok(())
    }
}

struct FailingProgress;

impl ProgressRepository for FailingProgress {
    fn get_progress(&self, _goal: GoalId, _date: NaiveDate) -> RepoResult<Option<ProgressRecord>> {
        Ok(None)
    }

    fn list_progress(&self, _owner: OwnerId) -> RepoResult<Vec<ProgressRecord>> {
        Ok(Vec::new())
    }

    fn upsert_progress(
        &self,
        _goal: GoalId,
        _date: NaiveDate,
        _completed: bool,
        _value: Option<f64>,
    ) -> RepoResult<ProgressRecord> {
        Err(RepoError::InvalidData("remote write refused".to_string()))
    }
}

#[test]
fn failed_persistence_leaves_board_state_untouched() {
    let owner = Uuid::new_v4();
    let goal = Goal::with_id(
        Uuid::new_v4(),
        owner,
        "Meta remota",
        "gravação falha",
        Recurrence::Daily,
        date(2024, 3, 1).and_hms_opt(8, 0, 0).unwrap(),
    );
    let service = GoalService::new(
        Session::new(owner),
        StaticGoals(vec![goal.clone()]),
        FailingProgress,
    );

    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();
    let day = date(2024, 3, 5);

    let err = board.toggle(&service, goal.uuid, day).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::InvalidData(_))));

    // No optimistic state: the day still renders unchecked and nothing is
    // left pending, so the user can retry.
    let view = board.day_view(day);
    assert_eq!(view.len(), 1);
    assert!(!view[0].completed);
    assert!(!view[0].pending);
    assert!(!board.is_pending(goal.uuid, day));
}
