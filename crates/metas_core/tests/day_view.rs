use chrono::NaiveDate;
use metas_core::db::open_db_in_memory;
use metas_core::{
    GoalBoard, GoalDraft, GoalService, Recurrence, Session, SqliteGoalRepository,
    SqliteProgressRepository, WeekdaySet,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(name: &str, description: &str, recurrence: Recurrence) -> GoalDraft {
    GoalDraft {
        name: name.to_string(),
        description: description.to_string(),
        recurrence,
        target_value: None,
    }
}

#[test]
fn day_view_filters_to_goals_active_on_the_selected_day() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );

    service
        .create_goal(&draft("Beber água", "2L por dia", Recurrence::Daily))
        .unwrap();
    service
        .create_goal(&draft(
            "Ir à academia",
            "Três vezes por semana",
            // Monday/Wednesday/Friday.
            Recurrence::Weekly(WeekdaySet::from_indices(&[1, 3, 5])),
        ))
        .unwrap();

    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();

    // 2024-03-05 is a Tuesday: only the daily goal shows.
    let tuesday = board.day_view(date(2024, 3, 5));
    assert_eq!(tuesday.len(), 1);
    assert_eq!(tuesday[0].name, "Beber água");
    assert_eq!(tuesday[0].description, "2L por dia");
    assert!(!tuesday[0].completed);

    // 2024-03-06 is a Wednesday: both show, in creation order.
    let wednesday = board.day_view(date(2024, 3, 6));
    assert_eq!(wednesday.len(), 2);
    assert_eq!(wednesday[0].name, "Beber água");
    assert_eq!(wednesday[1].name, "Ir à academia");
}

#[test]
fn day_view_resolves_completion_and_target_value() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );

    let mut quantified = draft("Ler páginas", "30 páginas por dia", Recurrence::Daily);
    quantified.target_value = Some(30.0);
    let goal = service.create_goal(&quantified).unwrap();

    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();
    let day = date(2024, 3, 5);

    let before = board.day_view(day);
    assert!(!before[0].completed);
    assert_eq!(before[0].target_value, Some(30.0));
    assert_eq!(before[0].value, None);

    board.toggle(&service, goal.uuid, day).unwrap();

    let after = board.day_view(day);
    assert!(after[0].completed);
    assert!(!after[0].pending);

    // The neighbouring day is untouched.
    let next_day = board.day_view(date(2024, 3, 6));
    assert!(!next_day[0].completed);
}

#[test]
fn month_markers_count_active_goals_per_day() {
    let conn = open_db_in_memory().unwrap();
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteProgressRepository::try_new(&conn).unwrap(),
    );

    service
        .create_goal(&draft("Beber água", "2L por dia", Recurrence::Daily))
        .unwrap();
    service
        .create_goal(&draft(
            "Feira",
            "Todo sábado",
            Recurrence::Weekly(WeekdaySet::from_indices(&[6])),
        ))
        .unwrap();

    let mut board = GoalBoard::new();
    board.reload(&service).unwrap();

    let markers = board.month_markers(date(2024, 3, 15));
    assert_eq!(markers.len(), 31);
    // 2024-03-02 is a Saturday.
    assert_eq!(markers["2024-03-02"], 2);
    assert_eq!(markers["2024-03-05"], 1);
}
