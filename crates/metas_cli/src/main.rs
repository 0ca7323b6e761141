//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `metas_core` linkage.
//! - Exercise the goal/progress path end to end against a throwaway store.

use chrono::Local;
use metas_core::db::open_db_in_memory;
use metas_core::{
    GoalBoard, GoalDraft, GoalService, Recurrence, Session, SqliteGoalRepository,
    SqliteProgressRepository,
};
use uuid::Uuid;

fn main() {
    println!("metas_core ping={}", metas_core::ping());
    println!("metas_core version={}", metas_core::core_version());

    if let Err(err) = smoke_run() {
        eprintln!("smoke run failed: {err}");
        std::process::exit(1);
    }
}

// Seeds one daily goal into an in-memory store and renders today's view,
// validating the full create -> project -> toggle path without touching
// any real data.
fn smoke_run() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let service = GoalService::new(
        Session::new(Uuid::new_v4()),
        SqliteGoalRepository::try_new(&conn)?,
        SqliteProgressRepository::try_new(&conn)?,
    );

    let goal = service.create_goal(&GoalDraft {
        name: "Beber água".to_string(),
        description: "2L por dia".to_string(),
        recurrence: Recurrence::Daily,
        target_value: None,
    })?;

    let today = Local::now().date_naive();
    let mut board = GoalBoard::new();
    board.reload(&service)?;
    board.toggle(&service, goal.uuid, today)?;

    for view in board.day_view(today) {
        let mark = if view.completed { "x" } else { " " };
        println!("[{mark}] {}: {}", view.name, view.description);
    }
    println!("days_in_month={}", board.month_markers(today).len());

    Ok(())
}
