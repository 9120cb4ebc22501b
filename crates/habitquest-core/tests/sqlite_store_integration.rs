//! Integration tests for the SQLite document store.

use std::sync::Arc;

use chrono::NaiveDate;
use habitquest_core::{
    CompletionKey, Config, DocumentStore, ManualClock, Session, SnapshotPatch, SqliteStore, Stage,
    User,
};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
    ))
}

fn onboard(session: &Session) {
    for (i, goal) in ["Run", "Read", "Code", "Cook", "Save"].iter().enumerate() {
        session.set_goal_text(i, goal).unwrap();
    }
    session.submit_goals().unwrap();
    session.toggle_goal_selection("Read").unwrap();
    session.toggle_goal_selection("Save").unwrap();
    session.submit_selection().unwrap();
    for g in 0..2 {
        for h in 0..3 {
            session.set_habit_text(g, h, &format!("step {h}")).unwrap();
        }
    }
    session.submit_habits().unwrap();
}

#[tokio::test(start_paused = true)]
async fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitquest.db");
    let user = User::verified("u1", "player@example.com");

    {
        let store = Arc::new(SqliteStore::open_at(&path).unwrap());
        let mut session = Session::start(user.clone(), store, &Config::default(), clock())
            .await
            .unwrap();
        onboard(&session);
        session.toggle_completion(CompletionKey::new(1, 2)).unwrap();
        session.flush().await.unwrap();
        session.teardown();
    }

    let store = Arc::new(SqliteStore::open_at(&path).unwrap());
    let session = Session::start(user, store, &Config::default(), clock())
        .await
        .unwrap();
    assert_eq!(session.stage(), Stage::Dashboard);
    let view = session.view();
    assert_eq!(view.selected_goals, ["Read", "Save"]);
    assert_eq!(view.total_completed, 1);
    assert_eq!(view.today_completion_set, ["1-2"]);
    assert!(view.unlocked_achievements.contains(&"firstGoal".to_string()));
    assert!(view.unlocked_achievements.contains(&"streak1".to_string()));
}

#[tokio::test]
async fn merge_keeps_fields_missing_from_the_patch() {
    let store = SqliteStore::open_memory().unwrap();
    let first = SnapshotPatch {
        goals: Some(vec!["Run".into()]),
        completion_history: Some([("2024-06-01".to_string(), 2)].into()),
        ..Default::default()
    };
    store.put_document("u1", &first, true).await.unwrap();

    let second = SnapshotPatch {
        completion_history: Some([("2024-06-02".to_string(), 1)].into()),
        total_habits_completed_ever: Some(3),
        ..Default::default()
    };
    store.put_document("u1", &second, true).await.unwrap();

    let doc = store.get_document("u1").await.unwrap().unwrap();
    assert_eq!(doc.goals, ["Run"]);
    assert_eq!(doc.completion_history.len(), 2);
    assert_eq!(doc.total_habits_completed_ever, 3);

    store.put_document("u1", &second, false).await.unwrap();
    let doc = store.get_document("u1").await.unwrap().unwrap();
    assert!(doc.goals.is_empty());
    assert_eq!(doc.completion_history.len(), 1);
}
