use super::TemplateActionLogRepository;
use crate::domain::action_log::{TemplateActionLog, TemplateActionType};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_test_log(template_id: &str, action: TemplateActionType, actor: &str) -> TemplateActionLog {
    TemplateActionLog::now(
        template_id,
        action,
        actor,
        Some(serde_json::json!({ "template_id": template_id })),
        Some("Test log".to_string()),
    )
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = TemplateActionLogRepository::new(setup_test_db());

    let log = make_test_log("T1", TemplateActionType::Approve, "user1");
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.template_id, "T1");
    assert_eq!(found.action_type, "APPROVE");
    assert_eq!(found.actor, "user1");
    assert_eq!(
        found.payload_json,
        Some(serde_json::json!({ "template_id": "T1" }))
    );

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_find_by_template_newest_first() {
    let repo = TemplateActionLogRepository::new(setup_test_db());

    repo.insert(&make_test_log("T1", TemplateActionType::Create, "user1"))
        .unwrap();
    repo.insert(&make_test_log("T1", TemplateActionType::SubmitForApproval, "user1"))
        .unwrap();
    repo.insert(&make_test_log("T2", TemplateActionType::Create, "user2"))
        .unwrap();

    let logs = repo.find_by_template_id("T1").unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action_type, "SUBMIT_FOR_APPROVAL");
    assert_eq!(repo.count_by_template("T2").unwrap(), 1);
}

#[test]
fn test_find_by_actor_respects_limit() {
    let repo = TemplateActionLogRepository::new(setup_test_db());

    for _ in 0..5 {
        repo.insert(&make_test_log("T1", TemplateActionType::Copy, "user1"))
            .unwrap();
    }
    repo.insert(&make_test_log("T1", TemplateActionType::Copy, "user2"))
        .unwrap();

    assert_eq!(repo.find_by_actor("user1", 3).unwrap().len(), 3);
    assert_eq!(repo.find_by_actor("user2", 10).unwrap().len(), 1);
}
