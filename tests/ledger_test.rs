use surveyor::ledger::Ledger;
use surveyor::ledger::sqlite::SqliteLedger;
use surveyor::research::{CreateTaskRequest, TaskStatus};

fn request(instructions: &str) -> CreateTaskRequest {
    CreateTaskRequest::new(instructions, "exa-research")
}

#[tokio::test]
async fn record_and_read_back() {
    let ledger = SqliteLedger::in_memory().unwrap();

    ledger
        .record("task_01", &request("find the needle"))
        .await
        .unwrap();

    let history = ledger.history(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "task_01");
    assert_eq!(history[0].instructions, "find the needle");
    assert_eq!(history[0].model, "exa-research");
    assert_eq!(history[0].status, "pending");
    assert!(!history[0].created_at.is_empty());
}

#[tokio::test]
async fn history_preserves_insertion_order() {
    let ledger = SqliteLedger::in_memory().unwrap();

    ledger.record("task_01", &request("first")).await.unwrap();
    ledger.record("task_02", &request("second")).await.unwrap();

    let history = ledger.history(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, "task_01");
    assert_eq!(history[1].id, "task_02");
}

#[tokio::test]
async fn history_limit_keeps_the_most_recent() {
    let ledger = SqliteLedger::in_memory().unwrap();

    for i in 1..=3 {
        ledger
            .record(&format!("task_{i:02}"), &request("task"))
            .await
            .unwrap();
    }

    let history = ledger.history(2).await.unwrap();
    assert_eq!(history.len(), 2);
    // Last two, still in chronological order.
    assert_eq!(history[0].id, "task_02");
    assert_eq!(history[1].id, "task_03");
}

#[tokio::test]
async fn update_status_changes_the_record() {
    let ledger = SqliteLedger::in_memory().unwrap();

    ledger.record("task_01", &request("poll me")).await.unwrap();
    ledger
        .update_status("task_01", TaskStatus::Completed)
        .await
        .unwrap();

    let history = ledger.history(10).await.unwrap();
    assert_eq!(history[0].status, "completed");
}

#[tokio::test]
async fn update_status_for_unknown_id_is_ok() {
    let ledger = SqliteLedger::in_memory().unwrap();
    ledger
        .update_status("task_99", TaskStatus::Failed)
        .await
        .unwrap();
    assert!(ledger.history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_empties_the_ledger() {
    let ledger = SqliteLedger::in_memory().unwrap();

    ledger.record("task_01", &request("gone soon")).await.unwrap();
    ledger.clear().await.unwrap();

    assert!(ledger.history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn records_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surveyor.db").to_string_lossy().into_owned();

    {
        let ledger = SqliteLedger::open(&path).unwrap();
        ledger.record("task_01", &request("durable")).await.unwrap();
    }

    {
        let ledger = SqliteLedger::open(&path).unwrap();
        let history = ledger.history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].instructions, "durable");
    }
}
