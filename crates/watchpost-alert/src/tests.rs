use std::sync::Arc;

use chrono::{Duration, Utc};
use watchpost_notify::Notifier;
use watchpost_storage::{
    AlertConditionRow, AlertEventFilter, AuthLogRow, Store, SystemMetricRow,
};

use crate::compare::{CompileError, CompiledCondition};
use crate::evaluator::{Evaluator, Outcome};
use crate::recorder::{EventRecorder, RecordOutcome};
use crate::runner::{AlertRunner, CheckOptions};

async fn test_store() -> Arc<Store> {
    Arc::new(Store::connect("sqlite::memory:").await.expect("store"))
}

fn runner_for(store: Arc<Store>) -> AlertRunner {
    let notifier = Arc::new(Notifier::new(store.clone(), None));
    AlertRunner::new(
        store.clone(),
        Evaluator::new(store.clone()),
        EventRecorder::new(store, notifier),
    )
}

fn condition(id: &str, table: &str, field: &str, cmp: &str, threshold: &str) -> AlertConditionRow {
    AlertConditionRow {
        id: id.to_string(),
        name: format!("cond-{id}"),
        source_table: table.to_string(),
        field_name: field.to_string(),
        comparator: cmp.to_string(),
        threshold_value: threshold.to_string(),
        time_window_min: Some(5),
        repeat_interval_min: None,
        count_threshold: None,
        last_triggered_at: None,
        active: true,
        email_template_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn insert_metric(store: &Store, id: &str, sensor: &str, value: f64, mins_ago: i64) {
    store
        .insert_system_metric(&SystemMetricRow {
            id: id.to_string(),
            timestamp: Utc::now() - Duration::minutes(mins_ago),
            sensor_name: sensor.to_string(),
            value,
            host: None,
        })
        .await
        .unwrap();
}

#[test]
fn compile_accepts_valid_combinations() {
    assert!(CompiledCondition::compile("system_metrics", "cpu_temp", ">", "80").is_ok());
    assert!(CompiledCondition::compile("logs", "mem", "<=", "512").is_ok());
    assert!(CompiledCondition::compile("auth", "log_entry", "contains", "Failed password").is_ok());
    assert!(CompiledCondition::compile("logs", "name", "equals", "sshd").is_ok());
    assert!(CompiledCondition::compile("auth", "username", "not_contains", "svc-").is_ok());
}

#[test]
fn compile_rejects_invalid_combinations() {
    assert!(matches!(
        CompiledCondition::compile("metrics", "x", ">", "1"),
        Err(CompileError::UnknownSourceTable(_))
    ));
    assert!(matches!(
        CompiledCondition::compile("logs", "cpu", "=~", "1"),
        Err(CompileError::UnknownComparator(_))
    ));
    assert!(matches!(
        CompiledCondition::compile("logs", "pid", "contains", "1"),
        Err(CompileError::UnknownField { .. })
    ));
    // text comparator on a numeric field
    assert!(matches!(
        CompiledCondition::compile("system_metrics", "cpu_temp", "contains", "80"),
        Err(CompileError::ComparatorMismatch { .. })
    ));
    // equals is reserved for identifier fields
    assert!(matches!(
        CompiledCondition::compile("auth", "log_entry", "equals", "x"),
        Err(CompileError::ComparatorMismatch { .. })
    ));
    assert!(matches!(
        CompiledCondition::compile("system_metrics", "cpu_temp", ">", "hot"),
        Err(CompileError::NonNumericThreshold(_))
    ));
}

#[test]
fn text_matching_is_case_insensitive() {
    let c = CompiledCondition::compile("auth", "log_entry", "contains", "FAILED Password").unwrap();
    assert!(c.matches_text("failed password for root from 10.0.0.9"));
    assert!(!c.matches_text("Accepted publickey for ops"));

    let eq = CompiledCondition::compile("logs", "name", "equals", "SSHD").unwrap();
    assert!(eq.matches_text("sshd"));
    assert!(!eq.matches_text("sshd-session"));
}

#[tokio::test]
async fn numeric_condition_triggers_within_window_only() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());

    insert_metric(&store, "m1", "cpu_temp", 91.0, 1).await;
    insert_metric(&store, "m2", "cpu_temp", 40.0, 2).await;
    // outside the 5 minute window, ignored
    insert_metric(&store, "m3", "cpu_temp", 99.0, 30).await;
    // different sensor, never scanned
    insert_metric(&store, "m4", "fan_rpm", 200.0, 1).await;

    let cond = condition("c1", "system_metrics", "cpu_temp", ">", "80");
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::Triggered);
    assert_eq!(eval.match_count, 1);
    assert_eq!(eval.sample_matches.len(), 1);
    assert!(eval.sample_matches[0].contains("cpu_temp=91"));
}

#[tokio::test]
async fn command_contains_matches_substrings() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());
    store
        .insert_log(&watchpost_storage::LogRow {
            id: "l1".to_string(),
            name: "bash".to_string(),
            host: None,
            timestamp: Utc::now(),
            pid: Some(100),
            action: None,
            cpu: None,
            mem: None,
            command: Some("sudo RM -rf /tmp".to_string()),
            port: None,
            ip_address: None,
        })
        .await
        .unwrap();

    let cond = condition("c1", "logs", "command", "contains", "rm -rf");
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::Triggered);
    assert_eq!(eval.match_count, 1);
}

#[tokio::test]
async fn empty_window_never_triggers() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());
    let cond = condition("c1", "system_metrics", "cpu_temp", ">", "80");
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::NotTriggered);
    assert!(eval.reason.contains("no rows in window"));
}

#[tokio::test]
async fn count_threshold_requires_enough_matches() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());

    for (i, mins) in [1, 2, 3].iter().enumerate() {
        store
            .insert_auth_log(&AuthLogRow {
                id: format!("a{i}"),
                timestamp: Utc::now() - Duration::minutes(*mins),
                username: Some("root".to_string()),
                log_entry: "Failed password for root".to_string(),
            })
            .await
            .unwrap();
    }

    let mut cond = condition("c1", "auth", "log_entry", "contains", "failed password");
    cond.count_threshold = Some(4);
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::NotTriggered);
    assert_eq!(eval.match_count, 3);

    cond.count_threshold = Some(3);
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::Triggered);
}

#[tokio::test]
async fn window_override_widens_the_scan() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());
    insert_metric(&store, "m1", "cpu_temp", 95.0, 120).await;

    let cond = condition("c1", "system_metrics", "cpu_temp", ">", "80");
    let normal = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(normal.outcome, Outcome::NotTriggered);

    let extended = evaluator
        .evaluate(&cond, Utc::now(), Some(24 * 60))
        .await
        .unwrap();
    assert_eq!(extended.outcome, Outcome::Triggered);
}

#[tokio::test]
async fn legacy_rows_yield_not_evaluated() {
    let store = test_store().await;
    let evaluator = Evaluator::new(store.clone());
    // stored before the comparator was retired; must not error or trigger
    let cond = condition("c1", "logs", "pid", "contains", "22");
    let eval = evaluator.evaluate(&cond, Utc::now(), None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::NotEvaluated);
    assert!(!eval.reason.is_empty());
}

#[tokio::test]
async fn repeat_interval_suppresses_back_to_back_triggers() {
    let store = test_store().await;
    let notifier = Arc::new(Notifier::new(store.clone(), None));
    let recorder = EventRecorder::new(store.clone(), notifier);
    let evaluator = Evaluator::new(store.clone());

    insert_metric(&store, "m1", "cpu_temp", 95.0, 1).await;
    let mut cond = condition("c1", "system_metrics", "cpu_temp", ">", "80");
    cond.repeat_interval_min = Some(30);
    store.insert_condition(&cond).await.unwrap();

    let now = Utc::now();
    let eval = evaluator.evaluate(&cond, now, None).await.unwrap();
    assert_eq!(eval.outcome, Outcome::Triggered);

    let first = recorder.record(&cond, &eval, now).await.unwrap();
    assert!(matches!(first, RecordOutcome::Recorded { .. }));

    // the stamp lives in the database, reload before the second pass
    let cond = store.get_condition_by_id("c1").await.unwrap().unwrap();
    let second = recorder
        .record(&cond, &eval, now + Duration::minutes(5))
        .await
        .unwrap();
    assert!(matches!(second, RecordOutcome::Suppressed));

    let third = recorder
        .record(&cond, &eval, now + Duration::minutes(31))
        .await
        .unwrap();
    assert!(matches!(third, RecordOutcome::Recorded { .. }));

    assert_eq!(
        store
            .count_events(&AlertEventFilter::default())
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn recording_writes_event_stamp_and_activity() {
    let store = test_store().await;
    let notifier = Arc::new(Notifier::new(store.clone(), None));
    let recorder = EventRecorder::new(store.clone(), notifier);
    let evaluator = Evaluator::new(store.clone());

    insert_metric(&store, "m1", "cpu_temp", 95.0, 1).await;
    let cond = condition("c1", "system_metrics", "cpu_temp", ">", "80");
    store.insert_condition(&cond).await.unwrap();

    let now = Utc::now();
    let eval = evaluator.evaluate(&cond, now, None).await.unwrap();
    let outcome = recorder.record(&cond, &eval, now).await.unwrap();
    let RecordOutcome::Recorded {
        event_id,
        email_sent,
    } = outcome
    else {
        panic!("expected a recorded event");
    };
    assert!(!email_sent);

    let event = store.get_event_by_id(&event_id).await.unwrap().unwrap();
    assert_eq!(event.condition_id, "c1");
    assert!(!event.resolved);
    assert!(event.notes.unwrap().contains("cpu_temp > 80"));

    let reloaded = store.get_condition_by_id("c1").await.unwrap().unwrap();
    assert!(reloaded.last_triggered_at.is_some());

    let activity = store.list_activity(10, 0).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].action_type, "alert_triggered");
    assert_eq!(activity[0].target_id.as_deref(), Some("c1"));
}

#[tokio::test]
async fn runner_reports_per_condition_and_skips_inactive() {
    let store = test_store().await;
    let runner = runner_for(store.clone());

    insert_metric(&store, "m1", "cpu_temp", 95.0, 1).await;
    store
        .insert_condition(&condition("hot", "system_metrics", "cpu_temp", ">", "80"))
        .await
        .unwrap();
    store
        .insert_condition(&condition("cool", "system_metrics", "cpu_temp", "<", "10"))
        .await
        .unwrap();
    store
        .insert_condition(&condition("off", "system_metrics", "cpu_temp", ">", "0"))
        .await
        .unwrap();
    store.set_condition_active("off", false).await.unwrap();

    let report = runner.run(&CheckOptions::standard()).await.unwrap();
    assert_eq!(report.evaluated, 2);
    assert_eq!(report.triggered, 1);
    assert_eq!(report.errors, 0);

    let hot = report
        .results
        .iter()
        .find(|r| r.condition_id == "hot")
        .unwrap();
    assert_eq!(hot.outcome, Some(Outcome::Triggered));
    assert!(hot.event_id.is_some());
    // standard runs omit samples
    assert!(hot.sample_matches.is_empty());

    assert_eq!(
        store
            .count_events(&AlertEventFilter::default())
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn debug_run_creates_no_events_and_keeps_samples() {
    let store = test_store().await;
    let runner = runner_for(store.clone());

    insert_metric(&store, "m1", "cpu_temp", 95.0, 1).await;
    store
        .insert_condition(&condition("hot", "system_metrics", "cpu_temp", ">", "80"))
        .await
        .unwrap();

    let opts = CheckOptions {
        create_events: false,
        include_samples: true,
        include_inactive: true,
        ..Default::default()
    };
    let report = runner.run(&opts).await.unwrap();
    assert_eq!(report.triggered, 1);
    assert!(!report.results[0].sample_matches.is_empty());
    assert!(report.results[0].event_id.is_none());

    assert_eq!(
        store
            .count_events(&AlertEventFilter::default())
            .await
            .unwrap(),
        0
    );
}
