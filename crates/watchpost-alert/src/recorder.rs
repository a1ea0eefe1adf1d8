use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use watchpost_notify::Notifier;
use watchpost_storage::{ActivityLogRow, AlertConditionRow, AlertEventRow, Store};

use crate::evaluator::Evaluation;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RecordOutcome {
    Recorded { event_id: String, email_sent: bool },
    /// Within the condition's repeat interval of the previous trigger.
    Suppressed,
}

/// Turns a triggered evaluation into a persisted AlertEvent.
///
/// The sequence is event insert, last-trigger stamp, activity row, email.
/// No transaction spans it and an email failure is logged, not propagated;
/// a recorded event with a lost mail beats a lost event.
pub struct EventRecorder {
    store: Arc<Store>,
    notifier: Arc<Notifier>,
}

impl EventRecorder {
    pub fn new(store: Arc<Store>, notifier: Arc<Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn record(
        &self,
        condition: &AlertConditionRow,
        evaluation: &Evaluation,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        if let (Some(interval), Some(last)) =
            (condition.repeat_interval_min, condition.last_triggered_at)
        {
            if now - last < Duration::minutes(interval) {
                tracing::debug!(
                    condition_id = %condition.id,
                    last_triggered_at = %last,
                    "Trigger suppressed, repeat interval not elapsed"
                );
                return Ok(RecordOutcome::Suppressed);
            }
        }

        let event = self
            .store
            .insert_event(&AlertEventRow {
                id: watchpost_common::id::next_id(),
                condition_id: condition.id.clone(),
                triggered_at: now,
                resolved: false,
                resolved_at: None,
                notes: Some(evaluation.reason.clone()),
            })
            .await?;

        self.store
            .set_condition_last_triggered(&condition.id, now)
            .await?;

        self.store
            .insert_activity(&ActivityLogRow {
                id: watchpost_common::id::next_id(),
                action_type: "alert_triggered".to_string(),
                target_type: "alert_condition".to_string(),
                target_id: Some(condition.id.clone()),
                details: Some(evaluation.reason.clone()),
                timestamp: now,
            })
            .await?;

        tracing::info!(
            condition_id = %condition.id,
            event_id = %event.id,
            reason = %evaluation.reason,
            "Alert triggered"
        );

        let email_sent = match self.notifier.notify_triggered(condition, &event).await {
            Ok(sent) => sent,
            Err(e) => {
                tracing::warn!(
                    condition_id = %condition.id,
                    event_id = %event.id,
                    error = %e,
                    "Alert email failed, event kept"
                );
                false
            }
        };

        Ok(RecordOutcome::Recorded {
            event_id: event.id,
            email_sent,
        })
    }
}
