use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use watchpost_storage::Store;

use crate::evaluator::{Evaluator, Outcome};
use crate::recorder::{EventRecorder, RecordOutcome};

/// How a batch run behaves. `check` and the cron hook use the defaults;
/// the debug endpoint flips `include_samples`, may widen the window and
/// may skip event creation.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub window_override_min: Option<i64>,
    pub create_events: bool,
    pub include_samples: bool,
    pub include_inactive: bool,
}

impl CheckOptions {
    /// Standard run: active conditions, real events, no samples.
    pub fn standard() -> Self {
        Self {
            create_events: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ConditionReport {
    pub condition_id: String,
    pub name: String,
    pub outcome: Option<Outcome>,
    pub reason: String,
    pub match_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_matches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub email_sent: bool,
    pub suppressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CheckReport {
    pub evaluated: usize,
    pub triggered: usize,
    pub suppressed: usize,
    pub errors: usize,
    pub results: Vec<ConditionReport>,
}

/// Drives one evaluation pass over the stored conditions.
///
/// Conditions are evaluated sequentially per request; a failure in one is
/// captured in its report entry and the batch continues. Overlapping runs
/// are allowed (idempotence comes from repeat-interval suppression).
pub struct AlertRunner {
    store: Arc<Store>,
    evaluator: Evaluator,
    recorder: EventRecorder,
}

impl AlertRunner {
    pub fn new(store: Arc<Store>, evaluator: Evaluator, recorder: EventRecorder) -> Self {
        Self {
            store,
            evaluator,
            recorder,
        }
    }

    pub async fn run(&self, opts: &CheckOptions) -> Result<CheckReport> {
        let active = if opts.include_inactive { None } else { Some(true) };
        let conditions = self.store.list_conditions(active).await?;
        let now = Utc::now();

        let mut results = Vec::with_capacity(conditions.len());
        let (mut triggered, mut suppressed, mut errors) = (0usize, 0usize, 0usize);

        for condition in &conditions {
            let mut report = ConditionReport {
                condition_id: condition.id.clone(),
                name: condition.name.clone(),
                outcome: None,
                reason: String::new(),
                match_count: 0,
                sample_matches: Vec::new(),
                event_id: None,
                email_sent: false,
                suppressed: false,
                error: None,
            };

            match self
                .evaluator
                .evaluate(condition, now, opts.window_override_min)
                .await
            {
                Ok(evaluation) => {
                    report.outcome = Some(evaluation.outcome);
                    report.reason = evaluation.reason.clone();
                    report.match_count = evaluation.match_count;
                    if opts.include_samples {
                        report.sample_matches = evaluation.sample_matches.clone();
                    }

                    if evaluation.outcome == Outcome::Triggered {
                        if opts.create_events {
                            match self.recorder.record(condition, &evaluation, now).await {
                                Ok(RecordOutcome::Recorded {
                                    event_id,
                                    email_sent,
                                }) => {
                                    triggered += 1;
                                    report.event_id = Some(event_id);
                                    report.email_sent = email_sent;
                                }
                                Ok(RecordOutcome::Suppressed) => {
                                    suppressed += 1;
                                    report.suppressed = true;
                                }
                                Err(e) => {
                                    errors += 1;
                                    report.error = Some(e.to_string());
                                    tracing::error!(
                                        condition_id = %condition.id,
                                        error = %e,
                                        "Failed to record alert event"
                                    );
                                }
                            }
                        } else {
                            triggered += 1;
                        }
                    }
                }
                Err(e) => {
                    errors += 1;
                    report.error = Some(e.to_string());
                    tracing::error!(
                        condition_id = %condition.id,
                        error = %e,
                        "Condition evaluation failed"
                    );
                }
            }

            results.push(report);
        }

        Ok(CheckReport {
            evaluated: results.len(),
            triggered,
            suppressed,
            errors,
            results,
        })
    }
}
