use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use watchpost_common::types::SourceTable;
use watchpost_storage::{AlertConditionRow, Store};

use crate::compare::CompiledCondition;

/// Window applied when a condition leaves `time_window_min` unset.
pub const DEFAULT_WINDOW_MIN: i64 = 5;

const SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Triggered,
    NotTriggered,
    /// The stored tuple no longer resolves to a predicate (legacy rows);
    /// never an error, never a trigger.
    NotEvaluated,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub reason: String,
    pub match_count: usize,
    pub sample_matches: Vec<String>,
}

/// Scans a condition's source table within its time window and counts
/// matching rows.
pub struct Evaluator {
    store: Arc<Store>,
}

impl Evaluator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn evaluate(
        &self,
        condition: &AlertConditionRow,
        now: DateTime<Utc>,
        window_override_min: Option<i64>,
    ) -> Result<Evaluation> {
        let compiled = match CompiledCondition::compile(
            &condition.source_table,
            &condition.field_name,
            &condition.comparator,
            &condition.threshold_value,
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(condition_id = %condition.id, error = %e, "Condition no longer resolves, skipping");
                return Ok(Evaluation {
                    outcome: Outcome::NotEvaluated,
                    reason: e.to_string(),
                    match_count: 0,
                    sample_matches: Vec::new(),
                });
            }
        };

        let window_min = window_override_min
            .or(condition.time_window_min)
            .unwrap_or(DEFAULT_WINDOW_MIN);
        let since = now - Duration::minutes(window_min);

        let (scanned, matches) = self.scan(&compiled, since).await?;

        if scanned == 0 {
            return Ok(Evaluation {
                outcome: Outcome::NotTriggered,
                reason: format!("no rows in window ({window_min}m)"),
                match_count: 0,
                sample_matches: Vec::new(),
            });
        }

        let match_count = matches.len();
        let triggered = match condition.count_threshold {
            Some(t) => match_count as i64 >= t,
            None => match_count >= 1,
        };

        let mut reason = format!(
            "{match_count} of {scanned} rows matched {} in last {window_min}m",
            compiled.describe()
        );
        if let Some(t) = condition.count_threshold {
            reason.push_str(&format!(" (count threshold {t})"));
        }

        Ok(Evaluation {
            outcome: if triggered {
                Outcome::Triggered
            } else {
                Outcome::NotTriggered
            },
            reason,
            match_count,
            sample_matches: matches.into_iter().take(SAMPLE_LIMIT).collect(),
        })
    }

    /// Returns (rows scanned, descriptions of matching rows).
    async fn scan(
        &self,
        compiled: &CompiledCondition,
        since: DateTime<Utc>,
    ) -> Result<(usize, Vec<String>)> {
        let mut scanned = 0usize;
        let mut matches = Vec::new();

        match compiled.source {
            SourceTable::SystemMetrics => {
                for row in self.store.query_system_metrics_since(since).await? {
                    if row.sensor_name != compiled.field {
                        continue;
                    }
                    scanned += 1;
                    if compiled.matches_number(row.value) {
                        matches.push(format!("{}={} @ {}", row.sensor_name, row.value, row.timestamp));
                    }
                }
            }
            SourceTable::Logs => {
                for row in self.store.query_logs_since(since).await? {
                    if compiled.is_numeric() {
                        let value = match compiled.field.as_str() {
                            "cpu" => row.cpu,
                            "mem" => row.mem,
                            _ => None,
                        };
                        let Some(v) = value else {
                            continue;
                        };
                        scanned += 1;
                        if compiled.matches_number(v) {
                            matches.push(format!("{} {}={} @ {}", row.name, compiled.field, v, row.timestamp));
                        }
                    } else {
                        let value = match compiled.field.as_str() {
                            "command" => row.command.as_deref(),
                            "name" => Some(row.name.as_str()),
                            _ => None,
                        };
                        let Some(v) = value else {
                            continue;
                        };
                        scanned += 1;
                        if compiled.matches_text(v) {
                            matches.push(format!("{} @ {}", v, row.timestamp));
                        }
                    }
                }
            }
            SourceTable::Auth => {
                for row in self.store.query_auth_logs_since(since).await? {
                    let value = match compiled.field.as_str() {
                        "log_entry" => Some(row.log_entry.as_str()),
                        "username" => row.username.as_deref(),
                        _ => None,
                    };
                    let Some(v) = value else {
                        continue;
                    };
                    scanned += 1;
                    if compiled.matches_text(v) {
                        matches.push(format!("{} @ {}", v, row.timestamp));
                    }
                }
            }
        }

        Ok((scanned, matches))
    }
}
