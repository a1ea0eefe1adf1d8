//! Alert condition evaluation.
//!
//! A condition names a source table, a field, a comparator and a threshold.
//! The [`compare`] module resolves that tuple into a typed predicate when the
//! condition is created, so malformed combinations are rejected up front
//! instead of failing (or silently passing) at evaluation time. The
//! [`evaluator::Evaluator`] scans the condition's time window, the
//! [`recorder::EventRecorder`] turns a triggered evaluation into an
//! AlertEvent plus email, and [`runner::AlertRunner`] drives a whole batch
//! for the check/debug/cron endpoints.

pub mod compare;
pub mod evaluator;
pub mod recorder;
pub mod runner;

#[cfg(test)]
mod tests;

pub use compare::{CompileError, CompiledCondition};
pub use evaluator::{Evaluation, Evaluator, Outcome, DEFAULT_WINDOW_MIN};
pub use recorder::{EventRecorder, RecordOutcome};
pub use runner::{AlertRunner, CheckOptions, CheckReport, ConditionReport};
