//! Persistence layer for alert conditions, alert events, devices and the
//! three evaluator source tables (logs, auth_logs, system_metrics).
//!
//! All access goes through [`store::Store`], a thin wrapper around a SeaORM
//! [`sea_orm::DatabaseConnection`]. Migrations run automatically on connect.

pub mod entities;
pub mod store;


pub use store::{
    ActivityLogRow, AlertConditionRow, AlertConditionUpdate, AlertEventFilter, AlertEventRow,
    AuthLogRow, DeviceRow, EmailTemplateRow, LogRow, ResolveOutcome, Store, SystemMetricRow,
};
