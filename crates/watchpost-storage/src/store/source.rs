//! Ingested source rows the evaluator scans: process logs, auth log lines
//! and sensor metrics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::entities::{auth_log, log_entry, system_metric};
use crate::store::Store;

/// One row from the `logs` table (process/service snapshots).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub id: String,
    pub name: String,
    pub host: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub pid: Option<i64>,
    pub action: Option<String>,
    pub cpu: Option<f64>,
    pub mem: Option<f64>,
    pub command: Option<String>,
    pub port: Option<i64>,
    pub ip_address: Option<String>,
}

/// One row from the `auth_logs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthLogRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub username: Option<String>,
    pub log_entry: String,
}

/// One row from the `system_metrics` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetricRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sensor_name: String,
    pub value: f64,
    pub host: Option<String>,
}

fn log_to_row(m: log_entry::Model) -> LogRow {
    LogRow {
        id: m.id,
        name: m.name,
        host: m.host,
        timestamp: m.timestamp.with_timezone(&Utc),
        pid: m.pid,
        action: m.action,
        cpu: m.cpu,
        mem: m.mem,
        command: m.command,
        port: m.port,
        ip_address: m.ip_address,
    }
}

fn auth_to_row(m: auth_log::Model) -> AuthLogRow {
    AuthLogRow {
        id: m.id,
        timestamp: m.timestamp.with_timezone(&Utc),
        username: m.username,
        log_entry: m.log_entry,
    }
}

fn metric_to_row(m: system_metric::Model) -> SystemMetricRow {
    SystemMetricRow {
        id: m.id,
        timestamp: m.timestamp.with_timezone(&Utc),
        sensor_name: m.sensor_name,
        value: m.value,
        host: m.host,
    }
}

impl Store {
    pub async fn insert_log(&self, row: &LogRow) -> Result<LogRow> {
        let am = log_entry::ActiveModel {
            id: Set(row.id.clone()),
            name: Set(row.name.clone()),
            host: Set(row.host.clone()),
            timestamp: Set(row.timestamp.fixed_offset()),
            pid: Set(row.pid),
            action: Set(row.action.clone()),
            cpu: Set(row.cpu),
            mem: Set(row.mem),
            command: Set(row.command.clone()),
            port: Set(row.port),
            ip_address: Set(row.ip_address.clone()),
        };
        let model = am.insert(self.db()).await?;
        Ok(log_to_row(model))
    }

    pub async fn insert_auth_log(&self, row: &AuthLogRow) -> Result<AuthLogRow> {
        let am = auth_log::ActiveModel {
            id: Set(row.id.clone()),
            timestamp: Set(row.timestamp.fixed_offset()),
            username: Set(row.username.clone()),
            log_entry: Set(row.log_entry.clone()),
        };
        let model = am.insert(self.db()).await?;
        Ok(auth_to_row(model))
    }

    pub async fn insert_system_metric(&self, row: &SystemMetricRow) -> Result<SystemMetricRow> {
        let am = system_metric::ActiveModel {
            id: Set(row.id.clone()),
            timestamp: Set(row.timestamp.fixed_offset()),
            sensor_name: Set(row.sensor_name.clone()),
            value: Set(row.value),
            host: Set(row.host.clone()),
        };
        let model = am.insert(self.db()).await?;
        Ok(metric_to_row(model))
    }

    /// Logs with `timestamp >= since`, newest first.
    pub async fn query_logs_since(&self, since: DateTime<Utc>) -> Result<Vec<LogRow>> {
        let rows = log_entry::Entity::find()
            .filter(log_entry::Column::Timestamp.gte(since.fixed_offset()))
            .order_by(log_entry::Column::Timestamp, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(log_to_row).collect())
    }

    /// Auth log lines with `timestamp >= since`, newest first.
    pub async fn query_auth_logs_since(&self, since: DateTime<Utc>) -> Result<Vec<AuthLogRow>> {
        let rows = auth_log::Entity::find()
            .filter(auth_log::Column::Timestamp.gte(since.fixed_offset()))
            .order_by(auth_log::Column::Timestamp, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(auth_to_row).collect())
    }

    /// Metric samples with `timestamp >= since`, newest first.
    pub async fn query_system_metrics_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SystemMetricRow>> {
        let rows = system_metric::Entity::find()
            .filter(system_metric::Column::Timestamp.gte(since.fixed_offset()))
            .order_by(system_metric::Column::Timestamp, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(metric_to_row).collect())
    }

    pub async fn list_logs(&self, limit: usize, offset: usize) -> Result<Vec<LogRow>> {
        let rows = log_entry::Entity::find()
            .order_by(log_entry::Column::Timestamp, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(log_to_row).collect())
    }

    pub async fn list_auth_logs(&self, limit: usize, offset: usize) -> Result<Vec<AuthLogRow>> {
        let rows = auth_log::Entity::find()
            .order_by(auth_log::Column::Timestamp, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(auth_to_row).collect())
    }

    pub async fn list_system_metrics(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SystemMetricRow>> {
        let rows = system_metric::Entity::find()
            .order_by(system_metric::Column::Timestamp, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(metric_to_row).collect())
    }

    pub async fn count_logs(&self) -> Result<u64> {
        Ok(log_entry::Entity::find().count(self.db()).await?)
    }

    pub async fn count_auth_logs(&self) -> Result<u64> {
        Ok(auth_log::Entity::find().count(self.db()).await?)
    }

    pub async fn count_system_metrics(&self) -> Result<u64> {
        Ok(system_metric::Entity::find().count(self.db()).await?)
    }
}
