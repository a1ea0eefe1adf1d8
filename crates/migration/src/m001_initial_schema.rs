use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Tables in dependency order
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS email_templates (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    subject TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS alert_conditions (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    source_table TEXT NOT NULL,
    field_name TEXT NOT NULL,
    comparator TEXT NOT NULL,
    threshold_value TEXT NOT NULL,
    time_window_min INTEGER,
    repeat_interval_min INTEGER,
    count_threshold INTEGER,
    last_triggered_at TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    email_template_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_conditions_active ON alert_conditions(active);

CREATE TABLE IF NOT EXISTS alert_events (
    id TEXT PRIMARY KEY NOT NULL,
    condition_id TEXT NOT NULL,
    triggered_at TEXT NOT NULL,
    resolved INTEGER NOT NULL DEFAULT 0,
    resolved_at TEXT,
    notes TEXT
);
CREATE INDEX IF NOT EXISTS idx_alert_events_condition_id ON alert_events(condition_id);
CREATE INDEX IF NOT EXISTS idx_alert_events_resolved ON alert_events(resolved);
CREATE INDEX IF NOT EXISTS idx_alert_events_triggered_at ON alert_events(triggered_at DESC);

CREATE TABLE IF NOT EXISTS devices (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    ip_address TEXT,
    mac_address TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_devices_name ON devices(name);

CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    host TEXT,
    timestamp TEXT NOT NULL,
    pid INTEGER,
    action TEXT,
    cpu REAL,
    mem REAL,
    command TEXT,
    port INTEGER,
    ip_address TEXT
);
CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp DESC);

CREATE TABLE IF NOT EXISTS auth_logs (
    id TEXT PRIMARY KEY NOT NULL,
    timestamp TEXT NOT NULL,
    username TEXT,
    log_entry TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_auth_logs_timestamp ON auth_logs(timestamp DESC);

CREATE TABLE IF NOT EXISTS system_metrics (
    id TEXT PRIMARY KEY NOT NULL,
    timestamp TEXT NOT NULL,
    sensor_name TEXT NOT NULL,
    value REAL NOT NULL,
    host TEXT
);
CREATE INDEX IF NOT EXISTS idx_system_metrics_timestamp ON system_metrics(timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_system_metrics_sensor ON system_metrics(sensor_name);

CREATE TABLE IF NOT EXISTS activity_logs (
    id TEXT PRIMARY KEY NOT NULL,
    action_type TEXT NOT NULL,
    target_type TEXT NOT NULL,
    target_id TEXT,
    details TEXT,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activity_logs_timestamp ON activity_logs(timestamp DESC);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS activity_logs;
DROP TABLE IF EXISTS system_metrics;
DROP TABLE IF EXISTS auth_logs;
DROP TABLE IF EXISTS logs;
DROP TABLE IF EXISTS devices;
DROP TABLE IF EXISTS alert_events;
DROP TABLE IF EXISTS alert_conditions;
DROP TABLE IF EXISTS email_templates;
";
