pub mod activity_log;
pub mod alert_condition;
pub mod alert_event;
pub mod auth_log;
pub mod device;
pub mod email_template;
pub mod log_entry;
pub mod system_metric;
