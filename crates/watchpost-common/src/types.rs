use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logical dataset an alert condition watches.
///
/// # Examples
///
/// ```
/// use watchpost_common::types::SourceTable;
///
/// let src: SourceTable = "system_metrics".parse().unwrap();
/// assert_eq!(src, SourceTable::SystemMetrics);
/// assert_eq!(src.to_string(), "system_metrics");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    SystemMetrics,
    Auth,
    Logs,
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTable::SystemMetrics => write!(f, "system_metrics"),
            SourceTable::Auth => write!(f, "auth"),
            SourceTable::Logs => write!(f, "logs"),
        }
    }
}

impl std::str::FromStr for SourceTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system_metrics" => Ok(SourceTable::SystemMetrics),
            "auth" => Ok(SourceTable::Auth),
            "logs" => Ok(SourceTable::Logs),
            _ => Err(format!("unknown source table: {s}")),
        }
    }
}

/// Comparison operator stored on an alert condition.
///
/// Numeric operators apply to numeric fields (sensor values, cpu, mem);
/// text operators apply to string fields (command, username, log_entry,
/// name) and compare case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not_contains")]
    NotContains,
    #[serde(rename = "equals")]
    Equals,
}

impl Comparator {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Comparator::Gt
                | Comparator::Ge
                | Comparator::Lt
                | Comparator::Le
                | Comparator::Eq
                | Comparator::Ne
        )
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Contains => "contains",
            Comparator::NotContains => "not_contains",
            Comparator::Equals => "equals",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Comparator::Gt),
            ">=" => Ok(Comparator::Ge),
            "<" => Ok(Comparator::Lt),
            "<=" => Ok(Comparator::Le),
            "==" => Ok(Comparator::Eq),
            "!=" => Ok(Comparator::Ne),
            "contains" => Ok(Comparator::Contains),
            "not_contains" => Ok(Comparator::NotContains),
            "equals" => Ok(Comparator::Equals),
            _ => Err(format!("unknown comparator: {s}")),
        }
    }
}

/// Reachability state of a monitored device as seen by the ping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// One status-change delta broadcast to device-monitor subscribers.
///
/// Emitted only when a device flips state (or on its first observation),
/// never once per poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub device_id: String,
    pub status: DeviceStatus,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_round_trips_through_strings() {
        for s in [
            ">",
            ">=",
            "<",
            "<=",
            "==",
            "!=",
            "contains",
            "not_contains",
            "equals",
        ] {
            let c: Comparator = s.parse().unwrap();
            assert_eq!(c.to_string(), s);
        }
        assert!("=~".parse::<Comparator>().is_err());
    }

    #[test]
    fn numeric_classification() {
        assert!(Comparator::Gt.is_numeric());
        assert!(Comparator::Ne.is_numeric());
        assert!(!Comparator::Contains.is_numeric());
        assert!(!Comparator::Equals.is_numeric());
    }
}
