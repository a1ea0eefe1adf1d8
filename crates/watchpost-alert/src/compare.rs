//! Comparator dispatch table.
//!
//! `(source_table, field_name, comparator, threshold)` is resolved into a
//! [`CompiledCondition`] once, at condition-creation time. Evaluation only
//! ever runs predicates that passed this resolution.

use watchpost_common::types::{Comparator, SourceTable};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unknown source table: {0}")]
    UnknownSourceTable(String),

    #[error("unknown comparator: {0}")]
    UnknownComparator(String),

    #[error("field '{field}' is not queryable on source table '{table}'")]
    UnknownField { table: SourceTable, field: String },

    #[error("comparator '{comparator}' does not apply to {kind} field '{field}'")]
    ComparatorMismatch {
        comparator: Comparator,
        field: String,
        kind: &'static str,
    },

    #[error("threshold '{0}' is not a number")]
    NonNumericThreshold(String),
}

/// Text fields per table; the bool marks whether `equals` applies (exact
/// identifiers, not free-form log lines).
const TEXT_FIELDS: &[(SourceTable, &str, bool)] = &[
    (SourceTable::Auth, "log_entry", false),
    (SourceTable::Auth, "username", true),
    (SourceTable::Logs, "command", false),
    (SourceTable::Logs, "name", true),
];

const NUMERIC_LOG_FIELDS: &[&str] = &["cpu", "mem"];

#[derive(Debug, Clone)]
enum Predicate {
    Numeric { threshold: f64 },
    // needle is pre-lowercased; all text matching is case-insensitive
    Text { needle: String },
}

/// A validated, ready-to-run condition predicate.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    pub source: SourceTable,
    pub field: String,
    pub comparator: Comparator,
    predicate: Predicate,
}

impl CompiledCondition {
    pub fn compile(
        source_table: &str,
        field_name: &str,
        comparator: &str,
        threshold_value: &str,
    ) -> Result<Self, CompileError> {
        let source: SourceTable = source_table
            .parse()
            .map_err(|_| CompileError::UnknownSourceTable(source_table.to_string()))?;
        let comparator: Comparator = comparator
            .parse()
            .map_err(|_| CompileError::UnknownComparator(comparator.to_string()))?;

        let numeric_field = match source {
            // field_name selects the sensor; the compared value is numeric
            SourceTable::SystemMetrics => true,
            SourceTable::Logs => NUMERIC_LOG_FIELDS.contains(&field_name),
            SourceTable::Auth => false,
        };

        if numeric_field {
            if !comparator.is_numeric() {
                return Err(CompileError::ComparatorMismatch {
                    comparator,
                    field: field_name.to_string(),
                    kind: "numeric",
                });
            }
            let threshold: f64 = threshold_value
                .trim()
                .parse()
                .map_err(|_| CompileError::NonNumericThreshold(threshold_value.to_string()))?;
            return Ok(Self {
                source,
                field: field_name.to_string(),
                comparator,
                predicate: Predicate::Numeric { threshold },
            });
        }

        let text_spec = TEXT_FIELDS
            .iter()
            .find(|(t, f, _)| *t == source && *f == field_name);
        let Some((_, _, equals_ok)) = text_spec else {
            return Err(CompileError::UnknownField {
                table: source,
                field: field_name.to_string(),
            });
        };

        let applies = match comparator {
            Comparator::Contains | Comparator::NotContains => true,
            Comparator::Equals => *equals_ok,
            _ => false,
        };
        if !applies {
            return Err(CompileError::ComparatorMismatch {
                comparator,
                field: field_name.to_string(),
                kind: "text",
            });
        }

        Ok(Self {
            source,
            field: field_name.to_string(),
            comparator,
            predicate: Predicate::Text {
                needle: threshold_value.to_lowercase(),
            },
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.predicate, Predicate::Numeric { .. })
    }

    pub fn matches_number(&self, value: f64) -> bool {
        let Predicate::Numeric { threshold } = self.predicate else {
            return false;
        };
        match self.comparator {
            Comparator::Gt => value > threshold,
            Comparator::Ge => value >= threshold,
            Comparator::Lt => value < threshold,
            Comparator::Le => value <= threshold,
            Comparator::Eq => value == threshold,
            Comparator::Ne => value != threshold,
            _ => false,
        }
    }

    pub fn matches_text(&self, value: &str) -> bool {
        let Predicate::Text { needle } = &self.predicate else {
            return false;
        };
        let hay = value.to_lowercase();
        match self.comparator {
            Comparator::Contains => hay.contains(needle.as_str()),
            Comparator::NotContains => !hay.contains(needle.as_str()),
            Comparator::Equals => hay == *needle,
            _ => false,
        }
    }

    /// Human-readable `field comparator threshold` for reasons and logs.
    pub fn describe(&self) -> String {
        match &self.predicate {
            Predicate::Numeric { threshold } => {
                format!("{} {} {}", self.field, self.comparator, threshold)
            }
            Predicate::Text { needle } => {
                format!("{} {} \"{}\"", self.field, self.comparator, needle)
            }
        }
    }
}
