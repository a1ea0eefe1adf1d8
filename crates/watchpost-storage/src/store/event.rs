use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::entities::alert_event::{self, Column, Entity};
use crate::store::Store;

/// One row from the `alert_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEventRow {
    pub id: String,
    pub condition_id: String,
    pub triggered_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Filter for event listing.
#[derive(Debug, Clone, Default)]
pub struct AlertEventFilter {
    pub resolved_eq: Option<bool>,
    pub condition_id_eq: Option<String>,
}

/// Result of a resolve call. Resolution happens exactly once; a second call
/// on the same event reports `AlreadyResolved` instead of mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    AlreadyResolved,
    NotFound,
}

fn to_row(m: alert_event::Model) -> AlertEventRow {
    AlertEventRow {
        id: m.id,
        condition_id: m.condition_id,
        triggered_at: m.triggered_at.with_timezone(&Utc),
        resolved: m.resolved,
        resolved_at: m.resolved_at.map(|t| t.with_timezone(&Utc)),
        notes: m.notes,
    }
}

impl Store {
    pub async fn insert_event(&self, row: &AlertEventRow) -> Result<AlertEventRow> {
        let am = alert_event::ActiveModel {
            id: Set(row.id.clone()),
            condition_id: Set(row.condition_id.clone()),
            triggered_at: Set(row.triggered_at.fixed_offset()),
            resolved: Set(false),
            resolved_at: Set(None),
            notes: Set(row.notes.clone()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn get_event_by_id(&self, id: &str) -> Result<Option<AlertEventRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_row))
    }

    pub async fn list_events(
        &self,
        filter: &AlertEventFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AlertEventRow>> {
        let mut q = Entity::find();
        if let Some(r) = filter.resolved_eq {
            q = q.filter(Column::Resolved.eq(r));
        }
        if let Some(cid) = &filter.condition_id_eq {
            q = q.filter(Column::ConditionId.eq(cid));
        }
        let rows = q
            .order_by(Column::TriggeredAt, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }

    pub async fn count_events(&self, filter: &AlertEventFilter) -> Result<u64> {
        let mut q = Entity::find();
        if let Some(r) = filter.resolved_eq {
            q = q.filter(Column::Resolved.eq(r));
        }
        if let Some(cid) = &filter.condition_id_eq {
            q = q.filter(Column::ConditionId.eq(cid));
        }
        Ok(q.count(self.db()).await?)
    }

    pub async fn count_unresolved_events(&self) -> Result<u64> {
        Ok(Entity::find()
            .filter(Column::Resolved.eq(false))
            .count(self.db())
            .await?)
    }

    /// Resolve an event, appending optional resolution notes to any existing
    /// notes. A second resolve is a no-op.
    pub async fn resolve_event(&self, id: &str, notes: Option<&str>) -> Result<ResolveOutcome> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(ResolveOutcome::NotFound);
        };
        if m.resolved {
            return Ok(ResolveOutcome::AlreadyResolved);
        }

        let combined = match (m.notes.clone(), notes) {
            (Some(existing), Some(extra)) => {
                Some(format!("{existing}\n\nResolution notes: {extra}"))
            }
            (None, Some(extra)) => Some(format!("Resolution notes: {extra}")),
            (existing, None) => existing,
        };

        let mut am: alert_event::ActiveModel = m.into();
        am.resolved = Set(true);
        am.resolved_at = Set(Some(Utc::now().fixed_offset()));
        am.notes = Set(combined);
        am.update(self.db()).await?;
        Ok(ResolveOutcome::Resolved)
    }

    /// Resolve every unresolved event. Returns the number of rows updated.
    pub async fn resolve_all_events(&self) -> Result<u64> {
        let unresolved = Entity::find()
            .filter(Column::Resolved.eq(false))
            .all(self.db())
            .await?;
        let count = unresolved.len() as u64;
        let now = Utc::now().fixed_offset();
        for m in unresolved {
            let mut am: alert_event::ActiveModel = m.into();
            am.resolved = Set(true);
            am.resolved_at = Set(Some(now));
            am.update(self.db()).await?;
        }
        Ok(count)
    }
}
