use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, EntityTrait, Order, PaginatorTrait, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::entities::activity_log::{self, Column, Entity};
use crate::store::Store;

/// One row from the `activity_logs` audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogRow {
    pub id: String,
    pub action_type: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

fn to_row(m: activity_log::Model) -> ActivityLogRow {
    ActivityLogRow {
        id: m.id,
        action_type: m.action_type,
        target_type: m.target_type,
        target_id: m.target_id,
        details: m.details,
        timestamp: m.timestamp.with_timezone(&Utc),
    }
}

impl Store {
    pub async fn insert_activity(&self, row: &ActivityLogRow) -> Result<ActivityLogRow> {
        let am = activity_log::ActiveModel {
            id: Set(row.id.clone()),
            action_type: Set(row.action_type.clone()),
            target_type: Set(row.target_type.clone()),
            target_id: Set(row.target_id.clone()),
            details: Set(row.details.clone()),
            timestamp: Set(row.timestamp.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn list_activity(&self, limit: usize, offset: usize) -> Result<Vec<ActivityLogRow>> {
        let rows = Entity::find()
            .order_by(Column::Timestamp, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }

    pub async fn count_activity(&self) -> Result<u64> {
        Ok(Entity::find().count(self.db()).await?)
    }
}
