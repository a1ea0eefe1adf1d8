use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};

use crate::entities::alert_condition::{self, Column, Entity};
use crate::entities::alert_event;
use crate::store::Store;

/// One row from the `alert_conditions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConditionRow {
    pub id: String,
    pub name: String,
    pub source_table: String,
    pub field_name: String,
    pub comparator: String,
    pub threshold_value: String,
    pub time_window_min: Option<i64>,
    pub repeat_interval_min: Option<i64>,
    pub count_threshold: Option<i64>,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub email_template_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set accepted by `update_condition`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConditionUpdate {
    pub name: Option<String>,
    pub source_table: Option<String>,
    pub field_name: Option<String>,
    pub comparator: Option<String>,
    pub threshold_value: Option<String>,
    pub time_window_min: Option<Option<i64>>,
    pub repeat_interval_min: Option<Option<i64>>,
    pub count_threshold: Option<Option<i64>>,
    pub email_template_id: Option<Option<String>>,
}

fn to_row(m: alert_condition::Model) -> AlertConditionRow {
    AlertConditionRow {
        id: m.id,
        name: m.name,
        source_table: m.source_table,
        field_name: m.field_name,
        comparator: m.comparator,
        threshold_value: m.threshold_value,
        time_window_min: m.time_window_min,
        repeat_interval_min: m.repeat_interval_min,
        count_threshold: m.count_threshold,
        last_triggered_at: m.last_triggered_at.map(|t| t.with_timezone(&Utc)),
        active: m.active,
        email_template_id: m.email_template_id,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    pub async fn insert_condition(&self, row: &AlertConditionRow) -> Result<AlertConditionRow> {
        let now = Utc::now().fixed_offset();
        let am = alert_condition::ActiveModel {
            id: Set(row.id.clone()),
            name: Set(row.name.clone()),
            source_table: Set(row.source_table.clone()),
            field_name: Set(row.field_name.clone()),
            comparator: Set(row.comparator.clone()),
            threshold_value: Set(row.threshold_value.clone()),
            time_window_min: Set(row.time_window_min),
            repeat_interval_min: Set(row.repeat_interval_min),
            count_threshold: Set(row.count_threshold),
            last_triggered_at: Set(None),
            active: Set(row.active),
            email_template_id: Set(row.email_template_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn get_condition_by_id(&self, id: &str) -> Result<Option<AlertConditionRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_row))
    }

    pub async fn list_conditions(&self, active: Option<bool>) -> Result<Vec<AlertConditionRow>> {
        let mut q = Entity::find();
        if let Some(a) = active {
            q = q.filter(Column::Active.eq(a));
        }
        let rows = q.order_by(Column::Name, Order::Asc).all(self.db()).await?;
        Ok(rows.into_iter().map(to_row).collect())
    }

    pub async fn count_conditions(&self, active: Option<bool>) -> Result<u64> {
        let mut q = Entity::find();
        if let Some(a) = active {
            q = q.filter(Column::Active.eq(a));
        }
        Ok(q.count(self.db()).await?)
    }

    pub async fn update_condition(
        &self,
        id: &str,
        update: &AlertConditionUpdate,
    ) -> Result<Option<AlertConditionRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(None);
        };
        let now = Utc::now().fixed_offset();
        let mut am: alert_condition::ActiveModel = m.into();
        if let Some(v) = &update.name {
            am.name = Set(v.clone());
        }
        if let Some(v) = &update.source_table {
            am.source_table = Set(v.clone());
        }
        if let Some(v) = &update.field_name {
            am.field_name = Set(v.clone());
        }
        if let Some(v) = &update.comparator {
            am.comparator = Set(v.clone());
        }
        if let Some(v) = &update.threshold_value {
            am.threshold_value = Set(v.clone());
        }
        if let Some(v) = update.time_window_min {
            am.time_window_min = Set(v);
        }
        if let Some(v) = update.repeat_interval_min {
            am.repeat_interval_min = Set(v);
        }
        if let Some(v) = update.count_threshold {
            am.count_threshold = Set(v);
        }
        if let Some(v) = &update.email_template_id {
            am.email_template_id = Set(v.clone());
        }
        am.updated_at = Set(now);
        let updated = am.update(self.db()).await?;
        Ok(Some(to_row(updated)))
    }

    /// Delete a condition and all of its alert events.
    pub async fn delete_condition(&self, id: &str) -> Result<bool> {
        alert_event::Entity::delete_many()
            .filter(alert_event::Column::ConditionId.eq(id))
            .exec(self.db())
            .await?;
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn set_condition_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<Option<AlertConditionRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(None);
        };
        let now = Utc::now().fixed_offset();
        let mut am: alert_condition::ActiveModel = m.into();
        am.active = Set(active);
        am.updated_at = Set(now);
        let updated = am.update(self.db()).await?;
        Ok(Some(to_row(updated)))
    }

    /// Stamp the time of the most recent trigger, used by the repeat-interval
    /// duplicate suppression. Read-then-write, not atomic.
    pub async fn set_condition_last_triggered(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(false);
        };
        let mut am: alert_condition::ActiveModel = m.into();
        am.last_triggered_at = Set(Some(at.fixed_offset()));
        am.update(self.db()).await?;
        Ok(true)
    }
}
