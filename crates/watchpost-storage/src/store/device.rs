use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, Order, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::device::{self, Column, Entity};
use crate::store::Store;

/// One row from the `devices` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_row(m: device::Model) -> DeviceRow {
    DeviceRow {
        id: m.id,
        name: m.name,
        ip_address: m.ip_address,
        mac_address: m.mac_address,
        notes: m.notes,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    pub async fn insert_device(&self, row: &DeviceRow) -> Result<DeviceRow> {
        let now = Utc::now().fixed_offset();
        let am = device::ActiveModel {
            id: Set(row.id.clone()),
            name: Set(row.name.clone()),
            ip_address: Set(row.ip_address.clone()),
            mac_address: Set(row.mac_address.clone()),
            notes: Set(row.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn get_device_by_id(&self, id: &str) -> Result<Option<DeviceRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_row))
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceRow>> {
        let rows = Entity::find()
            .order_by(Column::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }

    pub async fn update_device(
        &self,
        id: &str,
        name: Option<&str>,
        ip_address: Option<Option<&str>>,
        mac_address: Option<Option<&str>>,
        notes: Option<Option<&str>>,
    ) -> Result<Option<DeviceRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(None);
        };
        let mut am: device::ActiveModel = m.into();
        if let Some(v) = name {
            am.name = Set(v.to_string());
        }
        if let Some(v) = ip_address {
            am.ip_address = Set(v.map(str::to_string));
        }
        if let Some(v) = mac_address {
            am.mac_address = Set(v.map(str::to_string));
        }
        if let Some(v) = notes {
            am.notes = Set(v.map(str::to_string));
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        let updated = am.update(self.db()).await?;
        Ok(Some(to_row(updated)))
    }

    pub async fn delete_device(&self, id: &str) -> Result<bool> {
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(res.rows_affected > 0)
    }
}
