use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};

use crate::entities::email_template::{self, Column, Entity};
use crate::store::Store;

/// One row from the `email_templates` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplateRow {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_row(m: email_template::Model) -> EmailTemplateRow {
    EmailTemplateRow {
        id: m.id,
        name: m.name,
        subject: m.subject,
        body: m.body,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    pub async fn insert_template(&self, row: &EmailTemplateRow) -> Result<EmailTemplateRow> {
        let now = Utc::now().fixed_offset();
        let am = email_template::ActiveModel {
            id: Set(row.id.clone()),
            name: Set(row.name.clone()),
            subject: Set(row.subject.clone()),
            body: Set(row.body.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn get_template_by_id(&self, id: &str) -> Result<Option<EmailTemplateRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_row))
    }

    pub async fn get_template_by_name(&self, name: &str) -> Result<Option<EmailTemplateRow>> {
        let model = Entity::find()
            .filter(Column::Name.eq(name))
            .one(self.db())
            .await?;
        Ok(model.map(to_row))
    }

    pub async fn list_templates(&self) -> Result<Vec<EmailTemplateRow>> {
        let rows = Entity::find()
            .order_by(Column::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }

    pub async fn update_template(
        &self,
        id: &str,
        name: Option<&str>,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Result<Option<EmailTemplateRow>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        let Some(m) = model else {
            return Ok(None);
        };
        let mut am: email_template::ActiveModel = m.into();
        if let Some(v) = name {
            am.name = Set(v.to_string());
        }
        if let Some(v) = subject {
            am.subject = Set(v.to_string());
        }
        if let Some(v) = body {
            am.body = Set(v.to_string());
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        let updated = am.update(self.db()).await?;
        Ok(Some(to_row(updated)))
    }

    pub async fn delete_template(&self, id: &str) -> Result<bool> {
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(res.rows_affected > 0)
    }
}
