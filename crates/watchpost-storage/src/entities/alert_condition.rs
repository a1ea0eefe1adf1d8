use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_conditions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub source_table: String,
    pub field_name: String,
    pub comparator: String,
    pub threshold_value: String,
    pub time_window_min: Option<i64>,
    pub repeat_interval_min: Option<i64>,
    pub count_threshold: Option<i64>,
    pub last_triggered_at: Option<DateTimeWithTimeZone>,
    pub active: bool,
    pub email_template_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
