use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub host: Option<String>,
    pub timestamp: DateTimeWithTimeZone,
    pub pid: Option<i64>,
    pub action: Option<String>,
    pub cpu: Option<f64>,
    pub mem: Option<f64>,
    pub command: Option<String>,
    pub port: Option<i64>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
