use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

pub mod activity;
pub mod condition;
pub mod device;
pub mod event;
pub mod source;
pub mod template;

pub use activity::ActivityLogRow;
pub use condition::{AlertConditionRow, AlertConditionUpdate};
pub use device::DeviceRow;
pub use event::{AlertEventFilter, AlertEventRow, ResolveOutcome};
pub use source::{AuthLogRow, LogRow, SystemMetricRow};
pub use template::EmailTemplateRow;

/// Unified access layer for the watchpost database.
///
/// All methods are `async fn` over SeaORM. SQLite is the default backend;
/// any `db_url` SeaORM accepts works (e.g. `sqlite://data/watchpost.db?mode=rwc`
/// or `sqlite::memory:` in tests).
pub struct Store {
    pub(crate) db: DatabaseConnection,
}

impl Store {
    /// Connect and initialize the database, running any pending migrations.
    pub async fn connect(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        // WAL mode only applies to file-backed SQLite
        if db_url.starts_with("sqlite://") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;
        tracing::info!(db_url = %db_url, "Initialized store");

        Ok(Self { db })
    }

    /// Underlying connection handle, for submodules.
    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
