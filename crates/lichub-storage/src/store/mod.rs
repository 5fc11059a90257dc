use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::error::Result;

pub mod associations;
pub mod channel;
pub mod customer;
pub mod license;
pub mod product;

// ---- write payloads (re-exported from the entity sub-modules) ----
pub use channel::NewChannel;
pub use customer::NewCustomer;
pub use license::NewLicense;
pub use product::NewProduct;

/// Unified access layer for the management database.
///
/// All methods are `async fn` over SeaORM + SQLite. Orchestrated writes
/// (entity plus association sync, cascading deletes) each run in a
/// single transaction; a failure anywhere rolls the whole operation
/// back.
pub struct EntityStore {
    pub(crate) db: DatabaseConnection,
}

impl EntityStore {
    /// Connect to `db_url` and bring the schema up to date.
    ///
    /// SQLite example: `sqlite://data/lichub.db?mode=rwc`. WAL mode is
    /// enabled for SQLite URLs; migrations run on every startup.
    pub async fn new(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        // WAL mode only applies to SQLite
        if db_url.starts_with("sqlite:") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;

        tracing::info!(db_url = %db_url, "Initialized entity store");
        Ok(Self { db })
    }

    /// Underlying connection reference for the entity sub-modules.
    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Connectivity check used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}
