//! Persistence layer for Branch Sentry.
//!
//! Two layers live here:
//! - `models` / `repositories`: row structs and zero-sized `*Repo` types with
//!   the SQL for each table.
//! - `store`: the async traits the rest of the workspace depends on, with a
//!   PostgreSQL implementation ([`PgStore`]) and an in-process one
//!   ([`MemoryStore`]).

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{apply_ticket_counts, BranchStore, IssueStore, ReportConfigStore, SparePartStore, Store, UserStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
