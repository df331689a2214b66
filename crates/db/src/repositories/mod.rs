//! Query layer over a single [`sqlx::PgConnection`].

pub mod migration_repo;

pub use migration_repo::MigrationRepo;
