//! `archon-migrate` library crate.
//!
//! Applies the SQL files of a migrations directory in a fixed order and
//! tracks what has been applied in `archon_migrations`. The binary
//! entrypoint lives in `main.rs`.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod reset;
pub mod runner;
pub mod store;
