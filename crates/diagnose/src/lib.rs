//! `archon-diagnose` library crate.
//!
//! A fixed battery of independent health checks against a running Archon
//! deployment. Each check shells out to the container runtime or probes an
//! HTTP endpoint and yields pass/warn/fail results. The binary entrypoint
//! lives in `main.rs`.

pub mod checks;
pub mod config;
pub mod diagnostics;
pub mod probe;
pub mod report;
pub mod result;
pub mod signatures;
