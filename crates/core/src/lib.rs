//! Pure domain logic shared by the Archon operational tools.
//!
//! Nothing in this crate talks to the database. Migration file discovery,
//! checksums and bounded subprocess execution live here so both binaries
//! can use them and they can be tested in isolation.

pub mod discovery;
pub mod error;
pub mod hashing;
pub mod subprocess;
pub mod types;
