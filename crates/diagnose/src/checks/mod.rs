//! The diagnostic battery. Checks are independent of one another; each
//! returns its own results and never aborts the run.

pub mod containers;
pub mod environment;
pub mod health;
pub mod logs;
pub mod network;
pub mod resources;
