/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Version label assigned to files that do not live in a versioned directory.
pub const BASE_VERSION: &str = "base";
