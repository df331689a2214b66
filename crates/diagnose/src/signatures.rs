//! Catalogue of known error signatures in container logs.
//!
//! Each entry is a `(label, pattern, remedy)` triple. Patterns are matched
//! case-insensitively against individual log lines. New signatures only
//! need a row in [`SIGNATURE_TABLE`].

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Remedy used when a signature has nothing more specific to suggest.
pub const DEFAULT_REMEDY: &str = "Check full logs for context";

const SIGNATURE_TABLE: &[(&str, &str, &str)] = &[
    (
        "ImportError",
        r"ImportError: cannot import name '(\w+)' from '([\w.]+)'",
        "Code change broke imports. Search codebase: grep -r 'from.*import.*OLDNAME' src/",
    ),
    (
        "ModuleNotFoundError",
        r"ModuleNotFoundError: No module named '([\w.]+)'",
        "Missing dependency. Rebuild: docker compose build",
    ),
    (
        "Connection Refused",
        r"\[Errno 111\] Connection refused",
        "Check dependent services are running. Verify SUPABASE_URL points to correct host.",
    ),
    (
        "Traceback",
        r"Traceback \(most recent call last\):",
        DEFAULT_REMEDY,
    ),
    (
        "Startup Failed",
        r"(Application startup failed|ERROR:.*Application startup failed)",
        "Check main.py lifespan handler",
    ),
    (
        "Database Error",
        r"(postgres|supabase|database).*error",
        "Verify Supabase is running: docker ps | grep supabase",
    ),
];

/// A compiled log error signature.
#[derive(Debug)]
pub struct LogSignature {
    pub label: &'static str,
    pub pattern: Regex,
    pub remedy: &'static str,
}

static SIGNATURES: LazyLock<Vec<LogSignature>> = LazyLock::new(|| {
    SIGNATURE_TABLE
        .iter()
        .map(|&(label, pattern, remedy)| LogSignature {
            label,
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("valid regex"),
            remedy,
        })
        .collect()
});

/// The built-in signature catalogue, in evaluation order.
pub fn signatures() -> &'static [LogSignature] {
    &SIGNATURES
}
