//! Recent container logs scanned against the signature catalogue.

use archon_core::subprocess::CommandOutput;

use crate::config::DiagnosticsConfig;
use crate::probe::CommandRunner;
use crate::result::DiagnosticResult;
use crate::signatures::{signatures, LogSignature};

/// Maximum characters of log context quoted in a result.
const MAX_CONTEXT_CHARS: usize = 300;

/// Lines of context before and after the matching line.
const CONTEXT_BEFORE: usize = 2;
const CONTEXT_AFTER: usize = 4;

const STARTUP_MARKER: &str = "started successfully";

pub async fn check_logs<R: CommandRunner>(
    runner: &R,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let tail = config.log_tail_lines.to_string();
    let mut results = Vec::new();

    for service in &config.log_services {
        let out = runner
            .run("docker", &["logs", service.as_str(), "--tail", tail.as_str()])
            .await;
        if !out.success() {
            tracing::debug!(service = %service, stderr = %out.stderr.trim(), "Skipping logs");
            continue;
        }
        results.extend(scan_logs(service, &combined_output(&out), signatures()));
    }
    results
}

/// `docker logs` splits the container's output across both streams; keep
/// the last stdout line and the first stderr line apart.
fn combined_output(out: &CommandOutput) -> String {
    let mut logs = out.stdout.clone();
    if !logs.is_empty() && !logs.ends_with('\n') {
        logs.push('\n');
    }
    logs.push_str(&out.stderr);
    logs
}

/// Report the first line matching each signature, plus a pass when the
/// service announced a successful startup.
pub fn scan_logs(service: &str, logs: &str, signatures: &[LogSignature]) -> Vec<DiagnosticResult> {
    let lines: Vec<&str> = logs.lines().collect();
    let mut results = Vec::new();

    for signature in signatures {
        if let Some(idx) = lines.iter().position(|l| signature.pattern.is_match(l)) {
            results.push(
                DiagnosticResult::fail(
                    format!("Log Error: {service}/{}", signature.label),
                    format!("Found in logs:\n   {}", context(&lines, idx)),
                )
                .with_remedy(signature.remedy),
            );
        }
    }

    if logs.to_lowercase().contains(STARTUP_MARKER) {
        results.push(DiagnosticResult::pass(
            format!("Startup: {service}"),
            "Started successfully",
        ));
    }
    results
}

/// Lines around `idx`, indented and capped at [`MAX_CONTEXT_CHARS`].
fn context(lines: &[&str], idx: usize) -> String {
    let start = idx.saturating_sub(CONTEXT_BEFORE);
    let end = (idx + CONTEXT_AFTER + 1).min(lines.len());
    let joined = lines[start..end].join("\n   ");

    if joined.chars().count() <= MAX_CONTEXT_CHARS {
        return joined;
    }
    let truncated: String = joined.chars().take(MAX_CONTEXT_CHARS).collect();
    format!("{truncated}...")
}
