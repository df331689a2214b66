//! Container status via `docker ps`.

use serde::Deserialize;

use crate::config::DiagnosticsConfig;
use crate::probe::CommandRunner;
use crate::result::DiagnosticResult;

/// The fields of one `docker ps --format {{json .}}` line we care about.
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "Names", default = "unknown")]
    names: String,
    #[serde(rename = "Status", default = "unknown")]
    status: String,
}

fn unknown() -> String {
    "unknown".to_string()
}

pub async fn check_containers<R: CommandRunner>(
    runner: &R,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let filter = format!("name={}", config.container_prefix);
    let out = runner
        .run(
            "docker",
            &["ps", "-a", "--filter", filter.as_str(), "--format", "{{json .}}"],
        )
        .await;

    if !out.success() {
        return vec![DiagnosticResult::fail("Docker Status", "Docker not accessible")
            .with_remedy("Ensure Docker daemon is running")];
    }

    let results = parse_ps_output(&out.stdout);
    if results.is_empty() {
        return vec![DiagnosticResult::warn(
            "Containers",
            format!("No containers matching {}*", config.container_prefix),
        )];
    }
    results
}

/// One result per container line in `docker ps` JSON-lines output.
pub fn parse_ps_output(stdout: &str) -> Vec<DiagnosticResult> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match serde_json::from_str::<PsLine>(line) {
            Ok(ps) => classify_container(&ps.names, &ps.status),
            Err(e) => {
                tracing::debug!(line, error = %e, "Unparsable docker ps line");
                DiagnosticResult::warn("Container: unknown", "Unrecognized docker ps output")
            }
        })
        .collect()
}

/// Classify a container from its `docker ps` status text.
pub fn classify_container(name: &str, status: &str) -> DiagnosticResult {
    let check = format!("Container: {name}");
    let lower = status.to_lowercase();

    if lower.contains("unhealthy") {
        DiagnosticResult::fail(check, format!("Unhealthy: {status}"))
            .with_remedy(format!("docker logs {name} --tail 50"))
    } else if lower.contains("up") {
        DiagnosticResult::pass(check, format!("Running: {status}"))
    } else {
        DiagnosticResult::warn(check, format!("Status: {status}"))
    }
}
