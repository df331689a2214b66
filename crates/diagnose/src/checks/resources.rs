//! CPU and memory usage via `docker stats`.

use serde::Deserialize;

use crate::config::DiagnosticsConfig;
use crate::probe::CommandRunner;
use crate::result::DiagnosticResult;

#[derive(Debug, Deserialize)]
struct StatsLine {
    #[serde(rename = "CPUPerc", default)]
    cpu_percent: String,
    #[serde(rename = "MemPerc", default)]
    mem_percent: String,
    #[serde(rename = "MemUsage", default)]
    mem_usage: String,
}

pub async fn check_resources<R: CommandRunner>(
    runner: &R,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let out = runner
        .run(
            "docker",
            &[
                "stats",
                "--no-stream",
                "--format",
                "{{json .}}",
                config.server_container.as_str(),
            ],
        )
        .await;

    if !out.success() {
        return vec![stats_unavailable(config)];
    }
    evaluate_stats(&out.stdout, config).unwrap_or_else(|| vec![stats_unavailable(config)])
}

/// Compare one `docker stats` JSON line against the thresholds.
///
/// Returns `None` when the output cannot be parsed.
pub fn evaluate_stats(stdout: &str, config: &DiagnosticsConfig) -> Option<Vec<DiagnosticResult>> {
    let stats: StatsLine = serde_json::from_str(stdout.trim()).ok()?;
    let cpu = parse_percent(&stats.cpu_percent)?;
    let mem_usage = if stats.mem_usage.is_empty() {
        "unknown"
    } else {
        stats.mem_usage.as_str()
    };

    let mut results = Vec::with_capacity(2);
    if cpu > config.cpu_warn_percent {
        results.push(
            DiagnosticResult::warn("Resource: CPU", format!("High CPU: {cpu}%"))
                .with_remedy("Check for deadlocks or infinite loops"),
        );
    } else {
        results.push(DiagnosticResult::pass(
            "Resource: CPU",
            format!("{cpu}%, Mem: {mem_usage}"),
        ));
    }

    if let Some(mem) = parse_percent(&stats.mem_percent) {
        if mem > config.memory_warn_percent {
            results.push(
                DiagnosticResult::warn("Resource: Memory", format!("High memory: {mem}% ({mem_usage})"))
                    .with_remedy("Check for memory leaks or raise the container memory limit"),
            );
        } else {
            results.push(DiagnosticResult::pass(
                "Resource: Memory",
                format!("{mem}% ({mem_usage})"),
            ));
        }
    }
    Some(results)
}

fn stats_unavailable(config: &DiagnosticsConfig) -> DiagnosticResult {
    DiagnosticResult::warn("Resource: CPU", "Stats unavailable")
        .with_remedy(format!("docker stats --no-stream {}", config.server_container))
}

/// Parse `"12.5%"` into `12.5`.
fn parse_percent(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('%').trim().parse().ok()
}
