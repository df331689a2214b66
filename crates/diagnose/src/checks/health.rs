//! HTTP health endpoints.

use crate::config::DiagnosticsConfig;
use crate::probe::HttpProbe;
use crate::result::DiagnosticResult;

pub async fn check_health<P: HttpProbe>(
    probe: &P,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let mut results = Vec::with_capacity(config.health_endpoints.len());
    for endpoint in &config.health_endpoints {
        let status = probe.status(&endpoint.url).await;
        results.push(evaluate_health(&endpoint.name, &endpoint.url, status));
    }
    results
}

/// Anything but `200` fails, with the status code or transport error in
/// the message.
pub fn evaluate_health(name: &str, url: &str, status: Result<u16, String>) -> DiagnosticResult {
    let check = format!("Health: {name}");
    let detail = match status {
        Ok(200) => return DiagnosticResult::pass(check, "200 OK"),
        Ok(code) => code.to_string(),
        Err(e) => e,
    };
    DiagnosticResult::fail(check, format!("Not responding ({detail})"))
        .with_remedy(format!("curl -v {url} for details"))
}
