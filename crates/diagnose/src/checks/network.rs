//! Connectivity from the server container to Supabase.

use archon_core::subprocess::CommandOutput;

use crate::config::DiagnosticsConfig;
use crate::probe::CommandRunner;
use crate::result::DiagnosticResult;

/// Runs inside the server container, using its own environment, and prints
/// the HTTP status of the Supabase REST root.
const SUPABASE_PROBE: &str = "import os, httpx; \
url = os.getenv('SUPABASE_URL'); \
key = os.getenv('SUPABASE_SERVICE_KEY'); \
r = httpx.get(f'{url}/rest/v1/', headers={'apikey': key}, timeout=5.0); \
print(r.status_code)";

pub async fn check_network<R: CommandRunner>(
    runner: &R,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let out = runner
        .run(
            "docker",
            &[
                "exec",
                config.server_container.as_str(),
                "python",
                "-c",
                SUPABASE_PROBE,
            ],
        )
        .await;
    vec![evaluate_connectivity(&out)]
}

pub fn evaluate_connectivity(out: &CommandOutput) -> DiagnosticResult {
    if out.success() && out.stdout.contains("200") {
        DiagnosticResult::pass("Network: Supabase", "Connected")
    } else {
        DiagnosticResult::fail("Network: Supabase", "Cannot connect")
            .with_remedy("Verify Supabase running and SUPABASE_URL is correct")
    }
}
