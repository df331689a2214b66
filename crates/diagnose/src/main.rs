//! `archon-diagnose` -- quick triage of a local Archon deployment.
//!
//! Takes no arguments. Runs every check (containers, environment, logs,
//! health endpoints, resources, network), prints a colorized report and
//! exits 1 if any check failed. Set `RUST_LOG=archon_diagnose=debug` to
//! see why individual commands did not complete.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use archon_diagnose::config::DiagnosticsConfig;
use archon_diagnose::diagnostics::Diagnostics;
use archon_diagnose::probe::{ReqwestProbe, SystemRunner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archon_diagnose=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let _log_guard = tracing::subscriber::set_default(subscriber);

    let config = DiagnosticsConfig::default();
    let probe = match ReqwestProbe::new(config.http_timeout) {
        Ok(probe) => probe,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let runner = SystemRunner::new(config.command_timeout);

    match Diagnostics::new(runner, probe, config)
        .run_all(std::io::stdout())
        .await
    {
        Ok(report) if !report.has_failures() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Failed to write report");
            ExitCode::FAILURE
        }
    }
}
