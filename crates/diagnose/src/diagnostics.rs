//! Runs the whole battery and collects its results.

use std::io::{self, Write};

use crate::checks::{containers, environment, health, logs, network, resources};
use crate::config::DiagnosticsConfig;
use crate::probe::{CommandRunner, HttpProbe};
use crate::report::Reporter;
use crate::result::{CheckStatus, DiagnosticResult};

/// All results of one diagnostics run.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<DiagnosticResult>,
}

impl Report {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Any failing check makes the run unhealthy; warnings do not.
    pub fn has_failures(&self) -> bool {
        self.count(CheckStatus::Fail) > 0
    }
}

/// The diagnostic battery over a command runner and an HTTP probe.
pub struct Diagnostics<R, P> {
    runner: R,
    probe: P,
    config: DiagnosticsConfig,
}

impl<R: CommandRunner, P: HttpProbe> Diagnostics<R, P> {
    pub fn new(runner: R, probe: P, config: DiagnosticsConfig) -> Self {
        Self {
            runner,
            probe,
            config,
        }
    }

    /// Run every check in turn, printing results to `out` as each check
    /// finishes, then print the summary.
    pub async fn run_all<W: Write>(&self, out: W) -> io::Result<Report> {
        let mut reporter = Reporter::new(out);
        let mut report = Report::default();

        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        reporter.header(&now)?;

        reporter.section("Checking containers...")?;
        let batch = containers::check_containers(&self.runner, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.section("Checking environment...")?;
        let batch = environment::check_environment(&self.runner, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.section("Analyzing logs...")?;
        let batch = logs::check_logs(&self.runner, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.section("Checking health endpoints...")?;
        let batch = health::check_health(&self.probe, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.section("Checking resources...")?;
        let batch = resources::check_resources(&self.runner, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.section("Checking network...")?;
        let batch = network::check_network(&self.runner, &self.config).await;
        record(&mut reporter, &mut report, batch)?;

        reporter.summary(&report.results)?;

        tracing::debug!(
            pass = report.count(CheckStatus::Pass),
            warn = report.count(CheckStatus::Warn),
            fail = report.count(CheckStatus::Fail),
            "Diagnostics complete",
        );
        Ok(report)
    }
}

fn record<W: Write>(
    reporter: &mut Reporter<W>,
    report: &mut Report,
    batch: Vec<DiagnosticResult>,
) -> io::Result<()> {
    for result in batch {
        reporter.result(&result)?;
        report.results.push(result);
    }
    Ok(())
}
