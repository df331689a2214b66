//! Colorized console output.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::result::{CheckStatus, DiagnosticResult};

const RULE_WIDTH: usize = 70;

fn paint(status: CheckStatus, text: &str) -> ColoredString {
    match status {
        CheckStatus::Pass => text.green(),
        CheckStatus::Warn => text.yellow(),
        CheckStatus::Fail => text.red(),
    }
}

/// Writes the diagnostic report to `out` as results arrive.
pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        writeln!(self.out, "  {title}")?;
        writeln!(self.out, "{rule}\n")
    }

    pub fn header(&mut self, timestamp: &str) -> io::Result<()> {
        self.banner(&format!("Archon System Diagnostics - {timestamp}"))
    }

    pub fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "\n🔍 {title}")
    }

    pub fn result(&mut self, result: &DiagnosticResult) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {}: {}",
            paint(result.status, result.status.icon()),
            result.name,
            result.message
        )?;
        if let Some(remedy) = &result.remedy {
            writeln!(self.out, "   {}", format!("→ {remedy}").yellow())?;
        }
        Ok(())
    }

    /// Totals per status, then every failure with its remedy.
    pub fn summary(&mut self, results: &[DiagnosticResult]) -> io::Result<()> {
        let count = |status| results.iter().filter(|r| r.status == status).count();

        self.banner("SUMMARY")?;
        writeln!(self.out, "  Total Checks: {}", results.len())?;
        for status in [CheckStatus::Pass, CheckStatus::Warn, CheckStatus::Fail] {
            let label = match status {
                CheckStatus::Pass => "Pass",
                CheckStatus::Warn => "Warn",
                CheckStatus::Fail => "Fail",
            };
            let line = format!("{} {label}: {}", status.icon(), count(status));
            writeln!(self.out, "  {}", paint(status, &line))?;
        }

        if count(CheckStatus::Fail) == 0 {
            return self.out.flush();
        }

        self.banner("CRITICAL FAILURES (Fix these first!):")?;
        for result in results.iter().filter(|r| r.status == CheckStatus::Fail) {
            let line = format!("{} {}", CheckStatus::Fail.icon(), result.name);
            writeln!(self.out, "  {}", paint(CheckStatus::Fail, &line))?;
            if let Some(remedy) = &result.remedy {
                writeln!(self.out, "    {}", format!("→ {remedy}").yellow())?;
            }
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
