//! Seams to the outside world: external commands and HTTP endpoints.
//!
//! Checks only see [`CommandRunner`] and [`HttpProbe`], so they can be
//! exercised with canned outputs. Neither trait reports errors: a command
//! that could not run, or timed out, comes back as a failed
//! [`CommandOutput`], which the checks turn into a failed result.

use std::future::Future;
use std::time::Duration;

use archon_core::subprocess::{run_command, CommandError, CommandOutput};
use tokio::process::Command;

/// Runs an external program and captures its output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = CommandOutput> + Send;
}

/// [`CommandRunner`] that spawns real processes with a timeout.
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> CommandOutput {
        let mut cmd = Command::new(program);
        cmd.args(args);

        match run_command(&mut cmd, self.timeout).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(program, ?args, error = %e, "Command did not complete");
                let (stderr, duration_ms) = match e {
                    CommandError::Timeout { elapsed_ms } => {
                        ("Command timed out".to_string(), elapsed_ms)
                    }
                    CommandError::Io(io) => (io.to_string(), 0),
                };
                CommandOutput {
                    stdout: String::new(),
                    stderr,
                    exit_code: -1,
                    duration_ms,
                }
            }
        }
    }
}

/// Fetches the HTTP status code of a URL.
///
/// `Err` carries a description of why no status was received.
pub trait HttpProbe: Send + Sync {
    fn status(&self, url: &str) -> impl Future<Output = Result<u16, String>> + Send;
}

/// [`HttpProbe`] backed by `reqwest`. Redirects are not followed.
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    async fn status(&self, url: &str) -> Result<u16, String> {
        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_timeout() => Err("timed out".to_string()),
            Err(e) if e.is_connect() => Err("connection refused".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}
