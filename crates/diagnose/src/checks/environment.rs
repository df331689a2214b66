//! Required environment variables inside running containers.

use archon_core::subprocess::CommandOutput;

use crate::config::DiagnosticsConfig;
use crate::probe::CommandRunner;
use crate::result::DiagnosticResult;

/// Substrings marking a variable whose value must not be printed in full.
const SECRET_MARKERS: &[&str] = &["KEY", "SECRET", "TOKEN", "PASSWORD"];

pub async fn check_environment<R: CommandRunner>(
    runner: &R,
    config: &DiagnosticsConfig,
) -> Vec<DiagnosticResult> {
    let mut results = Vec::with_capacity(config.env_checks.len());
    for (service, var) in &config.env_checks {
        let out = runner.run("docker", &["exec", service.as_str(), "printenv", var.as_str()]).await;
        results.push(evaluate_env_var(service, var, &out));
    }
    results
}

/// Turn the output of `printenv VAR` into a result.
pub fn evaluate_env_var(service: &str, var: &str, out: &CommandOutput) -> DiagnosticResult {
    let check = format!("EnvVar: {service}/{var}");
    let value = out.stdout.trim();

    if !out.success() || value.is_empty() {
        return DiagnosticResult::fail(check, "Not set or empty")
            .with_remedy("Check .env and docker-compose.yml");
    }

    let shown = if is_secret(var) {
        redact(value)
    } else {
        value.to_string()
    };
    DiagnosticResult::pass(check, shown)
}

pub fn is_secret(var: &str) -> bool {
    let upper = var.to_uppercase();
    SECRET_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Keep the first 10 and last 5 characters of a secret. Values too short
/// to hide anything that way are masked entirely.
pub fn redact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 15 {
        return "***".to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CheckStatus;

    fn output(stdout: &str, exit_code: i32) -> CommandOutput {
        CommandOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code,
            duration_ms: 1,
        }
    }

    #[test]
    fn plain_variable_is_shown() {
        let r = evaluate_env_var("archon-server", "ARCHON_SERVER_PORT", &output("8181\n", 0));
        assert_eq!(r.status, CheckStatus::Pass);
        assert_eq!(r.message, "8181");
    }

    #[test]
    fn secret_variable_is_redacted() {
        let key = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.payload.signature";
        let r = evaluate_env_var("archon-server", "SUPABASE_SERVICE_KEY", &output(key, 0));
        assert_eq!(r.status, CheckStatus::Pass);
        assert_eq!(r.message, "eyJhbGciOi...ature");
        assert!(!r.message.contains("payload"));
    }

    #[test]
    fn empty_variable_fails() {
        let r = evaluate_env_var("archon-server", "SUPABASE_URL", &output("  \n", 0));
        assert_eq!(r.status, CheckStatus::Fail);
        assert_eq!(r.message, "Not set or empty");
    }

    #[test]
    fn unset_variable_fails() {
        let r = evaluate_env_var("archon-server", "SUPABASE_URL", &output("", 1));
        assert_eq!(r.status, CheckStatus::Fail);
        assert!(r.remedy.is_some());
    }

    #[test]
    fn short_secret_is_fully_masked() {
        assert_eq!(redact("abc123"), "***");
    }

    #[test]
    fn secret_markers() {
        assert!(is_secret("SUPABASE_SERVICE_KEY"));
        assert!(is_secret("jwt_secret"));
        assert!(!is_secret("SUPABASE_URL"));
    }
}
