//! Targets and thresholds of the diagnostic battery.

use std::time::Duration;

/// An HTTP endpoint expected to answer `200`.
#[derive(Debug, Clone)]
pub struct HealthEndpoint {
    pub name: String,
    pub url: String,
}

/// Everything the checks inspect. [`Default`] describes a standard local
/// Archon deployment.
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Name prefix shared by all Archon containers.
    pub container_prefix: String,
    /// Container holding the backend server.
    pub server_container: String,
    /// `(container, variable)` pairs that must be set and non-empty.
    pub env_checks: Vec<(String, String)>,
    /// Containers whose recent logs are scanned.
    pub log_services: Vec<String>,
    pub log_tail_lines: u32,
    pub health_endpoints: Vec<HealthEndpoint>,
    pub cpu_warn_percent: f64,
    pub memory_warn_percent: f64,
    /// Timeout for every external command.
    pub command_timeout: Duration,
    /// Timeout for every HTTP probe.
    pub http_timeout: Duration,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        let server = "archon-server".to_string();
        Self {
            container_prefix: "archon-".into(),
            env_checks: ["SUPABASE_URL", "SUPABASE_SERVICE_KEY", "ARCHON_SERVER_PORT"]
                .into_iter()
                .map(|var| (server.clone(), var.to_string()))
                .collect(),
            log_services: vec![server.clone(), "archon-mcp".into(), "archon-ui".into()],
            log_tail_lines: 100,
            health_endpoints: vec![
                HealthEndpoint {
                    name: "Archon Server".into(),
                    url: "http://localhost:8181/health".into(),
                },
                HealthEndpoint {
                    name: "Archon UI".into(),
                    url: "http://localhost:3737".into(),
                },
            ],
            cpu_warn_percent: 80.0,
            memory_warn_percent: 90.0,
            command_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(3),
            server_container: server,
        }
    }
}
