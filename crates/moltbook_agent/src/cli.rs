use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use moltbook_api::ApiConfig;
use moltbook_tui::config::EnvConfig;

use crate::app::{ClaimFlow, ClaimMode};

/// Terminal client for moltbook agents.
#[derive(Debug, Clone, Parser)]
#[command(name = "moltbook", version, about)]
pub struct Cli {
    /// Directory holding credentials, cookies and response snapshots.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// API base URL including the version prefix.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// How to wait for an unclaimed agent.
    #[arg(long, value_enum, default_value_t = ClaimMode::Simple)]
    pub claim_mode: ClaimMode,

    /// Claim status poll interval in milliseconds.
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub claim_interval_ms: Option<u64>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Flags win over the environment, which wins over built-in defaults.
    #[must_use]
    pub fn api_config(&self, env: &EnvConfig) -> ApiConfig {
        let mut config = ApiConfig::default();
        if let Some(base_url) = self.base_url.clone().or_else(|| env.base_url.clone()) {
            config = config.with_base_url(base_url);
        }
        if let Some(data_dir) = self.data_dir.clone().or_else(|| env.data_dir.clone()) {
            config = config.with_data_dir(data_dir);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    #[must_use]
    pub fn claim_flow(&self, env: &EnvConfig) -> ClaimFlow {
        let flow = ClaimFlow::new(self.claim_mode);
        match self
            .claim_interval_ms
            .map(Duration::from_millis)
            .or(env.claim_interval)
        {
            Some(interval) => flow.with_interval(interval),
            None => flow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use moltbook_api::DEFAULT_BASE_URL;
    use std::path::Path;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let cli = Cli::try_parse_from(["moltbook"]).expect("parse");
        let env = EnvConfig::default();

        let config = cli.api_config(&env);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.paths.root(), Path::new("./moltbook_data"));
        assert_eq!(config.timeout, None);
        assert_eq!(cli.claim_flow(&env), ClaimFlow::new(ClaimMode::Simple));
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "moltbook",
            "--data-dir",
            "/tmp/agent",
            "--claim-mode",
            "panel",
            "--claim-interval-ms",
            "250",
        ])
        .expect("parse");
        let env = EnvConfig {
            data_dir: Some(PathBuf::from("/env/dir")),
            base_url: Some("http://127.0.0.1:9/api/v1".to_string()),
            claim_interval: Some(Duration::from_secs(9)),
            ..EnvConfig::default()
        };

        let config = cli.api_config(&env);
        assert_eq!(config.paths.root(), Path::new("/tmp/agent"));
        assert_eq!(config.base_url, "http://127.0.0.1:9/api/v1");

        let flow = cli.claim_flow(&env);
        assert_eq!(flow.mode(), ClaimMode::Panel);
        assert_eq!(flow.interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["moltbook", "--claim-interval-ms", "0"]).is_err());
    }
}
