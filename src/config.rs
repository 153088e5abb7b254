//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "MOLTBOOK_DATA_DIR";
pub const ENV_BASE_URL: &str = "MOLTBOOK_BASE_URL";
pub const ENV_LOG_FILE: &str = "MOLTBOOK_LOG_FILE";
pub const ENV_CLAIM_INTERVAL_MS: &str = "MOLTBOOK_CLAIM_INTERVAL_MS";
pub const ENV_DEBUG: &str = "MOLTBOOK_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub log_file: Option<PathBuf>,
    pub claim_interval: Option<Duration>,
    pub debug: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env_string_opt(ENV_DATA_DIR).map(PathBuf::from),
            base_url: env_string_opt(ENV_BASE_URL),
            log_file: env_string_opt(ENV_LOG_FILE).map(PathBuf::from),
            claim_interval: env_string_opt(ENV_CLAIM_INTERVAL_MS)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis),
            debug: env_flag(ENV_DEBUG),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const ALL_KEYS: [&str; 5] = [
        ENV_DATA_DIR,
        ENV_BASE_URL,
        ENV_LOG_FILE,
        ENV_CLAIM_INTERVAL_MS,
        ENV_DEBUG,
    ];

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    fn clear_all() -> Vec<EnvGuard> {
        ALL_KEYS
            .iter()
            .map(|key| set_env_guard(key, None))
            .collect()
    }

    #[test]
    fn unset_environment_gives_defaults() {
        let _lock = env_lock();
        let _guards = clear_all();

        assert_eq!(EnvConfig::from_env(), EnvConfig::default());
    }

    #[test]
    fn values_are_read_from_environment() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g1 = set_env_guard(ENV_DATA_DIR, Some("/tmp/molt"));
        let _g2 = set_env_guard(ENV_BASE_URL, Some("http://localhost:8080/api/v1"));
        let _g3 = set_env_guard(ENV_LOG_FILE, Some("/tmp/molt.log"));
        let _g4 = set_env_guard(ENV_CLAIM_INTERVAL_MS, Some("250"));
        let _g5 = set_env_guard(ENV_DEBUG, Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/molt")));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/api/v1"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/molt.log")));
        assert_eq!(config.claim_interval, Some(Duration::from_millis(250)));
        assert!(config.debug);
    }

    #[test]
    fn empty_or_invalid_values_are_ignored() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g1 = set_env_guard(ENV_DATA_DIR, Some("  "));
        let _g2 = set_env_guard(ENV_CLAIM_INTERVAL_MS, Some("soon"));
        let _g3 = set_env_guard(ENV_DEBUG, Some("true"));

        let config = EnvConfig::from_env();
        assert!(config.data_dir.is_none());
        assert!(config.claim_interval.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn zero_interval_is_ignored() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g = set_env_guard(ENV_CLAIM_INTERVAL_MS, Some("0"));

        assert!(EnvConfig::from_env().claim_interval.is_none());
    }
}
