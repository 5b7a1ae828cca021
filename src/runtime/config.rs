use std::time::Duration;

use crate::backend::{self, Backend};
use crate::exec::ShellExecutor;
use crate::runtime;

///////////////////////////////
/// Options shared by every subcommand. Built once in main and passed down.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub verbose: bool,
    pub log_level: Option<runtime::LogLevel>,

    /// Takes precedence over $CLUSTER_BACKEND and PATH probing
    pub backend: Option<String>,

    /// Deadline for every scheduler client call
    pub timeout: Option<Duration>,
}

impl Config {
    /// Resolve the backend once for this process.
    pub fn backend(&self) -> runtime::Result<Backend> {
        match &self.backend {
            Some(name) => name.parse(),
            None => backend::resolve_backend_once(),
        }
    }

    pub fn executor(&self) -> ShellExecutor {
        ShellExecutor::new().with_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_backend_wins() {
        let config = Config {
            backend: Some("Torque".to_string()),
            ..Default::default()
        };
        assert_eq!(config.backend().unwrap(), Backend::Torque);

        let config = Config {
            backend: Some("lsf".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.backend(),
            Err(runtime::Error::UnsupportedBackend { .. })
        ));
    }
}
