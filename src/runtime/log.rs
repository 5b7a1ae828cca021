use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevel(pub log::LevelFilter);
impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" | "warning" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" | "none" => log::LevelFilter::Off,
            _ => return Err(format!("Invalid log level: {}", s)),
        };
        Ok(LogLevel(level))
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

/// Level used when neither --log-level nor RUST_LOG is given.
/// Quiet on success, one line per failure; verbose echoes every decision.
pub fn default_log_level(verbose: bool) -> LogLevel {
    if verbose {
        LogLevel(log::LevelFilter::Info)
    } else {
        LogLevel(log::LevelFilter::Warn)
    }
}

/// Install env_logger on stderr. An explicit level wins over RUST_LOG.
pub fn setup_global_logger(log_level: Option<LogLevel>, verbose: bool) {
    let mut builder = match log_level {
        Some(level) => {
            let mut b = env_logger::Builder::new();
            b.filter_level(level.into());
            b
        }
        None => {
            let default = default_log_level(verbose).0.to_string();
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        }
    };

    builder
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });

    // Ignore a second init (tests)
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels() {
        assert_eq!(
            "WARNING".parse::<LogLevel>().unwrap(),
            LogLevel(log::LevelFilter::Warn)
        );
        assert_eq!(
            "debug".parse::<LogLevel>().unwrap(),
            LogLevel(log::LevelFilter::Debug)
        );
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn verbose_raises_default() {
        assert_eq!(default_log_level(false).0, log::LevelFilter::Warn);
        assert_eq!(default_log_level(true).0, log::LevelFilter::Info);
    }
}
