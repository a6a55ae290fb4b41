use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter { value: String, source: ParseError },
    #[error("cannot open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("logging error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// The TUI owns the terminal; without a log file nothing is written.
    Off,
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, target: &LogTarget) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|source| LoggingError::EnvFilter {
            value: level.to_string(),
            source,
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(LoggingError::Subscriber),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(LoggingError::Subscriber)
        }
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LoggingError> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::File {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopenable_log_file_is_reported() {
        let err = open_log_file(Path::new("/definitely/not/a/dir/app.log")).unwrap_err();
        assert!(err.to_string().starts_with("cannot open log file"));
    }

    #[test]
    fn off_target_installs_nothing() {
        assert!(init("info", &LogTarget::Off).is_ok());
    }
}
