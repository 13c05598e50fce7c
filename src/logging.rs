//! Logger construction.
//!
//! Log lines go to stdout and, when `LOG_PATH` is set, are appended to that
//! file as well. The filter comes from `LOG_LEVEL` and uses the `tracing`
//! directive syntax (`info`, `someip_tester=debug,warn`).

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Span;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use crate::config::{ConfigError, Environment, LOG_LEVEL, LogFormat};

/// Parse the `LOG_LEVEL` directive.
pub fn filter(environment: &Environment) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(&environment.log_level)
        .map_err(|err| ConfigError::Invalid(format!("{LOG_LEVEL}: {err}")))
}

/// Open the log file for appending, creating it and its parent directory.
pub fn open_log_file(path: &Path) -> Result<File, ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Fails if the filter or log file is invalid, or if a subscriber is already
/// installed.
pub fn init(environment: &Environment) -> Result<(), ConfigError> {
    let filter = filter(environment)?;
    let (writer, ansi) = match &environment.log_path {
        Some(path) => {
            let file = Arc::new(open_log_file(path)?);
            (BoxMakeWriter::new(std::io::stdout.and(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let installed = match environment.log_format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|err| ConfigError::Invalid(format!("logger: {err}")))
}

/// Root span carrying `LOG_NAME`; enter it for the lifetime of the process.
pub fn root_span(environment: &Environment) -> Span {
    tracing::info_span!("tester", name = %environment.log_name)
}
