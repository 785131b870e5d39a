//! Logging bootstrap for the client process.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize tracing for the process.
///
/// Verbosity seeds the default level; the `LOG` environment variable
/// overrides it with a full filter directive. Output goes to stderr in the
/// configured format.
pub fn init(logging: &LoggingConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(logging.verbosity).into())
        .with_env_var("LOG")
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn level_from_verbosity(verbosity: u8) -> tracing::metadata::LevelFilter {
    match verbosity {
        0 => tracing::metadata::LevelFilter::ERROR,
        1 => tracing::metadata::LevelFilter::INFO,
        _ => tracing::metadata::LevelFilter::DEBUG,
    }
}
