use crate::infrastructure::error::ClientError;
use std::path::Path;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub const LOG_FILE_PREFIX: &str = "client";

/// Installs the global subscriber: stdout plus a daily file under `logs_dir`.
///
/// `RUST_LOG` takes precedence over `level` when set; see [`filter_directives`].
pub fn enable_logging(logs_dir: &Path, level: &str, show_std: bool) -> Result<(), ClientError> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(logs_dir)
        .map_err(|error| ClientError::InvalidConfig(format!("cannot open log directory: {error}")))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);
    let rust_log = std::env::var("RUST_LOG").ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter_directives(
            level,
            rust_log.as_deref(),
        )))
        .with_writer(stdout.and(appender))
        .try_init()
        .map_err(|error| ClientError::InvalidConfig(format!("logging already initialized: {error}")))
}

/// A bare level applies to this crate only. Full directives such as
/// `a=debug,b=info` are used as written.
pub fn filter_directives(level: &str, rust_log: Option<&str>) -> String {
    let level = rust_log
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(level);
    if level.contains('=') {
        level.to_string()
    } else {
        format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
    }
}

#[cfg(test)]
pub static TEST_LOGGING: std::sync::LazyLock<()> = std::sync::LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::level_filters::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_crate() {
        assert_eq!(filter_directives("info", None), "timemanager_client=info");
        assert_eq!(filter_directives("info", Some("debug")), "timemanager_client=debug");
    }

    #[test]
    fn full_directives_pass_through() {
        assert_eq!(
            filter_directives("info", Some("reqwest=debug,timemanager_client=trace")),
            "reqwest=debug,timemanager_client=trace"
        );
    }

    #[test]
    fn blank_rust_log_falls_back_to_level() {
        assert_eq!(filter_directives("warn", Some("  ")), "timemanager_client=warn");
    }
}
