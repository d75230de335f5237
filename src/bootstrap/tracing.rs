//! Tracing configuration for company-apply
//!
//! - **Environment filter**: respects `RUST_LOG`, debug in dev builds, info otherwise
//! - **stdout**: human readable, `ChronoUtc` timestamps
//! - **file**: daily rolling file under `<data_dir>/logs`, non-blocking

use std::{fs, io, path::Path};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry, EnvFilter};

const LOG_FILE_PREFIX: &str = "company-apply.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives when `RUST_LOG` is unset.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        level.to_string(),
        format!("ca_app={level}"),
        format!("ca_infra={level}"),
        "hyper_util=warn".to_string(),
        "reqwest=warn".to_string(),
    ]
}

/// Initialize the global subscriber. Call once, before any command runs.
///
/// When the log directory cannot be prepared, file logging is skipped and
/// only stdout is used.
///
/// The returned guard flushes the file writer when dropped; hold it until
/// the command has finished.
///
/// # Errors
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber(logs_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    let (file_writer, guard) = match logs_dir.map(build_file_writer) {
        Some(Ok((writer, guard))) => (Some(writer), Some(guard)),
        Some(Err(err)) => {
            eprintln!("Failed to initialize file logging, falling back to stdout: {err}");
            (None, None)
        }
        None => (None, None),
    };

    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(BoxMakeWriter::new(io::stdout));

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn build_file_writer(logs_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(file_appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_directives() {
        let dev_directives = build_filter_directives(true);
        assert!(dev_directives.contains(&"debug".to_string()));
        assert!(dev_directives.contains(&"ca_infra=debug".to_string()));

        let prod_directives = build_filter_directives(false);
        assert!(prod_directives.contains(&"info".to_string()));
        assert!(prod_directives.contains(&"ca_app=info".to_string()));
        assert!(prod_directives.contains(&"reqwest=warn".to_string()));
    }

    #[test]
    fn test_dropping_guard_flushes_queued_lines() {
        use std::io::Write;

        let temp = tempfile::TempDir::new().unwrap();
        let logs_dir = temp.path().join("logs");

        let (mut writer, guard) = build_file_writer(&logs_dir).unwrap();
        writer
            .write_all(b"cleanup incomplete; success is shown regardless\n")
            .unwrap();
        drop(guard);

        let content: String = fs::read_dir(&logs_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            })
            .map(|path| fs::read_to_string(path).unwrap())
            .collect();
        assert!(content.contains("cleanup incomplete"), "got: {content:?}");
    }
}
