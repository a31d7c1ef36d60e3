use crate::config::LogSettings;
use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Sends `tracing` output to the configured log file. The terminal belongs
/// to the board, so nothing is written to stdout or stderr.
///
/// `RUST_LOG` takes precedence over `log.level`. Keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init(settings: &LogSettings) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(log_file(settings)?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to init subscriber")?;

    Ok(guard)
}

fn log_file(settings: &LogSettings) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&settings.file)
        .build(&settings.directory)
        .with_context(|| {
            format!(
                "Failed to open log file {}",
                settings.directory.join(&settings.file).display()
            )
        })
}
