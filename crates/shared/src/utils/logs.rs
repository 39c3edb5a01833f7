use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use std::path::Path;
use tracing_appender::{
    non_blocking,
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. Keep the returned guard alive for as long
/// as the file log should be flushed.
pub fn init_logger(
    sdk_logger_provider: SdkLoggerProvider,
    component: &str,
    is_dev: bool,
    enable_file_log: bool,
) -> Option<WorkerGuard> {
    let (file_layer, guard) = if enable_file_log {
        let log_dir = if is_dev { "./logs" } else { "/var/log/app" };
        let (file_writer, guard) = file_writer(Path::new(log_dir), component);

        let layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .json()
            .with_filter(EnvFilter::new("info"));

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let default_console = if is_dev { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_console));

    let console_layer = fmt::layer()
        .pretty()
        .with_thread_names(true)
        .with_ansi(is_dev)
        .with_filter(console_filter);

    let otel_filter =
        EnvFilter::new("info,hyper=off,opentelemetry=off,tonic=off,h2=off,reqwest=off");

    let otel_layer = OpenTelemetryTracingBridge::new(&sdk_logger_provider).with_filter(otel_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(otel_layer)
        .init();

    guard
}

/// Daily-rotated `portal_{component}.log` in `log_dir`, written off-thread.
fn file_writer(log_dir: &Path, component: &str) -> (NonBlocking, WorkerGuard) {
    let file_name = format!("portal_{component}.log");
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
    non_blocking(file_appender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_writer_flushes_into_component_log() {
        let dir = std::env::temp_dir().join(format!("portal-logs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let (mut writer, guard) = file_writer(&dir, "test");
        writer.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        drop(guard);

        let written: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("portal_test.log"))
            .collect();
        assert_eq!(written.len(), 1);

        let contents = std::fs::read_to_string(written[0].path()).unwrap();
        assert!(contents.contains("hello"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
