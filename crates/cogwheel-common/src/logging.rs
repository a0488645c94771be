//! Structured logging infrastructure for Cogwheel

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cogwheel_session=trace")
    pub level: String,
    /// Whether to emit one JSON object per event
    pub json_format: bool,
    /// Whether to enable pretty multi-line formatting with colors
    pub pretty_format: bool,
    /// Optional file path for log output (rotated daily)
    pub file_path: Option<String>,
    /// Whether to include span open/close events in the output
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(config: &LoggingConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(config.include_targets)
        .with_span_events(span_events);

    if config.json_format {
        layer.json().boxed()
    } else if config.pretty_format {
        layer.pretty().boxed()
    } else {
        layer.compact().boxed()
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// When a file path is configured the returned guard must be kept alive for
/// the lifetime of the process, otherwise buffered lines are lost.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;

    let (layer, guard) = match &config.file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map_or_else(|| "cogwheel.log".into(), |name| name.to_os_string());

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt_layer(config, writer, false), Some(guard))
        }
        None => (fmt_layer(config, std::io::stdout, !config.json_format), None),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init()?;

    Ok(guard)
}

/// Initialize logging for development (pretty, debug level)
pub fn init_dev_logging() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>>
{
    init_logging(&LoggingConfig {
        level: "debug".to_string(),
        pretty_format: true,
        include_spans: true,
        ..LoggingConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
        assert!(!config.pretty_format);
        assert!(config.file_path.is_none());
        assert!(!config.include_spans);
        assert!(config.include_targets);
    }
}
