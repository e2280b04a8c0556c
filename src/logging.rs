use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

// Interactive output shares the terminal with stderr, so only warnings by default.
const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_LOG_FILE_PATH: &str = "logs/yosh.log";
const FALLBACK_LOG_FILE_NAME: &str = "yosh.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

impl LogOutput {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    output: LogOutput,
    file_path: PathBuf,
}

impl LogSettings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            format: parse_log_format(get_var("LOG_FORMAT").as_deref()),
            output: parse_log_output(get_var("LOG_OUTPUT").as_deref()),
            file_path: parse_log_file_path(get_var("LOG_FILE_PATH").as_deref()),
        }
    }
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("file") => LogOutput::File,
        Some("both") => LogOutput::Both,
        _ => LogOutput::Stderr,
    }
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH))
}

fn open_rolling_file(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new(FALLBACK_LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer);
    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

fn install_with_file(settings: &LogSettings) -> (InitResult, Option<WorkerGuard>) {
    let include_stderr = settings.output == LogOutput::Both;

    let (file_writer, guard) = match open_rolling_file(&settings.file_path) {
        Ok(opened) => opened,
        Err(err) => {
            eprintln!(
                "yosh: failed to initialize LOG_OUTPUT={} at '{}': {}; {}",
                settings.output.as_str(),
                settings.file_path.display(),
                err,
                if include_stderr {
                    "using stderr only"
                } else {
                    "using stderr instead"
                }
            );
            return (
                install(settings.format, BoxMakeWriter::new(std::io::stderr)),
                None,
            );
        }
    };

    let writer = if include_stderr {
        BoxMakeWriter::new(std::io::stderr.and(file_writer))
    } else {
        BoxMakeWriter::new(file_writer)
    };
    (install(settings.format, writer), Some(guard))
}

/// Installs the global tracing subscriber from `RUST_LOG`, `LOG_FORMAT`,
/// `LOG_OUTPUT` and `LOG_FILE_PATH`.
///
/// Hold the returned guard until exit; dropping it flushes buffered file logs.
#[must_use]
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());
    let (result, guard) = match settings.output {
        LogOutput::Stderr => (
            install(settings.format, BoxMakeWriter::new(std::io::stderr)),
            None,
        ),
        LogOutput::File | LogOutput::Both => install_with_file(&settings),
    };
    if let Err(err) = result {
        eprintln!("yosh: failed to install log subscriber: {}", err);
    }
    guard
}
