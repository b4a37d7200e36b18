use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn,docchat=info";
const DEFAULT_LOG_FILE_PATH: &str = "logs/docchat.log";
const DEFAULT_LOG_FILE_NAME: &str = "docchat.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File,
    Both,
}

impl LogTarget {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    target: LogTarget,
    file_path: PathBuf,
}

impl LogSettings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let format = match normalized(get_var("LOG_FORMAT")).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let target = match normalized(get_var("LOG_OUTPUT")).as_deref() {
            Some("file") => LogTarget::File,
            Some("both") => LogTarget::Both,
            _ => LogTarget::Stderr,
        };
        let file_path = get_var("LOG_FILE_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH));

        Self {
            format,
            target,
            file_path,
        }
    }
}

fn normalized(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_ascii_lowercase())
}

fn rolling_file_writer(path: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer);
    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

fn target_writer(settings: &LogSettings) -> (BoxMakeWriter, Option<WorkerGuard>) {
    if settings.target == LogTarget::Stderr {
        return (BoxMakeWriter::new(io::stderr), None);
    }

    match rolling_file_writer(&settings.file_path) {
        Ok((file_writer, guard)) => {
            let writer = if settings.target == LogTarget::Both {
                BoxMakeWriter::new(io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };
            (writer, Some(guard))
        }
        Err(err) => {
            let fallback = if settings.target == LogTarget::Both {
                "using stderr only"
            } else {
                "using stderr instead"
            };
            eprintln!(
                "docchat: failed to initialize LOG_OUTPUT={} at '{}': {}; {}",
                settings.target.as_str(),
                settings.file_path.display(),
                err,
                fallback
            );
            (BoxMakeWriter::new(io::stderr), None)
        }
    }
}

// Hold the returned guard until exit so buffered file output is flushed.
#[must_use]
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());
    let (writer, guard) = target_writer(&settings);

    // A subscriber installed earlier (tests, embedding) wins.
    install(settings.format, writer).ok().and(guard)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{DEFAULT_LOG_FILE_PATH, LogFormat, LogSettings, LogTarget};

    fn settings_from_pairs(pairs: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        LogSettings::from_env_with(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn defaults_to_pretty_stderr_and_default_path() {
        let settings = settings_from_pairs(&[]);
        assert_eq!(settings.format, LogFormat::Pretty);
        assert_eq!(settings.target, LogTarget::Stderr);
        assert_eq!(settings.file_path, PathBuf::from(DEFAULT_LOG_FILE_PATH));
    }

    #[test]
    fn accepts_json_and_targets_case_insensitively() {
        let settings = settings_from_pairs(&[("LOG_FORMAT", " JSON "), ("LOG_OUTPUT", "Both")]);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.target, LogTarget::Both);

        let settings = settings_from_pairs(&[("LOG_OUTPUT", "file")]);
        assert_eq!(settings.target, LogTarget::File);
    }

    #[test]
    fn unknown_values_fall_back_to_defaults() {
        let settings = settings_from_pairs(&[
            ("LOG_FORMAT", "xml"),
            ("LOG_OUTPUT", "syslog"),
            ("LOG_FILE_PATH", "   "),
        ]);
        assert_eq!(settings.format, LogFormat::Pretty);
        assert_eq!(settings.target, LogTarget::Stderr);
        assert_eq!(settings.file_path, PathBuf::from(DEFAULT_LOG_FILE_PATH));
    }

    #[test]
    fn explicit_file_path_is_preserved() {
        let settings = settings_from_pairs(&[("LOG_FILE_PATH", "custom/docchat.log")]);
        assert_eq!(settings.file_path, PathBuf::from("custom/docchat.log"));
    }
}
