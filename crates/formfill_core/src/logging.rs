//! Process-wide logging setup.
//!
//! The CLI logs to stderr by default; `--log-dir` switches to size-rotated
//! files. Events are `key=value` metadata lines and never carry member field
//! values. A second `init_logging` call with the same settings is a no-op,
//! with different settings an error.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "formfill";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SUMMARY_MAX_CHARS: usize = 160;
const LEVELS: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
];

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, leaving stdout for command output.
    Stderr,
    /// Size-rotated files in an absolute directory.
    Directory(PathBuf),
}

impl LogTarget {
    /// Builds a directory target; the path must be absolute and non-empty.
    pub fn directory(log_dir: &str) -> Result<Self, String> {
        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let path = Path::new(trimmed);
        if !path.is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
        }
        Ok(Self::Directory(path.to_path_buf()))
    }

    fn label(&self) -> String {
        match self {
            Self::Stderr => "stderr".to_string(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

struct ActiveLogger {
    level: &'static str,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts logging at `level` (`trace|debug|info|warn|error`) to `target`.
///
/// # Errors
/// - Unknown level, unusable directory or backend start failure.
/// - Logging already active with another level or target.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), String> {
    let level = parse_level(level)?;

    let active = ACTIVE.get_or_try_init(|| -> Result<ActiveLogger, String> {
        let handle = start_backend(level, &target)?;
        install_panic_hook();
        info!(
            "event=logging_init module=core status=ok level={} target={} os={} version={}",
            level,
            target.label(),
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION")
        );
        Ok(ActiveLogger {
            level,
            target: target.clone(),
            _handle: handle,
        })
    })?;

    if active.target != target {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active.target.label(),
            target.label()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{level}`",
            active.level
        ));
    }
    Ok(())
}

/// Returns `(level, target)` once logging is active.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.target.clone()))
}

/// Level used by the CLI when neither flag nor environment sets one.
pub fn default_log_level() -> &'static str {
    "warn"
}

fn parse_level(raw: &str) -> Result<&'static str, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .map(|(_, level)| *level)
        .ok_or_else(|| {
            format!("unsupported log level `{wanted}`; expected trace|debug|info|warn|error")
        })
}

fn start_backend(level: &'static str, target: &LogTarget) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let logger = match target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            one_line_prefix(&payload, PANIC_SUMMARY_MAX_CHARS)
        );
        chained(info);
    }));
}

/// Flattens `text` to one line and caps it at `max_chars`, marking cuts with `...`.
fn one_line_prefix(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    let mut out: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
