//! Process logging bootstrap.
//!
//! # Responsibility
//! - Start the `log` backend once per process, writing to stderr or to
//!   size-rotated files in one directory.
//! - Log panics as single `event=panic` records before the default hook runs.
//!
//! # Invariants
//! - Events are single-line `key=value` records; request bodies are never
//!   logged.
//! - A second `init_logging` call with the same level and target is a no-op;
//!   a different one is rejected and the running logger is kept.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "orgchart";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_MAX_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Absolute directory holding `orgchart*.log` files.
    Directory(PathBuf),
}

impl LogTarget {
    /// Builds a target from an optional directory setting.
    ///
    /// `None` or a blank value selects stderr; anything else must be an
    /// absolute path.
    pub fn from_dir(dir: Option<&str>) -> Result<Self, LoggingError> {
        let Some(raw) = dir.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::Stderr);
        };
        let path = PathBuf::from(raw);
        if !path.is_absolute() {
            return Err(LoggingError::RelativeLogDir(path));
        }
        Ok(Self::Directory(path))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeLogDir(PathBuf),
    CreateLogDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with a different level or target.
    AlreadyStarted {
        active: String,
        requested: String,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeLogDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateLogDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed to start: {err}"),
            Self::AlreadyStarted { active, requested } => write!(
                f,
                "logging already started as {active}; cannot restart as {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateLogDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts process logging at `level` (case-insensitive `log` level name).
///
/// # Errors
/// - `UnknownLevel` for names `log::LevelFilter` does not accept.
/// - `CreateLogDir` / `Backend` when the backend cannot start.
/// - `AlreadyStarted` when called again with a different level or target.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let active = ACTIVE.get_or_try_init(|| start(level, target.clone()))?;

    if active.level != level || active.target != target {
        return Err(LoggingError::AlreadyStarted {
            active: describe(active.level, &active.target),
            requested: describe(level, &target),
        });
    }
    Ok(())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    raw.trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::UnknownLevel(raw.trim().to_string()))
}

fn start(level: LevelFilter, target: LogTarget) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::with(LogSpecification::builder().default(level).build());
    let logger = match &target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateLogDir {
                dir: dir.clone(),
                source,
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
    let handle = logger.start().map_err(LoggingError::Backend)?;

    install_panic_hook();
    info!(
        "event=logging_start module=core status=ok level={} target={} version={}",
        level,
        target,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target,
        _handle: handle,
    })
}

fn describe(level: LevelFilter, target: &LogTarget) -> String {
    format!("level={level} target={target}")
}

fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            error!(
                "event=panic module=core status=error location={} payload={}",
                location,
                one_line(panic_message(info.payload()), PANIC_PAYLOAD_MAX_CHARS)
            );
            previous(info);
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Replaces control characters with spaces and caps the length.
fn one_line(text: &str, max_chars: usize) -> String {
    let mut line: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if text.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
