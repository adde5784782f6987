use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn severity(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    fn from_severity(severity: u8) -> Self {
        match severity {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        write!(f, "{}", label)
    }
}

type Logger = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

// Debug tracing is opt-in; everything else is on by default.
static MAX_LEVEL: AtomicU8 = AtomicU8::new(2);

fn default_logger(level: LogLevel, message: &str) {
    eprintln!("matchview [{}] {}", level, message);
}

fn logger_cell() -> &'static Mutex<Logger> {
    static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();
    LOGGER.get_or_init(|| Mutex::new(Box::new(default_logger)))
}

/// Replaces the process-wide log sink; the GUI routes this into its own
/// status surfaces.
pub fn set_logger(logger: impl Fn(LogLevel, &str) + Send + Sync + 'static) {
    let mut guard = match logger_cell().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Box::new(logger);
}

/// Raises or lowers the verbosity ceiling. Messages above the ceiling are
/// dropped before reaching the sink.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level.severity(), Ordering::Relaxed);
}

pub fn max_level() -> LogLevel {
    LogLevel::from_severity(MAX_LEVEL.load(Ordering::Relaxed))
}

fn enabled(level: LogLevel, ceiling: LogLevel) -> bool {
    level.severity() <= ceiling.severity()
}

pub fn log(level: LogLevel, message: impl AsRef<str>) {
    if !enabled(level, max_level()) {
        return;
    }
    let guard = match logger_cell().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    (guard)(level, message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    log(LogLevel::Error, message);
}

pub fn warn(message: impl AsRef<str>) {
    log(LogLevel::Warn, message);
}

pub fn info(message: impl AsRef<str>) {
    log(LogLevel::Info, message);
}

pub fn debug(message: impl AsRef<str>) {
    log(LogLevel::Debug, message);
}
