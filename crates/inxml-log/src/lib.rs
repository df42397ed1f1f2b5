//! A minimal, zero-dependency logging crate for the `inxml` workspace.
//!
//! The parser and memory pool are latency-sensitive, so logging is reserved
//! for cold paths (pool growth, parse failures) and is compiled down to a
//! single atomic load when the level gate is closed.
//!
//! The minimum level can be set programmatically or through the `INXML_LOG`
//! environment variable (`error`, `warn`, `info`, `debug`, `trace`), which is
//! consulted once, on first use of the logger.
//!
//! # Example
//!
//! ```
//! use inxml_log::{Level, debug, warn};
//!
//! inxml_log::set_level(Level::Debug);
//!
//! let block_size = 65536;
//! debug!("pool grew by {} bytes", block_size);
//! warn!("buffer is not NUL-terminated");
//! ```

use std::fmt::Arguments;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log levels, ordered from most severe (`Error`) to least severe (`Trace`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Critical failures.
    Error = 0,
    /// Potentially harmful situations.
    Warn = 1,
    /// Informational messages.
    Info = 2,
    /// Diagnostic detail.
    Debug = 3,
    /// Finest-grained tracing.
    Trace = 4,
}

impl Level {
    /// Returns the display tag for this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// Parses a level name, case-insensitively.
    ///
    /// ```
    /// use inxml_log::Level;
    ///
    /// assert_eq!(Level::parse("trace"), Some(Level::Trace));
    /// assert_eq!(Level::parse("WARN"), Some(Level::Warn));
    /// assert_eq!(Level::parse("loud"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Level::Error),
            "WARN" => Some(Level::Warn),
            "INFO" => Some(Level::Info),
            "DEBUG" => Some(Level::Debug),
            "TRACE" => Some(Level::Trace),
            _ => None,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

/// The process-wide logger: a single atomic level gate.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    fn new(level: Level) -> Self {
        Logger { level: AtomicU8::new(level as u8) }
    }

    /// Sets the minimum level; messages below it are discarded.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Returns `true` if a message at `level` would be emitted.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, initializing it on first use.
///
/// The initial level comes from the `INXML_LOG` environment variable when it
/// names a valid level, and defaults to [`Level::Warn`] otherwise.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        let level = std::env::var("INXML_LOG")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Warn);
        Logger::new(level)
    })
}

/// Sets the minimum level of the global logger.
pub fn set_level(level: Level) {
    logger().set_level(level);
}

/// Internal sink called by the macros once the level gate is open.
#[doc(hidden)]
pub fn __emit(level: Level, target: &str, args: Arguments) {
    eprintln!("[{}] {}: {}", level.as_str(), target, args);
}

/// Logs a message at an explicit level, tagging it with the calling module.
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {
        if $crate::logger().enabled($level) {
            $crate::__emit($level, module_path!(), format_args!($($arg)*));
        }
    };
}

/// Logs a message at the `Error` level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::log!(level: $crate::Level::Error, $($arg)*) };
}

/// Logs a message at the `Warn` level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::log!(level: $crate::Level::Warn, $($arg)*) };
}

/// Logs a message at the `Info` level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::log!(level: $crate::Level::Info, $($arg)*) };
}

/// Logs a message at the `Debug` level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::log!(level: $crate::Level::Debug, $($arg)*) };
}

/// Logs a message at the `Trace` level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::log!(level: $crate::Level::Trace, $($arg)*) };
}
