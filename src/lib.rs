//! # elog
//!
//! A low-overhead logging engine for latency-sensitive multithreaded code.
//!
//! A logging call never formats, allocates or touches the file. It:
//!
//! * checks the severity gate (one relaxed load; disabled calls stop here),
//! * claims a fixed 512-byte record from a shared pool with a single CAS,
//! * copies the values into the record as tagged binary scalars and short
//!   text fragments,
//! * marks the record filled and wakes the flush thread.
//!
//! Besides the slot's status word, every enabled call touches one more
//! shared word: the reader count of the lock that keeps the flush engine
//! alive until in-flight calls finish. Under heavy contention from many
//! cores this counter, not the pool, is the first shared cache line.
//!
//! The flush thread renders filled records as text lines, either in slot
//! order or sorted by capture time, writes them to the log file and returns
//! the records to the pool. The log file can be rotated on demand or when
//! it grows past a configured size.
//!
//! ## Main Components
//!
//! * `Logger`: lifecycle, severity control and the logging entry point
//! * `record_pool`: wait-free slot claiming with move-only ownership handles
//! * `record`: the fixed-size record and its tagged value buffer
//! * `flush`: the background flush task, unordered and ordered passes
//! * `rotation`: renumbering of rotated log files
//!
//! ## Quick Start
//!
//! ```
//! use elog::{elog_info, elog_err, severity, Logger, LoggerConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::new();
//! logger
//!     .init(LoggerConfig::new(dir.path().join("app.log")).ordered(true))
//!     .unwrap();
//!
//! elog_info!(logger, "starting worker ", 3u8).unwrap();
//! logger.set_level(severity::ERR | severity::FATAL);
//! elog_info!(logger, "this is filtered out").unwrap();
//! elog_err!(logger, "queue depth ", 1024usize, " over limit").unwrap();
//!
//! logger.cleanup();
//! ```

pub mod config;
pub mod efficient_clock;
pub mod error;
pub mod flush;
pub mod log_value;
pub mod loggable;
pub mod logger;
pub mod record;
pub mod record_pool;
pub mod rotation;
pub mod severity;
pub mod sink;

pub use config::{FlushOrder, LoggerConfig};
pub use error::{ElogError, Result};
pub use log_value::LogValue;
pub use loggable::Loggable;
pub use logger::{global, Logger, LoggerState};
pub use record_pool::{RecordPool, RecordSlot};

/// Logs a sequence of values at the given severity.
///
/// Values are concatenated as-is when rendered, so put any spacing or
/// punctuation into the values themselves. Evaluates to
/// [`Result<()>`](crate::Result).
///
/// ```
/// # use elog::{elog, severity, Logger};
/// let logger = Logger::new();
/// // Not initialized yet.
/// assert!(elog!(logger, severity::INFO, "x=", 1).is_err());
/// ```
#[macro_export]
macro_rules! elog {
    ($logger:expr, $severity:expr $(, $arg:expr)* $(,)?) => {
        $logger.log($severity, &[$(&$arg as &dyn $crate::Loggable),*])
    };
}

#[macro_export]
macro_rules! elog_debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::elog!($logger, $crate::severity::DEBUG $(, $arg)*)
    };
}

#[macro_export]
macro_rules! elog_info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::elog!($logger, $crate::severity::INFO $(, $arg)*)
    };
}

#[macro_export]
macro_rules! elog_warn {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::elog!($logger, $crate::severity::WARN $(, $arg)*)
    };
}

#[macro_export]
macro_rules! elog_err {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::elog!($logger, $crate::severity::ERR $(, $arg)*)
    };
}

#[macro_export]
macro_rules! elog_fatal {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::elog!($logger, $crate::severity::FATAL $(, $arg)*)
    };
}
