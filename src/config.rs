use std::path::PathBuf;
use std::time::Duration;

use crate::record_pool::DEFAULT_POOL_SIZE;
use crate::severity;

/// How the flush task orders the records of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushOrder {
    /// Render in slot order as found. Cheapest; no cross-record ordering.
    #[default]
    Unordered,
    /// Render everything captured before the pass started, oldest first.
    Ordered,
}

/// Settings for [`Logger::init`](crate::Logger::init).
///
/// ```
/// # use elog::{LoggerConfig, FlushOrder};
/// let config = LoggerConfig::new("app.log")
///     .ordered(true)
///     .with_pool_size(1024);
/// assert_eq!(config.order, FlushOrder::Ordered);
/// assert_eq!(config.pool_size, 1024);
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub path: PathBuf,
    pub order: FlushOrder,
    pub pool_size: usize,
    /// Upper bound on how long a filled record waits when no publish wakes
    /// the flush task.
    pub flush_interval: Duration,
    pub level_mask: u8,
    /// Rotate once the active file reaches this many bytes. `None` leaves
    /// rotation entirely to explicit [`Logger::rotate`](crate::Logger::rotate) calls.
    pub rotate_after_bytes: Option<u64>,
    /// Keep existing content of the active file instead of truncating it.
    pub append: bool,
}

impl LoggerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            order: FlushOrder::Unordered,
            pool_size: DEFAULT_POOL_SIZE,
            flush_interval: Duration::from_millis(250),
            level_mask: severity::ALL,
            rotate_after_bytes: None,
            append: false,
        }
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.order = if ordered {
            FlushOrder::Ordered
        } else {
            FlushOrder::Unordered
        };
        self
    }

    pub fn with_order(mut self, order: FlushOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    pub fn with_level(mut self, mask: u8) -> Self {
        self.level_mask = mask;
        self
    }

    pub fn with_rotation_threshold(mut self, bytes: u64) -> Self {
        self.rotate_after_bytes = Some(bytes);
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}
