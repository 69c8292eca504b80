use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::config::LoggerConfig;
use crate::error::{ElogError, Result};
use crate::flush::{FlushState, FlushTask};
use crate::loggable::Loggable;
use crate::severity::SeverityGate;
use crate::sink::FileSink;

/// Lifecycle of a [`Logger`].
///
/// `NotInitialized -> Initializing -> Ready -> CleaningUp -> NotInitialized`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoggerState {
    NotInitialized = 0,
    Initializing = 1,
    Ready = 2,
    CleaningUp = 3,
}

impl LoggerState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LoggerState::NotInitialized,
            1 => LoggerState::Initializing,
            2 => LoggerState::Ready,
            _ => LoggerState::CleaningUp,
        }
    }
}

/// Asynchronous text logger backed by a fixed record pool.
///
/// Producers call [`Logger::log`] (usually through the [`elog!`](crate::elog)
/// macros) from any number of threads. The call checks the severity gate,
/// claims a record, copies the values into it and wakes the flush thread;
/// timestamp formatting, rendering and file I/O all happen on that thread.
///
/// `init` and `cleanup` are first-caller-wins: calling `init` on a running
/// logger, or `cleanup` on a stopped one, does nothing. A logger can be
/// initialized again after `cleanup`. Dropping a running logger cleans it up.
///
/// # Examples
///
/// ```
/// use elog::{elog_info, Logger, LoggerConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("app.log");
///
/// let logger = Logger::new();
/// logger.init(LoggerConfig::new(&path)).unwrap();
/// elog_info!(logger, "answer=", 42, " ratio=", 0.5).unwrap();
/// logger.cleanup();
///
/// let text = std::fs::read_to_string(&path).unwrap();
/// assert!(text.ends_with("(INFO) answer=42 ratio=0.5\n"));
/// ```
pub struct Logger {
    state: AtomicU8,
    gate: SeverityGate,
    engine: RwLock<Option<FlushTask>>,
}

lazy_static! {
    static ref GLOBAL: Logger = Logger::new();
}

/// Process-wide logger for call sites that do not carry their own instance.
///
/// It is never dropped, so call [`Logger::cleanup`] before the process exits
/// to flush what is still pending.
pub fn global() -> &'static Logger {
    &GLOBAL
}

impl Logger {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LoggerState::NotInitialized as u8),
            gate: SeverityGate::default(),
            engine: RwLock::new(None),
        }
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoggerState::Ready
    }

    fn transition(&self, from: LoggerState, to: LoggerState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Opens the sink, allocates the pool and starts the flush thread.
    ///
    /// Does nothing unless the logger is `NotInitialized`. On error the
    /// logger is left `NotInitialized`.
    ///
    /// On success the severity mask becomes `config.level_mask`, replacing
    /// anything set earlier with [`Logger::set_level`].
    pub fn init(&self, config: LoggerConfig) -> Result<()> {
        if !self.transition(LoggerState::NotInitialized, LoggerState::Initializing) {
            tracing::debug!(state = ?self.state(), "init ignored: logger not idle");
            return Ok(());
        }

        let started = FileSink::open(&config.path, config.append).and_then(|sink| {
            let state = Arc::new(FlushState::new(&config, sink));
            FlushTask::spawn(state)
        });
        match started {
            Ok(task) => {
                *self.engine.write() = Some(task);
                self.gate.set_level(config.level_mask);
                self.state
                    .store(LoggerState::Ready as u8, Ordering::Release);
                tracing::debug!(
                    path = %config.path.display(),
                    order = ?config.order,
                    pool_size = config.pool_size,
                    "logger ready"
                );
                Ok(())
            }
            Err(e) => {
                self.state
                    .store(LoggerState::NotInitialized as u8, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Stops the flush thread after its final pass and releases the pool
    /// and the sink.
    ///
    /// Does nothing unless the logger is `Ready`. Waits for logging calls
    /// already in progress.
    pub fn cleanup(&self) {
        if !self.transition(LoggerState::Ready, LoggerState::CleaningUp) {
            return;
        }
        let task = self.engine.write().take();
        if let Some(task) = task {
            task.stop();
        }
        self.state
            .store(LoggerState::NotInitialized as u8, Ordering::Release);
        tracing::debug!("logger cleaned up");
    }

    /// Logs `values` at `severity`.
    ///
    /// The severity gate is checked before the lifecycle state: a disabled
    /// severity returns `Ok` without touching the pool, even when the logger
    /// is not `Ready`. An enabled severity on a logger that is not `Ready`
    /// fails with [`ElogError::Uninitialized`].
    ///
    /// When the pool is full this call yields and retries until the flush
    /// thread frees a record; values that do not fit in the record are
    /// dropped. The call holds a shared read guard on the running engine
    /// so that `cleanup` waits for it.
    pub fn log(&self, severity: u8, values: &[&dyn Loggable]) -> Result<()> {
        if !self.gate.enabled(severity) {
            return Ok(());
        }
        if !self.is_ready() {
            return Err(ElogError::Uninitialized);
        }
        let engine = self.engine.read();
        let state = engine.as_ref().ok_or(ElogError::Uninitialized)?.state();
        state.pool().acquire().publish(severity, values);
        state.notify();
        Ok(())
    }

    pub fn get_level(&self) -> u8 {
        self.gate.level()
    }

    pub fn set_level(&self, mask: u8) {
        self.gate.set_level(mask);
    }

    /// Rotates the log file now: `<path>.N` becomes `<path>.N+1`, the active
    /// file becomes `<path>.0` and a fresh file is opened at `<path>`.
    pub fn rotate(&self) -> Result<()> {
        if !self.is_ready() {
            return Err(ElogError::Uninitialized);
        }
        let engine = self.engine.read();
        let state = engine.as_ref().ok_or(ElogError::Uninitialized)?.state();
        let mut sink = state.sink().lock();
        sink.rotate()
    }

    /// Records currently claimed or waiting to be flushed.
    pub fn pool_occupancy(&self) -> Option<usize> {
        let engine = self.engine.read();
        engine.as_ref().map(|task| task.state().pool().occupied())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.cleanup();
    }
}
