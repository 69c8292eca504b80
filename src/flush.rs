use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::config::{FlushOrder, LoggerConfig};
use crate::efficient_clock;
use crate::error::{ElogError, Result};
use crate::record::RecordBody;
use crate::record_pool::{Drain, RecordPool};
use crate::sink::FileSink;

/// Destination a flush pass renders records into.
pub trait RenderTarget {
    fn write_record(&mut self, body: &RecordBody) -> io::Result<()>;
}

impl RenderTarget for FileSink {
    fn write_record(&mut self, body: &RecordBody) -> io::Result<()> {
        FileSink::write_record(self, body)
    }
}

impl RenderTarget for Vec<u8> {
    fn write_record(&mut self, body: &RecordBody) -> io::Result<()> {
        body.render(self)
    }
}

/// Outcome of one flush pass.
#[derive(Debug, Default)]
pub struct PassStats {
    /// Records rendered and released, failed writes included.
    pub rendered: usize,
    /// Records whose rendering hit an I/O error.
    pub failed: usize,
    pub last_error: Option<io::Error>,
}

impl PassStats {
    fn record(&mut self, result: io::Result<()>) {
        self.rendered += 1;
        if let Err(e) = result {
            self.failed += 1;
            self.last_error = Some(e);
        }
    }
}

/// Renders every filled record in slot order and frees it.
///
/// The pool hint is moved to the last slot freed so producers start their
/// next scan where free slots are most likely.
pub fn flush_unordered<T: RenderTarget + ?Sized>(drain: &mut Drain<'_>, target: &mut T) -> PassStats {
    let mut stats = PassStats::default();
    let mut last = None;
    for index in 0..drain.len() {
        let Some(record) = drain.take(index) else {
            continue;
        };
        stats.record(target.write_record(record.body()));
        record.release();
        last = Some(index);
    }
    if let Some(index) = last {
        drain.pool().set_hint(index);
    }
    stats
}

/// Renders the filled records captured at or before `cutoff`, oldest first,
/// and frees them. Records captured later wait for a following pass.
///
/// Ties on capture time are broken by slot index. `batch` is scratch space
/// reused across passes.
pub fn flush_ordered<T: RenderTarget + ?Sized>(
    drain: &mut Drain<'_>,
    target: &mut T,
    cutoff: u64,
    batch: &mut Vec<(u64, usize)>,
) -> PassStats {
    batch.clear();
    batch.extend(
        (0..drain.len())
            .filter_map(|index| drain.filled_at(index).map(|at| (at, index)))
            .filter(|&(at, _)| at <= cutoff),
    );
    batch.sort_unstable();

    let mut stats = PassStats::default();
    for &(_, index) in batch.iter() {
        let Some(record) = drain.take(index) else {
            continue;
        };
        stats.record(target.write_record(record.body()));
        record.release();
    }
    stats
}

/// Wake-up primitive between producers and the flush task.
///
/// The task checks `pending` under `lock` before parking and skips its sleep
/// while it is set, so publishes made during a pass trigger another pass at
/// once. Only the producer that raises `pending` takes the lock to notify;
/// it either finds the task parked or is seen by its next check. Producers
/// arriving while `pending` is already set touch neither lock nor condvar.
struct Wakeup {
    lock: Mutex<()>,
    cond: Condvar,
    pending: AtomicBool,
}

/// State shared between the logger and its flush thread.
pub struct FlushState {
    pool: RecordPool,
    sink: Mutex<FileSink>,
    wakeup: Wakeup,
    stop: AtomicBool,
    order: FlushOrder,
    interval: Duration,
    rotate_after_bytes: Option<u64>,
}

impl FlushState {
    pub fn new(config: &LoggerConfig, sink: FileSink) -> Self {
        Self {
            pool: RecordPool::new(config.pool_size),
            sink: Mutex::new(sink),
            wakeup: Wakeup {
                lock: Mutex::new(()),
                cond: Condvar::new(),
                pending: AtomicBool::new(false),
            },
            stop: AtomicBool::new(false),
            order: config.order,
            interval: config.flush_interval,
            rotate_after_bytes: config.rotate_after_bytes,
        }
    }

    pub fn pool(&self) -> &RecordPool {
        &self.pool
    }

    pub fn sink(&self) -> &Mutex<FileSink> {
        &self.sink
    }

    pub fn order(&self) -> FlushOrder {
        self.order
    }

    /// Wakes the flush task.
    #[inline]
    pub fn notify(&self) {
        let wakeup = &self.wakeup;
        // An RMW, not a load: a stale `true` could miss the task's reset.
        if wakeup.pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = wakeup.lock.lock();
        wakeup.cond.notify_one();
    }

    fn request_stop(&self) {
        {
            let _guard = self.wakeup.lock.lock();
            self.stop.store(true, Ordering::Release);
        }
        self.wakeup.cond.notify_all();
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn wait(&self) {
        let mut guard = self.wakeup.lock.lock();
        if self.stopping() || self.wakeup.pending.swap(false, Ordering::AcqRel) {
            return;
        }
        if !self.wakeup.cond.wait_for(&mut guard, self.interval).timed_out() {
            self.wakeup.pending.swap(false, Ordering::AcqRel);
        }
    }

    fn pass(&self, drain: &mut Drain<'_>, batch: &mut Vec<(u64, usize)>) {
        let mut sink = self.sink.lock();
        let stats = match self.order {
            FlushOrder::Unordered => flush_unordered(drain, &mut *sink),
            FlushOrder::Ordered => {
                let cutoff = efficient_clock::now();
                flush_ordered(drain, &mut *sink, cutoff, batch)
            }
        };
        if stats.rendered > 0 {
            tracing::trace!(rendered = stats.rendered, "flush pass");
        }
        if let Some(e) = &stats.last_error {
            tracing::error!(
                path = %sink.path().display(),
                failed = stats.failed,
                error = %e,
                "failed to write log records"
            );
        }
        if let Err(e) = sink.flush() {
            tracing::error!(path = %sink.path().display(), error = %e, "failed to flush log file");
        }
        if let Some(limit) = self.rotate_after_bytes {
            if sink.bytes_written() >= limit {
                if let Err(e) = sink.rotate() {
                    tracing::error!(error = %e, "size-triggered rotation failed");
                }
            }
        }
    }

    fn run(&self) {
        let Some(mut drain) = self.pool.drain() else {
            tracing::error!("record pool already has a consumer; flush task exiting");
            return;
        };
        let mut batch = match self.order {
            FlushOrder::Ordered => Vec::with_capacity(self.pool.len()),
            FlushOrder::Unordered => Vec::new(),
        };
        tracing::debug!(order = ?self.order, pool_size = self.pool.len(), "flush task started");

        match self.order {
            FlushOrder::Unordered => {
                while !self.stopping() {
                    self.wait();
                    self.pass(&mut drain, &mut batch);
                }
                // Drain whatever was filled after the last pass.
                self.pass(&mut drain, &mut batch);
            }
            FlushOrder::Ordered => loop {
                self.wait();
                // Sampled before the pass so its cutoff covers every record
                // published before the stop request.
                let last = self.stopping();
                self.pass(&mut drain, &mut batch);
                if last {
                    break;
                }
            },
        }
        tracing::debug!("flush task stopped");
    }
}

/// Handle to the running flush thread.
pub struct FlushTask {
    state: Arc<FlushState>,
    handle: Option<JoinHandle<()>>,
}

impl FlushTask {
    pub fn spawn(state: Arc<FlushState>) -> Result<Self> {
        let worker = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("elog-flush".into())
            .spawn(move || worker.run())
            .map_err(ElogError::Spawn)?;
        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> &Arc<FlushState> {
        &self.state
    }

    /// Signals the task to stop and waits for its final pass.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.state.request_stop();
        if handle.join().is_err() {
            tracing::error!("flush thread panicked");
        }
    }
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}
