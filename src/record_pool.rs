use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crate::loggable::Loggable;
use crate::record::{Record, RecordBody, SlotStatus};

/// Default number of records in a pool.
pub const DEFAULT_POOL_SIZE: usize = 16 * 1024;

/// Fixed array of records shared by every producer and one consumer.
///
/// Producers claim a slot with [`RecordPool::acquire`], fill it and hand it
/// over with [`RecordSlot::publish`]. The consumer drains filled slots
/// through the unique [`Drain`] handle and returns them to `Free`.
///
/// # Backpressure
///
/// There is no capacity error. When every slot is in use, `acquire` yields
/// and rescans until the consumer frees one, so a pool too small for the
/// sustained log rate shows up as producers spinning, not as failures.
/// Size the pool for the worst burst you expect between flush passes.
pub struct RecordPool {
    records: Box<[Record]>,
    hint: AtomicUsize,
    draining: AtomicBool,
}

impl RecordPool {
    /// Creates a pool of `size` free records (at least one).
    pub fn new(size: usize) -> Self {
        let records = (0..size.max(1)).map(|_| Record::new()).collect();
        Self {
            records,
            hint: AtomicUsize::new(0),
            draining: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Claims a free record, spinning with `yield_now` until one is available.
    ///
    /// The scan starts at the rotating hint so concurrent producers spread
    /// across the pool; the hint is advisory only.
    pub fn acquire(&self) -> RecordSlot<'_> {
        let len = self.records.len();
        loop {
            let start = self.hint.load(Ordering::Relaxed);
            for i in 0..len {
                let index = (start + i) % len;
                let record = &self.records[index];
                if record.try_assign() {
                    self.hint.store((index + 1) % len, Ordering::Relaxed);
                    // SAFETY: the successful CAS made this thread the owner.
                    unsafe { record.body_mut() }.reset();
                    return RecordSlot { record, index };
                }
            }
            thread::yield_now();
        }
    }

    /// Single pass of [`RecordPool::acquire`] without the retry.
    pub fn try_acquire(&self) -> Option<RecordSlot<'_>> {
        let len = self.records.len();
        let start = self.hint.load(Ordering::Relaxed);
        (0..len).map(|i| (start + i) % len).find_map(|index| {
            let record = &self.records[index];
            if !record.try_assign() {
                return None;
            }
            self.hint.store((index + 1) % len, Ordering::Relaxed);
            // SAFETY: the successful CAS made this thread the owner.
            unsafe { record.body_mut() }.reset();
            Some(RecordSlot { record, index })
        })
    }

    /// Claims the consumer role. Only one [`Drain`] can exist at a time.
    pub fn drain(&self) -> Option<Drain<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Drain { pool: self })
    }

    /// Number of records currently not `Free`.
    pub fn occupied(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status() != SlotStatus::Free)
            .count()
    }

    pub fn status(&self, index: usize) -> Option<SlotStatus> {
        self.records.get(index).map(Record::status)
    }

    pub(crate) fn set_hint(&self, index: usize) {
        self.hint.store(index % self.records.len(), Ordering::Relaxed);
    }
}

/// Exclusive write access to one claimed record.
///
/// Move-only: the slot is handed to the consumer by [`RecordSlot::publish`]
/// and cannot be touched afterwards. Dropping an unpublished slot returns it
/// to the pool unwritten.
pub struct RecordSlot<'a> {
    record: &'a Record,
    index: usize,
}

impl<'a> RecordSlot<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn body(&self) -> &RecordBody {
        // SAFETY: this slot owns the record while Assigned.
        unsafe { self.record.body() }
    }

    pub fn body_mut(&mut self) -> &mut RecordBody {
        // SAFETY: this slot owns the record while Assigned.
        unsafe { self.record.body_mut() }
    }

    /// Stamps the record, appends `values` (dropping those that do not fit)
    /// and marks it `Filled` for the consumer.
    pub fn publish(mut self, severity: u8, values: &[&dyn Loggable]) {
        let body = self.body_mut();
        body.stamp(severity);
        let tagged = body.values_mut();
        for value in values {
            tagged.push(value.log_value());
        }
        self.record.mark_filled();
        mem::forget(self);
    }
}

impl Drop for RecordSlot<'_> {
    fn drop(&mut self) {
        self.body_mut().reset();
        self.record.mark_free();
    }
}

/// The pool's single consumer.
///
/// Holding a `Drain` is what makes reading a `Filled` record and returning
/// it to `Free` sound: no other thread may move a slot out of `Filled`.
pub struct Drain<'a> {
    pool: &'a RecordPool,
}

impl<'a> Drain<'a> {
    pub fn pool(&self) -> &'a RecordPool {
        self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Capture time of slot `index` if it is `Filled`.
    pub fn filled_at(&self, index: usize) -> Option<u64> {
        let record = self.pool.records.get(index)?;
        if !record.is_filled() {
            return None;
        }
        // SAFETY: Filled records belong to the drain; acquire ordering on the
        // status load makes the producer's writes visible.
        Some(unsafe { record.body() }.captured_at())
    }

    /// Borrows slot `index` if it is `Filled`.
    pub fn take(&mut self, index: usize) -> Option<FilledRecord<'_>> {
        let record = self.pool.records.get(index)?;
        record.is_filled().then_some(FilledRecord { record })
    }
}

impl Drop for Drain<'_> {
    fn drop(&mut self) {
        self.pool.draining.store(false, Ordering::Release);
    }
}

/// A filled record being rendered by the consumer.
pub struct FilledRecord<'d> {
    record: &'d Record,
}

impl FilledRecord<'_> {
    pub fn body(&self) -> &RecordBody {
        // SAFETY: guarded by the `&mut Drain` this was borrowed from.
        unsafe { self.record.body() }
    }

    /// Rewinds the value cursors and returns the slot to `Free`.
    pub fn release(self) {
        // SAFETY: as above; the slot is still Filled and ours.
        unsafe { self.record.body_mut() }.reset();
        self.record.mark_free();
    }
}
