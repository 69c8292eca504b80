use std::cell::UnsafeCell;
use std::io::{self, Write};
use std::mem::size_of;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::efficient_clock;
use crate::log_value::LogValue;
use crate::severity;

/// Size every record occupies in the pool.
pub const RECORD_SIZE: usize = 512;
/// Maximum number of values per record.
pub const MAX_TAGS: usize = 16;
/// Payload bytes left once the status, timestamp, thread identity, severity,
/// cursors and tag list are accounted for.
pub const PAYLOAD_CAPACITY: usize = 466;

/// Slot lifecycle: `Free -> Assigned -> Filled -> Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SlotStatus {
    Free = 0,
    Assigned = 1,
    Filled = 2,
}

impl SlotStatus {
    fn from_raw(raw: u32) -> Self {
        match raw {
            0 => SlotStatus::Free,
            1 => SlotStatus::Assigned,
            _ => SlotStatus::Filled,
        }
    }
}

/// Ordered tagged values packed into a fixed inline buffer.
///
/// `tags[..tag_count]` describes, in insertion order, the values laid out
/// back to back in `payload[..payload_len]`. A value is appended by writing
/// its bytes first and its tag second; if either the tag list or the payload
/// cannot take it, nothing changes.
#[repr(C)]
pub struct TaggedValues {
    tag_count: u8,
    payload_len: u16,
    tags: [u8; MAX_TAGS],
    payload: [u8; PAYLOAD_CAPACITY],
}

impl TaggedValues {
    pub const fn new() -> Self {
        Self {
            tag_count: 0,
            payload_len: 0,
            tags: [0; MAX_TAGS],
            payload: [0; PAYLOAD_CAPACITY],
        }
    }

    /// Appends `value`, returning `false` if it was dropped for lack of room.
    pub fn push(&mut self, value: LogValue<'_>) -> bool {
        let count = self.tag_count as usize;
        if count == MAX_TAGS {
            return false;
        }
        let used = self.payload_len as usize;
        let Some(written) = value.encode(&mut self.payload[used..]) else {
            return false;
        };
        self.payload_len = (used + written) as u16;
        self.tags[count] = value.tag();
        self.tag_count += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.tag_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.tag_count == 0
    }

    /// Payload bytes in use.
    pub fn payload_len(&self) -> usize {
        self.payload_len as usize
    }

    pub fn tags(&self) -> &[u8] {
        &self.tags[..self.len()]
    }

    /// Rewinds both cursors. Stale bytes are left in place.
    pub fn clear(&mut self) {
        self.tag_count = 0;
        self.payload_len = 0;
    }

    pub fn iter(&self) -> ValueReader<'_> {
        ValueReader {
            tags: self.tags(),
            payload: &self.payload[..self.payload_len()],
            pos: 0,
        }
    }
}

impl Default for TaggedValues {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a TaggedValues {
    type Item = LogValue<'a>;
    type IntoIter = ValueReader<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward reader over a [`TaggedValues`] buffer.
pub struct ValueReader<'a> {
    tags: &'a [u8],
    payload: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for ValueReader<'a> {
    type Item = LogValue<'a>;

    fn next(&mut self) -> Option<LogValue<'a>> {
        let (&tag, rest) = self.tags.split_first()?;
        self.tags = rest;
        let (value, consumed) = LogValue::decode(tag, &self.payload[self.pos..])?;
        self.pos += consumed;
        Some(value)
    }
}

/// The part of a record written by its owner between claim and hand-back.
#[repr(C)]
pub struct RecordBody {
    captured_at: u64,
    thread_id: u64,
    severity: u8,
    values: TaggedValues,
}

impl RecordBody {
    const fn new() -> Self {
        Self {
            captured_at: 0,
            thread_id: 0,
            severity: 0,
            values: TaggedValues::new(),
        }
    }

    /// Capture timestamp in nanoseconds since the UNIX epoch.
    pub fn captured_at(&self) -> u64 {
        self.captured_at
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    pub fn severity(&self) -> u8 {
        self.severity
    }

    pub fn values(&self) -> &TaggedValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut TaggedValues {
        &mut self.values
    }

    /// Stamps the capture time, calling thread and severity.
    pub(crate) fn stamp(&mut self, severity: u8) {
        self.captured_at = efficient_clock::now();
        self.thread_id = current_thread_id();
        self.severity = severity;
    }

    pub(crate) fn reset(&mut self) {
        self.values.clear();
    }

    /// Renders the record as one text line:
    /// `<timestamp> [<thread>](<SEVERITY>) <values...>\n`.
    ///
    /// Values are concatenated without separators.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        efficient_clock::write_timestamp(out, self.captured_at)?;
        write!(out, " [{}]({}) ", self.thread_id, severity::name(self.severity))?;
        for value in &self.values {
            value.write_to(out)?;
        }
        out.write_all(b"\n")
    }
}

/// One pool slot: an atomic status word guarding an exclusively owned body.
///
/// The body is only ever touched by whoever moved the status into its
/// current non-`Free` state: the producer while `Assigned`, the consumer
/// while `Filled`. See `record_pool` for the handles enforcing this.
#[repr(C, align(64))]
pub struct Record {
    status: AtomicU32,
    body: UnsafeCell<RecordBody>,
}

// SAFETY: access to `body` is serialized by the `status` protocol.
unsafe impl Sync for Record {}

const _: () = assert!(size_of::<Record>() == RECORD_SIZE);

impl Record {
    pub const fn new() -> Self {
        Self {
            status: AtomicU32::new(SlotStatus::Free as u32),
            body: UnsafeCell::new(RecordBody::new()),
        }
    }

    pub fn status(&self) -> SlotStatus {
        SlotStatus::from_raw(self.status.load(Ordering::Acquire))
    }

    /// Attempts the `Free -> Assigned` transition.
    #[inline]
    pub(crate) fn try_assign(&self) -> bool {
        self.status
            .compare_exchange(
                SlotStatus::Free as u32,
                SlotStatus::Assigned as u32,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    #[inline]
    pub(crate) fn is_filled(&self) -> bool {
        self.status.load(Ordering::Acquire) == SlotStatus::Filled as u32
    }

    /// `Assigned -> Filled`; publishes every body write made before it.
    pub(crate) fn mark_filled(&self) {
        let prev = self
            .status
            .swap(SlotStatus::Filled as u32, Ordering::Release);
        assert_eq!(
            prev,
            SlotStatus::Assigned as u32,
            "publish on a record that was not assigned"
        );
    }

    /// Returns the slot to `Free`, making it claimable again.
    pub(crate) fn mark_free(&self) {
        self.status.store(SlotStatus::Free as u32, Ordering::Release);
    }

    /// # Safety
    ///
    /// The caller must own the slot (Assigned by it, or Filled and being
    /// drained by the single consumer) for the lifetime of the reference.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn body_mut(&self) -> &mut RecordBody {
        &mut *self.body.get()
    }

    /// # Safety
    ///
    /// Same ownership requirement as [`Record::body_mut`].
    pub(crate) unsafe fn body(&self) -> &RecordBody {
        &*self.body.get()
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Small stable identifier of the calling thread, assigned on first use.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}
