//! Capture clock for log records.
//!
//! Records are stamped on the producer's hot path, so the clock must be
//! cheap, monotonic and high resolution, but the rendered line needs wall
//! time. Both are served by anchoring a monotonic `Instant` to the wall
//! clock once per process: a capture timestamp is the anchor's wall time
//! plus the monotonic time elapsed since the anchor, in nanoseconds since
//! the UNIX epoch. Timestamps taken by any thread are therefore directly
//! comparable, which the ordered flush relies on.

use std::io::{self, Write};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use time::format_description::FormatItem;
use time::OffsetDateTime;

struct Anchor {
    instant: Instant,
    unix_nanos: u64,
}

lazy_static! {
    static ref ANCHOR: Anchor = Anchor {
        instant: Instant::now(),
        unix_nanos: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0),
    };
}

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = time::macros::format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Returns the current capture timestamp in nanoseconds since the UNIX epoch.
///
/// Monotonic within the process: a later call never returns a smaller value.
///
/// ```
/// # use elog::efficient_clock::now;
/// let a = now();
/// let b = now();
/// assert!(b >= a);
/// ```
#[inline]
pub fn now() -> u64 {
    let anchor = &*ANCHOR;
    anchor.unix_nanos + anchor.instant.elapsed().as_nanos() as u64
}

/// Writes `nanos` as an ISO-8601 UTC timestamp with millisecond precision,
/// e.g. `2024-05-01T12:30:45.123Z`.
pub fn write_timestamp<W: Write>(out: &mut W, nanos: u64) -> io::Result<()> {
    let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    datetime
        .format_into(out, TIMESTAMP_FORMAT)
        .map_err(|e| match e {
            time::error::Format::StdIo(io) => io,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })?;
    Ok(())
}
