use std::sync::atomic::{AtomicU8, Ordering};

/// Severity bits. A record carries exactly one; the gate holds any mix.
pub const DEBUG: u8 = 0x01;
pub const INFO: u8 = 0x02;
pub const WARN: u8 = 0x04;
pub const ERR: u8 = 0x08;
pub const FATAL: u8 = 0x10;

/// Every known severity enabled.
pub const ALL: u8 = DEBUG | INFO | WARN | ERR | FATAL;

/// Name rendered for a severity byte.
pub fn name(severity: u8) -> &'static str {
    match severity {
        DEBUG => "DEBUG",
        INFO => "INFO",
        WARN => "WARN",
        ERR => "ERR",
        FATAL => "FATAL",
        _ => "UNKNOWN",
    }
}

/// Process-wide filter deciding whether a logging call proceeds at all.
///
/// Reads and writes are relaxed: a level change becomes visible to other
/// threads eventually, and a call racing with the change may go either way.
/// Checking the gate costs one relaxed load, so disabled severities are
/// essentially free.
#[derive(Debug)]
pub struct SeverityGate {
    mask: AtomicU8,
}

impl SeverityGate {
    pub const fn new(mask: u8) -> Self {
        Self {
            mask: AtomicU8::new(mask),
        }
    }

    #[inline]
    pub fn enabled(&self, severity: u8) -> bool {
        severity & self.mask.load(Ordering::Relaxed) != 0
    }

    pub fn level(&self) -> u8 {
        self.mask.load(Ordering::Relaxed)
    }

    pub fn set_level(&self, mask: u8) {
        self.mask.store(mask, Ordering::Relaxed);
    }
}

impl Default for SeverityGate {
    fn default() -> Self {
        Self::new(ALL)
    }
}
