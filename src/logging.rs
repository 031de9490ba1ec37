//! Deferred diagnostics for the serial console.
//!
//! Interrupt handlers and the poll loop must not format text in place;
//! diagnostics are queued as fixed-size [`LogEntry`] records and drained
//! into the UART tx path when the main loop gets around to it.
//!
//! ```text
//! poll loop ──▶ diag_warn!() ──▶ [E0][E1][E2] ──▶ drain_into ──▶ tx ring
//!                                 lock-free        main loop
//! ```
//!
//! Entries may be dropped if the ring is full; drops are counted, never
//! blocked on.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::port::ByteSink;
use crate::ring::RingBuffer;

/// Maximum message length per entry.
pub const MAX_MSG_LEN: usize = 96;

/// Default number of queued entries.
pub const DIAG_BUFFER_SIZE: usize = 16;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single queued diagnostic.
#[derive(Clone, Copy)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Entries are built from `format_args!`, so this is
    /// always valid UTF-8 in practice.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("")
    }
}

/// Diagnostic queue: one producer context, one drain context.
pub struct DiagLog<const N: usize = DIAG_BUFFER_SIZE> {
    ring: RingBuffer<LogEntry, N>,
    dropped: AtomicU32,
}

impl<const N: usize> DiagLog<N> {
    pub const fn new() -> Self {
        Self {
            ring: RingBuffer::new(LogEntry::EMPTY),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue one diagnostic. Truncates to [`MAX_MSG_LEN`]; returns `false`
    /// and counts the drop when the ring is full. Never blocks.
    pub fn push(&self, level: LogLevel, msg: &[u8]) -> bool {
        let mut entry = LogEntry::EMPTY;
        entry.level = level;
        entry.len = msg.len().min(MAX_MSG_LEN) as u8;
        entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);

        if !self.ring.try_put(entry) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Take the oldest queued entry.
    pub fn drain(&self) -> Option<LogEntry> {
        self.ring.try_get()
    }

    /// Write queued entries to the transmit path as `LEVEL message\r\n`.
    ///
    /// Returns how many entries were taken. Output lands in the tx ring
    /// non-blockingly; if the ring fills mid-entry the tail of that line is
    /// dropped, the queue itself stays consistent.
    pub fn drain_into(&self, sink: &dyn ByteSink) -> usize {
        let mut count = 0;
        while let Some(entry) = self.drain() {
            let _ = sink.send_str(entry.level.as_str());
            let _ = sink.try_send(b' ');
            let _ = sink.send_str(entry.text());
            let _ = sink.send_str("\r\n");
            count += 1;
        }
        count
    }

    /// Entries waiting to be drained.
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Diagnostics dropped because the ring was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for DiagLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written; output is truncated at the buffer.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Queue a formatted diagnostic at the given level.
#[macro_export]
macro_rules! diag_log {
    ($log:expr, $level:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $log.push($level, &buf[..len]);
    }};
}

/// Queue an error-level diagnostic.
#[macro_export]
macro_rules! diag_error {
    ($log:expr, $($arg:tt)*) => {
        $crate::diag_log!($log, $crate::logging::LogLevel::Error, $($arg)*)
    };
}

/// Queue a warning-level diagnostic.
#[macro_export]
macro_rules! diag_warn {
    ($log:expr, $($arg:tt)*) => {
        $crate::diag_log!($log, $crate::logging::LogLevel::Warn, $($arg)*)
    };
}

/// Queue an info-level diagnostic.
#[macro_export]
macro_rules! diag_info {
    ($log:expr, $($arg:tt)*) => {
        $crate::diag_log!($log, $crate::logging::LogLevel::Info, $($arg)*)
    };
}
