//! Non-blocking line editor.
//!
//! Consumes received bytes one at a time and assembles complete lines,
//! echoing as it goes. The discipline matches what a plain terminal client
//! expects:
//!
//! - `\r` or `\n` submits the line (empty lines are ignored)
//! - `\b` (BS) or `\x7f` (DEL) deletes the previous character
//! - `^U` kills the entire input buffer
//! - `^W` deletes back to the previous space
//! - `^R` sends a CR and reprints the buffer
//! - `^C` aborts the line
//! - `\t` is replaced by a single space
//! - all other control characters are ignored
//!
//! Echo goes through [`ByteSink`] and may be dropped when the tx ring is
//! full; the edit buffer itself stays correct regardless.

use heapless::Vec;

use crate::port::ByteSink;

/// Maximum line length including the reserved terminator slot: the buffer
/// accepts at most `MAX_LINE - 1` characters and rings the bell beyond that.
pub const MAX_LINE: usize = 80;

/// Bell sent when an insertion is rejected.
const BELL: u8 = 0x07;

/// Erase one character on the remote terminal.
const RUBOUT: &str = "\x08 \x08";

/// A submitted line. Byte-oriented: the discipline admits the 0xA0..=0xFF
/// range, which need not be valid UTF-8.
pub type Line = Vec<u8, MAX_LINE>;

/// Outcome of feeding one byte to the editor.
#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent {
    /// Byte consumed, line still being edited.
    Pending,
    /// A terminator arrived on a non-empty buffer.
    Line(Line),
    /// `^C`: the line in progress was discarded.
    Interrupted,
}

/// Line editor state. Persists across lines; the buffer is cleared after
/// every submission, kill, or abort.
pub struct LineEditor {
    buf: [u8; MAX_LINE],
    len: usize,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_LINE],
            len: 0,
        }
    }

    /// Characters currently in the edit buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The not-yet-submitted line, e.g. for reprinting after async output.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Process one received byte, echoing through `out`.
    ///
    /// Never blocks and never allocates beyond the fixed buffer.
    pub fn feed(&mut self, byte: u8, out: &dyn ByteSink) -> LineEvent {
        // stty ICRNL behaviour: CR and NL both submit.
        if byte == b'\r' || byte == b'\n' {
            if self.len == 0 {
                return LineEvent::Pending;
            }
            let _ = out.send_str("\r\n");
            let mut line = Line::new();
            // Cannot fail: len < MAX_LINE by construction.
            let _ = line.extend_from_slice(&self.buf[..self.len]);
            self.len = 0;
            return LineEvent::Line(line);
        }

        let byte = if byte == b'\t' { b' ' } else { byte };

        // Printable ASCII plus the 8-bit high range.
        if (0x20..=0x7e).contains(&byte) || byte >= 0xa0 {
            if self.len >= MAX_LINE - 1 {
                let _ = out.try_send(BELL);
            } else {
                self.buf[self.len] = byte;
                self.len += 1;
                let _ = out.try_send(byte);
            }
            return LineEvent::Pending;
        }

        match byte {
            // ^C: abort the line, caller decides what to show.
            0x03 => {
                self.len = 0;
                LineEvent::Interrupted
            }

            // BS / DEL
            0x08 | 0x7f => {
                if self.len > 0 {
                    self.len -= 1;
                    let _ = out.send_str(RUBOUT);
                }
                LineEvent::Pending
            }

            // ^R: CR, then reprint the buffer.
            0x12 => {
                let _ = out.try_send(b'\r');
                for i in 0..self.len {
                    let _ = out.try_send(self.buf[i]);
                }
                LineEvent::Pending
            }

            // ^U: kill the whole line.
            0x15 => {
                while self.len > 0 {
                    self.len -= 1;
                    let _ = out.send_str(RUBOUT);
                }
                LineEvent::Pending
            }

            // ^W: kill back to the previous space.
            0x17 => {
                while self.len > 0 && self.buf[self.len - 1] != b' ' {
                    self.len -= 1;
                    let _ = out.send_str(RUBOUT);
                }
                LineEvent::Pending
            }

            _ => LineEvent::Pending,
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
