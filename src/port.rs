//! Interrupt-driven serial transport.
//!
//! A [`SerialPort`] owns two [`RingBuffer`]s and sits between the hardware
//! interrupt handlers and the cooperative main loop:
//!
//! ```text
//! rx ISR ──▶ on_rx_byte ──▶ rx ring ──▶ try_receive ──▶ main loop
//! main loop ──▶ try_send ──▶ tx ring ──▶ on_tx_ready ──▶ tx ISR
//! ```
//!
//! Buffer roles are statically assigned: the interrupt produces into rx and
//! consumes from tx; the main loop produces into tx and consumes from rx.
//! Nothing here blocks.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::ring::RingBuffer;

/// Hardware hook for the transmit-data-empty interrupt source.
///
/// The port arms the source when a byte lands in an idle tx ring and
/// disarms it when the tx ring drains. The implementation pokes the actual
/// interrupt-enable register; on a target where the register write is not
/// reentrant it must be safe to call with interrupts enabled.
pub trait TxIrqControl {
    /// Enable the transmit-ready interrupt source.
    fn arm(&self);

    /// Disable the transmit-ready interrupt source.
    fn disarm(&self);
}

/// Non-blocking byte output, as seen by the console layers.
///
/// Implementations must never block; when there is no room the byte is
/// dropped and the caller is told.
pub trait ByteSink {
    /// Queue one byte for transmission. Returns `false` if it was dropped.
    fn try_send(&self, byte: u8) -> bool;

    /// Queue a string, stopping at the first byte that does not fit.
    ///
    /// Returns how many bytes were queued (`0..=s.len()`); the caller owns
    /// retrying the remainder.
    fn send_str(&self, s: &str) -> usize {
        let mut sent = 0;
        for &b in s.as_bytes() {
            if !self.try_send(b) {
                break;
            }
            sent += 1;
        }
        sent
    }
}

/// Non-blocking byte input, as seen by the console layers.
pub trait ByteSource {
    /// Take the oldest received byte, if any.
    fn try_receive(&self) -> Option<u8>;

    /// Total received bytes dropped because the rx ring was full.
    fn rx_overrun_count(&self) -> u32;
}

/// Interrupt-driven serial endpoint with `TX`/`RX` ring capacities.
///
/// All methods take `&self`: the port is meant to live in a `static` and be
/// touched from both interrupt and main context, each side keeping to its
/// assigned ring role.
pub struct SerialPort<C: TxIrqControl, const TX: usize, const RX: usize> {
    tx: RingBuffer<u8, TX>,
    rx: RingBuffer<u8, RX>,
    ctrl: C,

    /// Tracks the tx interrupt source so arm/disarm fire exactly on the
    /// edges: armed on the first byte into an idle ring, disarmed when the
    /// drain finds it empty.
    tx_armed: AtomicBool,

    /// Received bytes dropped on a full rx ring (debug counter; overruns
    /// are reportable, not fatal).
    rx_overruns: AtomicU32,
}

impl<C: TxIrqControl, const TX: usize, const RX: usize> SerialPort<C, TX, RX> {
    /// Create an idle port. The tx interrupt source starts disarmed.
    pub const fn new(ctrl: C) -> Self {
        Self {
            tx: RingBuffer::new(0),
            rx: RingBuffer::new(0),
            ctrl,
            tx_armed: AtomicBool::new(false),
            rx_overruns: AtomicU32::new(0),
        }
    }

    /// Take the oldest received byte. Main-loop side of the rx ring.
    #[inline]
    pub fn try_receive(&self) -> Option<u8> {
        self.rx.try_get()
    }

    /// Free slots in the tx ring.
    #[inline]
    pub fn tx_free_space(&self) -> usize {
        self.tx.capacity() - self.tx.len()
    }

    /// Bytes waiting in the rx ring.
    #[inline]
    pub fn rx_available(&self) -> usize {
        self.rx.len()
    }

    /// Total received bytes dropped on rx overflow.
    #[inline]
    pub fn rx_overruns(&self) -> u32 {
        self.rx_overruns.load(Ordering::Relaxed)
    }

    /// Receive-complete interrupt entry point.
    ///
    /// Call only from the rx interrupt handler with the byte read from the
    /// receive register. On a full ring the byte is dropped and counted;
    /// nothing here formats or reports (interrupt context).
    #[inline]
    pub fn on_rx_byte(&self, byte: u8) {
        if !self.rx.try_put(byte) {
            self.rx_overruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Transmit-data-empty interrupt entry point.
    ///
    /// Call only from the tx interrupt handler. `Some(byte)` is to be
    /// written to the transmit register. `None` means the ring drained;
    /// the source has already been disarmed, so the hardware stops firing
    /// until the next `try_send` into an idle ring.
    #[inline]
    pub fn on_tx_ready(&self) -> Option<u8> {
        match self.tx.try_get() {
            Some(byte) => Some(byte),
            None => {
                // swap keeps the disarm edge-triggered: repeated calls on an
                // empty ring touch the hook only once.
                if self.tx_armed.swap(false, Ordering::AcqRel) {
                    self.ctrl.disarm();
                }
                None
            }
        }
    }
}

impl<C: TxIrqControl, const TX: usize, const RX: usize> ByteSink for SerialPort<C, TX, RX> {
    #[inline]
    fn try_send(&self, byte: u8) -> bool {
        if !self.tx.try_put(byte) {
            return false;
        }
        // Arm on the idle→pending edge only.
        if !self.tx_armed.swap(true, Ordering::AcqRel) {
            self.ctrl.arm();
        }
        true
    }
}

impl<C: TxIrqControl, const TX: usize, const RX: usize> ByteSource for SerialPort<C, TX, RX> {
    #[inline]
    fn try_receive(&self) -> Option<u8> {
        SerialPort::try_receive(self)
    }

    #[inline]
    fn rx_overrun_count(&self) -> u32 {
        self.rx_overruns()
    }
}

/// `TxIrqControl` for targets (and tests) that poll instead of using the
/// transmit interrupt.
pub struct NullTxIrq;

impl TxIrqControl for NullTxIrq {
    fn arm(&self) {}
    fn disarm(&self) {}
}

/// Adapter so command handlers can use `write!` against a [`ByteSink`].
///
/// Formatting never fails: if the tx ring is full the output is dropped,
/// matching the editing layer's "visual feedback may be dropped" rule.
pub struct SinkWriter<'a> {
    sink: &'a dyn ByteSink,
}

impl<'a> SinkWriter<'a> {
    pub fn new(sink: &'a dyn ByteSink) -> Self {
        Self { sink }
    }
}

impl core::fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let _ = self.sink.send_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct CountingIrq {
        arms: Cell<u32>,
        disarms: Cell<u32>,
    }

    impl CountingIrq {
        fn new() -> Self {
            Self {
                arms: Cell::new(0),
                disarms: Cell::new(0),
            }
        }
    }

    impl TxIrqControl for CountingIrq {
        fn arm(&self) {
            self.arms.set(self.arms.get() + 1);
        }
        fn disarm(&self) {
            self.disarms.set(self.disarms.get() + 1);
        }
    }

    #[test]
    fn test_arm_fires_once_per_idle_to_pending_edge() {
        let port: SerialPort<_, 8, 8> = SerialPort::new(CountingIrq::new());

        assert!(port.try_send(b'x'));
        assert!(port.try_send(b'y'));
        assert!(port.try_send(b'z'));

        // One edge, one arm.
        assert_eq!(port.ctrl.arms.get(), 1);
        assert_eq!(port.ctrl.disarms.get(), 0);
    }

    #[test]
    fn test_disarm_fires_once_when_drained() {
        let port: SerialPort<_, 8, 8> = SerialPort::new(CountingIrq::new());

        port.try_send(b'a');
        assert_eq!(port.on_tx_ready(), Some(b'a'));

        // Empty now: first call disarms, repeats are no-ops.
        assert_eq!(port.on_tx_ready(), None);
        assert_eq!(port.on_tx_ready(), None);
        assert_eq!(port.on_tx_ready(), None);

        assert_eq!(port.ctrl.disarms.get(), 1);
        assert_eq!(port.tx_free_space(), 8);
    }

    #[test]
    fn test_rearm_after_drain() {
        let port: SerialPort<_, 8, 8> = SerialPort::new(CountingIrq::new());

        port.try_send(b'1');
        port.on_tx_ready();
        port.on_tx_ready(); // disarm

        port.try_send(b'2'); // idle ring again: must re-arm
        assert_eq!(port.ctrl.arms.get(), 2);
        assert_eq!(port.ctrl.disarms.get(), 1);
    }

    #[test]
    fn test_send_str_roundtrip() {
        let port: SerialPort<_, 4, 4> = SerialPort::new(NullTxIrq);

        let free_before = port.tx_free_space();
        assert_eq!(port.send_str("AOS"), 3);
        assert_eq!(free_before - port.tx_free_space(), 3);

        assert_eq!(port.on_tx_ready(), Some(b'A'));
        assert_eq!(port.on_tx_ready(), Some(b'O'));
        assert_eq!(port.on_tx_ready(), Some(b'S'));
        assert_eq!(port.on_tx_ready(), None);
    }

    #[test]
    fn test_send_str_stops_at_full_ring() {
        let port: SerialPort<_, 4, 4> = SerialPort::new(NullTxIrq);

        assert_eq!(port.send_str("abcdef"), 4);
        assert_eq!(port.tx_free_space(), 0);
        assert!(!port.try_send(b'g'));
    }

    #[test]
    fn test_rx_overrun_counted_not_fatal() {
        let port: SerialPort<_, 4, 4> = SerialPort::new(NullTxIrq);

        for b in 0..6u8 {
            port.on_rx_byte(b);
        }

        assert_eq!(port.rx_overruns(), 2);
        assert_eq!(port.rx_available(), 4);

        // Earlier bytes survive, later ones were dropped.
        assert_eq!(port.try_receive(), Some(0));
        assert_eq!(port.try_receive(), Some(1));
        assert_eq!(port.try_receive(), Some(2));
        assert_eq!(port.try_receive(), Some(3));
        assert_eq!(port.try_receive(), None);
    }

    #[test]
    fn test_sink_writer_formats_into_tx() {
        use core::fmt::Write;

        let port: SerialPort<_, 32, 4> = SerialPort::new(NullTxIrq);
        let mut w = SinkWriter::new(&port);
        write!(w, "t={}", 42).unwrap();

        let mut out = std::vec::Vec::new();
        while let Some(b) = port.on_tx_ready() {
            out.push(b);
        }
        assert_eq!(out, b"t=42");
    }
}
