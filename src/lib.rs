//! # uart-console
//!
//! Interrupt-driven serial communication core: lock-free SPSC ring buffers
//! under a non-blocking line editor and command dispatcher.
//!
//! ## Architecture
//!
//! ```text
//! rx ISR ─▶ on_rx_byte ─▶ rx ring ─▶ poll ─▶ LineEditor ─▶ CommandSet
//!                                                              │
//! tx ISR ◀─ on_tx_ready ◀─ tx ring ◀─ try_send ◀── handler ◀───┘
//! ```
//!
//! Two execution contexts share each [`SerialPort`]: the interrupt side
//! (preemptive, runs to completion) and the cooperative main loop. Each
//! ring has exactly one producer role and one consumer role; nothing in
//! this crate blocks, and buffer-full/empty conditions are return values,
//! never faults.
//!
//! The hardware layer stays outside: it forwards received bytes to
//! [`SerialPort::on_rx_byte`], pulls transmit bytes with
//! [`SerialPort::on_tx_ready`], and provides the interrupt enable/disable
//! primitive via [`TxIrqControl`].

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod logging;
pub mod port;
pub mod ring;
pub mod shared;

pub use console::{Command, CommandSet, Console, ConsoleError, LineEditor, LineEvent, MAX_LINE};
pub use logging::{DiagLog, LogLevel};
pub use port::{ByteSink, ByteSource, NullTxIrq, SerialPort, SinkWriter, TxIrqControl};
pub use ring::RingBuffer;
pub use shared::IrqCell;
