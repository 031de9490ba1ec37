//! Interactive terminal protocol over the serial transport
//!
//! Lazy polling from the main loop - no dedicated task.
//! Zero heap allocation - all fixed buffers.

pub mod commands;
pub mod console;
pub mod editor;
pub mod error;

pub use commands::{Command, CommandSet, Handler};
pub use console::{Console, VERSION};
pub use editor::{Line, LineEditor, LineEvent, MAX_LINE};
pub use error::ConsoleError;
