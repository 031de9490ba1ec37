//! Command table and dispatcher.
//!
//! Commands live in a static, immutable table built at compile time;
//! applications extend the table, not the dispatcher. Matching on the
//! command name is case-insensitive and the first match wins. Handlers get
//! the rest of the line verbatim (leading/trailing whitespace trimmed) and
//! write their own output through the sink.

use core::fmt::Write;

use crate::console::error::ConsoleError;
use crate::port::{ByteSink, SinkWriter};

/// Handler signature: argument remainder plus the output sink.
///
/// Argument parsing failures are the handler's to report; return an error
/// and the dispatcher prints its code and message.
pub type Handler = fn(args: &str, out: &dyn ByteSink) -> Result<(), ConsoleError>;

/// One entry in the command table.
pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

/// Static command table with dispatch.
pub struct CommandSet {
    commands: &'static [Command],
}

impl CommandSet {
    pub const fn new(commands: &'static [Command]) -> Self {
        Self { commands }
    }

    /// Look up a command by name, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&'static Command> {
        self.commands.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Split a line into command token and trimmed argument remainder.
    fn split(line: &str) -> (&str, &str) {
        let line = line.trim();
        match line.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        }
    }

    /// Dispatch a submitted line.
    ///
    /// Empty lines are a no-op. Unknown commands and handler errors are
    /// reported on `out`; the returned `Result` is for programmatic callers
    /// and tests. Never panics, never blocks.
    pub fn execute(&self, line: &str, out: &dyn ByteSink) -> Result<(), ConsoleError> {
        let (name, args) = Self::split(line);
        if name.is_empty() {
            return Ok(());
        }

        let Some(cmd) = self.find(name) else {
            let mut w = SinkWriter::new(out);
            let _ = write!(w, "unknown command: {}\r\ntype 'help' for commands\r\n", name);
            return Err(ConsoleError::UnknownCommand);
        };

        let result = (cmd.handler)(args, out);
        if let Err(e) = result {
            let mut w = SinkWriter::new(out);
            let _ = write!(w, "{}\r\n", e);
        }
        result
    }

    /// Print one line of help per command. Meant to be called from an
    /// application's `help` handler.
    pub fn write_help(&self, out: &dyn ByteSink) {
        let mut w = SinkWriter::new(out);
        for cmd in self.commands {
            let _ = write!(w, "  {:<8} {}\r\n", cmd.name, cmd.help);
        }
    }

    /// All command names, e.g. for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|c| c.name)
    }
}
