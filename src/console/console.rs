//! Poll entry point tying transport, editor and dispatcher together.

use crate::console::commands::{Command, CommandSet};
use crate::console::editor::{LineEditor, LineEvent};
use crate::diag_warn;
use crate::logging::DiagLog;
use crate::port::{ByteSink, ByteSource};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Interactive console: owns the line editor and the command table, driven
/// by the scheduler loop through [`Console::poll`].
pub struct Console {
    editor: LineEditor,
    commands: CommandSet,
    prompt: &'static str,

    /// rx overruns already reported, so each batch is logged once.
    seen_overruns: u32,
}

impl Console {
    pub const fn new(commands: &'static [Command], prompt: &'static str) -> Self {
        Self {
            editor: LineEditor::new(),
            commands: CommandSet::new(commands),
            prompt,
            seen_overruns: 0,
        }
    }

    /// The command table, e.g. for a `help` handler.
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Print the prompt plus any half-typed input (after async output).
    pub fn print_prompt(&self, out: &dyn ByteSink) {
        let _ = out.send_str(self.prompt);
        for &b in self.editor.pending() {
            let _ = out.try_send(b);
        }
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &dyn ByteSink) {
        let _ = out.send_str("\r\n");
        let _ = out.send_str(VERSION);
        let _ = out.send_str("\r\ntype 'help' for commands\r\n");
        self.print_prompt(out);
    }

    /// Drain received bytes, edit, dispatch completed lines, then flush
    /// queued diagnostics into the tx path.
    ///
    /// One command runs to completion (including its output) before the
    /// next queued line is looked at. Returns how many lines were
    /// dispatched. Never blocks; call from the main loop.
    pub fn poll<P, const N: usize>(&mut self, port: &P, diag: &DiagLog<N>) -> u32
    where
        P: ByteSink + ByteSource,
    {
        let mut dispatched = 0;

        while let Some(byte) = port.try_receive() {
            match self.editor.feed(byte, port) {
                LineEvent::Pending => {}
                LineEvent::Interrupted => {
                    let _ = port.send_str("^C\r\n");
                    self.print_prompt(port);
                }
                LineEvent::Line(line) => {
                    match core::str::from_utf8(&line) {
                        Ok(text) => {
                            // Diagnostics already went to the port; the
                            // loop keeps running either way.
                            let _ = self.commands.execute(text, port);
                            dispatched += 1;
                        }
                        Err(_) => {
                            diag_warn!(diag, "dropped non-utf8 line ({} bytes)", line.len());
                        }
                    }
                    self.print_prompt(port);
                }
            }
        }

        // Report rx overruns once per batch, from poll context, never from
        // the interrupt side.
        let overruns = port.rx_overrun_count();
        if overruns != self.seen_overruns {
            diag_warn!(diag, "rx overrun: {} bytes dropped", overruns - self.seen_overruns);
            self.seen_overruns = overruns;
        }

        diag.drain_into(port);

        dispatched
    }
}
