//! Interactive inspector that prints the machine state and waits for Enter.

use std::io::{BufRead, Write};

use mic1_core::{Inspector, InspectorAction, Machine, StatusReport};

/// Line that ends an interactive session.
pub const QUIT_COMMAND: &str = "q";

/// Prints a [`StatusReport`] before each cycle and optionally pauses.
///
/// With `pause` set, a line of input is read after every report: `q` or end
/// of input stops the run, anything else continues.
#[derive(Debug)]
pub struct TerminalInspector<R, W> {
    input: R,
    output: W,
    pause: bool,
    quiet: bool,
}

impl<R: BufRead, W: Write> TerminalInspector<R, W> {
    /// Creates an inspector over the given streams.
    pub const fn new(input: R, output: W, pause: bool, quiet: bool) -> Self {
        Self {
            input,
            output,
            pause,
            quiet,
        }
    }

    /// Writes a final report once the run has ended.
    pub fn print_final(&mut self, machine: &Machine) {
        if self.quiet {
            return;
        }
        if let Err(err) = writeln!(self.output, "{}", StatusReport::new(machine.snapshot())) {
            tracing::warn!(%err, "cannot write status report");
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn report(&mut self, machine: &Machine) -> std::io::Result<()> {
        if !self.quiet {
            writeln!(self.output, "{}", StatusReport::new(machine.snapshot()))?;
        }
        if self.pause {
            write!(self.output, "[Enter] step, {QUIT_COMMAND} quit> ")?;
        }
        self.output.flush()
    }

    fn wait_for_operator(&mut self) -> std::io::Result<InspectorAction> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(InspectorAction::Stop);
        }
        if line.trim() == QUIT_COMMAND {
            Ok(InspectorAction::Stop)
        } else {
            Ok(InspectorAction::Continue)
        }
    }
}

impl<R: BufRead, W: Write> Inspector for TerminalInspector<R, W> {
    fn inspect(&mut self, machine: &Machine) -> InspectorAction {
        let result = self.report(machine).and_then(|()| {
            if self.pause {
                self.wait_for_operator()
            } else {
                Ok(InspectorAction::Continue)
            }
        });
        result.unwrap_or_else(|err| {
            tracing::warn!(%err, "terminal I/O failed, stopping");
            InspectorAction::Stop
        })
    }
}
