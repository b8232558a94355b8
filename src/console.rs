use colored::Colorize;
use std::io::{IsTerminal, Write};

/// Sink for user-facing diagnostics. Write failures are ignored since there is nowhere left to
/// report them.
pub struct Console<W: Write = std::io::Stderr> {
    out: W,
    colorize: bool,
}

impl Console {
    /// Colour is used only when stderr is a terminal.
    pub fn stderr() -> Self {
        let out = std::io::stderr();
        let colorize = out.is_terminal();
        Console { out, colorize }
    }
}

#[cfg(test)]
impl<W: Write> Console<W> {
    pub fn plain(out: W) -> Self {
        Console {
            out,
            colorize: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Console<W> {
    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn input_error(&mut self, message: &str) {
        let prefix = if self.colorize {
            "INPUT ERROR:".red().bold().to_string()
        } else {
            "INPUT ERROR:".to_string()
        };
        self.emit(&prefix, message.to_string());
    }

    pub fn parse_error(&mut self, message: &str) {
        if self.colorize {
            let prefix = "PARSE ERROR:".red().bold().to_string();
            self.emit(&prefix, message.red().to_string());
        } else {
            self.emit("PARSE ERROR:", message.to_string());
        }
    }

    pub fn parse_warning(&mut self, message: &str) {
        if self.colorize {
            let prefix = "PARSE WARNING:".yellow().bold().to_string();
            self.emit(&prefix, message.yellow().to_string());
        } else {
            self.emit("PARSE WARNING:", message.to_string());
        }
    }

    pub fn success(&mut self, message: &str) {
        let prefix = if self.colorize {
            "SUCCESS:".green().bold().to_string()
        } else {
            "SUCCESS:".to_string()
        };
        self.emit(&prefix, message.to_string());
    }

    fn emit(&mut self, prefix: &str, message: String) {
        let _ = writeln!(self.out, "{} {}", prefix, message);
    }
}
