// MIT License
// Copyright (c) 2024 Graham King

use std::io;

/// The operator's side of an interactive session
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: io::BufRead, W: io::Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Print `msg` and read back one trimmed line. None at end of input.
    pub fn prompt(&mut self, msg: &str) -> io::Result<Option<String>> {
        write!(self.output, "{msg}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Read a menu choice, trimmed and lowercased
    pub fn choice(&mut self, msg: &str) -> io::Result<Option<String>> {
        Ok(self.prompt(msg)?.map(|c| c.to_lowercase()))
    }

    pub fn say(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.output, "{msg}")
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
