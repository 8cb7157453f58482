//! Line-oriented question/answer over any reader and writer.
//!
//! Every `ask*` method returns `Ok(None)` once the input is exhausted, so the
//! console can wind down cleanly when stdin closes.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line.
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}").or_raise(|| ErrorKind::Io)
    }

    /// Print `message` and read one trimmed line.
    pub fn ask(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{message}").or_raise(|| ErrorKind::Io)?;
        self.output.flush().or_raise(|| ErrorKind::Io)?;
        let mut line = String::new();
        match self.input.read_line(&mut line).or_raise(|| ErrorKind::Io)? {
            0 => Ok(None),
            _ => Ok(Some(line.trim().to_string())),
        }
    }

    /// Like [`ask`](Self::ask), repeating until the answer is not blank.
    pub fn ask_required(&mut self, message: &str) -> Result<Option<String>> {
        loop {
            match self.ask(message)? {
                Some(answer) if answer.is_empty() => self.say("This field is required.")?,
                answer => return Ok(answer),
            }
        }
    }

    /// Repeat until the answer parses as `T`.
    pub fn ask_parsed<T: FromStr>(&mut self, message: &str) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(message)? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say(format!("Invalid value: {answer:?}. Please try again."))?,
            }
        }
    }

    /// Like [`ask_parsed`](Self::ask_parsed), but a blank answer is accepted
    /// as `Some(None)`.
    pub fn ask_optional<T: FromStr>(&mut self, message: &str) -> Result<Option<Option<T>>> {
        loop {
            let Some(answer) = self.ask(message)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(None));
            }
            match answer.parse() {
                Ok(value) => return Ok(Some(Some(value))),
                Err(_) => self.say(format!("Invalid value: {answer:?}. Leave blank to skip."))?,
            }
        }
    }

    /// Yes/no question defaulting to no.
    pub fn confirm(&mut self, message: &str) -> Result<Option<bool>> {
        let answer = self.ask(&format!("{message} (y/N): "))?;
        Ok(answer.map(|a| matches!(a.to_lowercase().as_str(), "y" | "yes" | "s" | "sim")))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
