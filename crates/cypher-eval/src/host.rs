//! I/O seam for the `flow` and `listen` built-ins.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Where program output goes and program input comes from.
pub trait Host {
    /// Write one complete output line (without terminator).
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Read one input line with its terminator removed.
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_terminator(buf)))
    }
}

/// In-memory host: records output lines and serves scripted input.
#[derive(Debug, Default, Clone)]
pub struct CaptureHost {
    pub output: Vec<String>,
    input: VecDeque<String>,
}

impl CaptureHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose `listen()` calls return `lines` in order, then end of input.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: Vec::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl Host for CaptureHost {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("abc\n".into()), "abc");
        assert_eq!(strip_terminator("abc\r\n".into()), "abc");
        assert_eq!(strip_terminator("abc".into()), "abc");
        assert_eq!(strip_terminator("\n".into()), "");
    }

    #[test]
    fn test_capture_host_scripted_input() {
        let mut host = CaptureHost::with_input(["one", "two"]);
        assert_eq!(host.read_line().unwrap(), Some("one".to_string()));
        assert_eq!(host.read_line().unwrap(), Some("two".to_string()));
        assert_eq!(host.read_line().unwrap(), None);
    }

    #[test]
    fn test_capture_host_records_output() {
        let mut host = CaptureHost::new();
        host.write_line("a b").unwrap();
        host.write_line("").unwrap();
        assert_eq!(host.output, vec!["a b".to_string(), String::new()]);
    }
}
