//! The boundary between the interpreter and the outside world: where `print`
//! writes, and where `inputi`/`inputs` read from. Kept as a trait so tests can
//! swap in an in-memory double instead of touching real stdio.

use std::io::{self, BufRead, Write};

pub trait Host {
    fn print_line(&mut self, line: &str);
    fn read_line(&mut self) -> String;
}

/// The default host: real process stdout/stdin.
#[derive(Default)]
pub struct StdioHost;

impl Host for StdioHost {
    fn print_line(&mut self, line: &str) {
        println!("{}", line);
    }

    fn read_line(&mut self) -> String {
        let mut buf = String::new();
        io::stdout().flush().ok();
        io::stdin()
            .lock()
            .read_line(&mut buf)
            .expect("failed to read from stdin");
        buf.trim_end_matches(['\n', '\r']).to_string()
    }
}

/// An in-memory host for tests: records every line printed and serves input
/// from a fixed, pre-seeded queue.
#[derive(Default)]
pub struct RecordingHost {
    pub output: Vec<String>,
    pub input: std::collections::VecDeque<String>,
}

impl RecordingHost {
    pub fn with_input<I: IntoIterator<Item = String>>(lines: I) -> Self {
        RecordingHost {
            output: Vec::new(),
            input: lines.into_iter().collect(),
        }
    }
}

impl Host for RecordingHost {
    fn print_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn read_line(&mut self) -> String {
        self.input.pop_front().unwrap_or_default()
    }
}
