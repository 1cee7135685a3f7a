//! In-memory connection for driving the request handler.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use pathwire::http::connection::Connection;

/// Serves a fixed byte script and records everything written back.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub close_count: usize,
    /// Once the script is exhausted, block instead of reporting end of
    /// stream (a client that stops sending but keeps the socket open).
    stall: bool,
    reads: usize,
    /// Fail with `ConnectionReset` once this many bytes have been read.
    fail_reads_after: Option<usize>,
    fail_writes: bool,
}

impl ScriptedConnection {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn stalling(input: &[u8]) -> Self {
        Self {
            stall: true,
            ..Self::new(input)
        }
    }

    /// Reset the connection after `n` bytes; `0` fails the initial probe.
    pub fn failing_reads_after(mut self, n: usize) -> Self {
        self.fail_reads_after = Some(n);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn read_failure(&self) -> io::Result<()> {
        match self.fail_reads_after {
            Some(n) if self.reads >= n => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            _ => Ok(()),
        }
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Connection for ScriptedConnection {
    async fn available(&mut self) -> io::Result<bool> {
        self.read_failure()?;
        if !self.input.is_empty() {
            return Ok(true);
        }
        if self.stall {
            std::future::pending::<()>().await;
        }
        Ok(false)
    }

    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.read_failure()?;
        match self.input.pop_front() {
            Some(b) => {
                self.reads += 1;
                Ok(Some(b))
            }
            None if self.stall => {
                std::future::pending::<()>().await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        assert_eq!(self.close_count, 0, "write after close");
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.close_count += 1;
        Ok(())
    }
}

pub fn status_line(output: &str) -> &str {
    output.lines().next().unwrap_or("")
}
