//! Byte-at-a-time request line parser.
//!
//! Only the request target of the first line is consumed. Bytes after the
//! terminating delimiter (version, headers, body) are never read.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, timeout_at};

use crate::http::connection::Connection;
use crate::http::request::ParsedRequest;

/// Default bound on request-line bytes consumed by the parser.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    /// Input ended before the request line was complete, or the target was
    /// not valid UTF-8.
    #[error("malformed request line")]
    Malformed,
    #[error("request line exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("request line not received within {0:?}")]
    Timeout(Duration),
    #[error("connection error while reading request: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingMethod,
    InPath,
    InParams,
    Complete,
}

impl ParseState {
    pub fn is_delimiter(byte: u8) -> bool {
        matches!(byte, b' ' | b'\r' | b'\n' | b'?')
    }

    /// Transition taken on a delimiter byte.
    ///
    /// A path ended by anything but `?` skips `InParams` and completes
    /// directly.
    pub fn advance(self, delimiter: u8) -> Self {
        match self {
            ParseState::AwaitingMethod => ParseState::InPath,
            ParseState::InPath if delimiter == b'?' => ParseState::InParams,
            ParseState::InPath => ParseState::Complete,
            ParseState::InParams | ParseState::Complete => ParseState::Complete,
        }
    }
}

/// Outcome of feeding bytes to a [`RequestLine`].
#[derive(Debug, PartialEq, Eq)]
pub enum Progress {
    NeedMore,
    Done,
}

/// Accumulates the path and params of one request line.
#[derive(Debug)]
pub struct RequestLine {
    state: ParseState,
    path: Vec<u8>,
    params: Vec<u8>,
    consumed: usize,
    limit: usize,
}

impl RequestLine {
    pub fn new(limit: usize) -> Self {
        Self {
            state: ParseState::AwaitingMethod,
            path: Vec::new(),
            params: Vec::new(),
            consumed: 0,
            limit,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn push(&mut self, byte: u8) -> Result<Progress, ParseError> {
        if self.state == ParseState::Complete {
            return Ok(Progress::Done);
        }
        self.consumed += 1;
        if self.consumed > self.limit {
            return Err(ParseError::TooLarge { limit: self.limit });
        }

        if ParseState::is_delimiter(byte) {
            self.state = self.state.advance(byte);
            tracing::trace!(state = ?self.state, "request parser advanced");
            return Ok(match self.state {
                ParseState::Complete => Progress::Done,
                _ => Progress::NeedMore,
            });
        }

        match self.state {
            ParseState::InPath => self.path.push(byte),
            ParseState::InParams => self.params.push(byte),
            ParseState::AwaitingMethod | ParseState::Complete => {}
        }
        Ok(Progress::NeedMore)
    }

    pub fn finish(self) -> Result<ParsedRequest, ParseError> {
        if self.state != ParseState::Complete {
            return Err(ParseError::Malformed);
        }
        let path = String::from_utf8(self.path).map_err(|_| ParseError::Malformed)?;
        let params = String::from_utf8(self.params).map_err(|_| ParseError::Malformed)?;
        Ok(ParsedRequest::new(path, params))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestParser {
    max_request_bytes: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUEST_BYTES)
    }
}

impl RequestParser {
    pub fn new(max_request_bytes: usize) -> Self {
        Self { max_request_bytes }
    }

    /// Parses a complete request line held in memory.
    pub fn feed(&self, input: &[u8]) -> Result<ParsedRequest, ParseError> {
        let mut line = RequestLine::new(self.max_request_bytes);
        for &byte in input {
            if line.push(byte)? == Progress::Done {
                break;
            }
        }
        line.finish()
    }

    /// Reads the request line from `conn`, one byte at a time, until it is
    /// complete or `deadline` passes.
    pub async fn parse<C: Connection>(
        &self,
        conn: &mut C,
        deadline: Instant,
    ) -> Result<ParsedRequest, ParseError> {
        let started = Instant::now();
        let mut line = RequestLine::new(self.max_request_bytes);

        loop {
            let next = timeout_at(deadline, conn.read_byte())
                .await
                .map_err(|_| ParseError::Timeout(deadline.saturating_duration_since(started)))??;

            match next {
                Some(byte) => {
                    if line.push(byte)? == Progress::Done {
                        break;
                    }
                }
                None => break,
            }
        }

        line.finish()
    }
}
