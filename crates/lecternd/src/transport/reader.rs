//! Bounded line reading for the inbound stream.

use std::io::{self, BufRead};

/// One unit read from the inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inbound {
    /// A complete line without its terminator.
    Line(Vec<u8>),
    /// A line longer than the limit; its bytes were discarded.
    Oversize {
        /// Length of the discarded line in bytes.
        size: usize,
    },
}

/// Reads newline-delimited frames, never buffering more than `max_bytes` of
/// a single line.
pub(crate) struct LineReader<R> {
    inner: R,
    max_bytes: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R, max_bytes: usize) -> Self {
        Self { inner, max_bytes }
    }

    /// Returns the next line, or `None` at end of input.
    ///
    /// A final line without a terminator is still returned. An oversize line
    /// is skipped through to its newline so the stream stays in frame.
    pub(crate) fn next_line(&mut self) -> io::Result<Option<Inbound>> {
        let mut line = Vec::new();
        let mut size = 0_usize;
        let mut seen = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buffer) => buffer,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            if available.is_empty() {
                return Ok(seen.then(|| self.frame(line, size)));
            }
            seen = true;

            let newline = available.iter().position(|byte| *byte == b'\n');
            let chunk = match newline {
                Some(position) => available.get(..position).unwrap_or_default(),
                None => available,
            };
            size = size.saturating_add(chunk.len());
            if size <= self.max_bytes {
                line.extend_from_slice(chunk);
            } else {
                line.clear();
            }

            let consumed = chunk.len() + usize::from(newline.is_some());
            self.inner.consume(consumed);
            if newline.is_some() {
                return Ok(Some(self.frame(line, size)));
            }
        }
    }

    fn frame(&self, line: Vec<u8>, size: usize) -> Inbound {
        if size > self.max_bytes {
            Inbound::Oversize { size }
        } else {
            Inbound::Line(line)
        }
    }
}
