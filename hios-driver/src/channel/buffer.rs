//! Pattern buffer with tail-search and terminal escape stripping.
//!
//! Only the last N bytes of the buffer are searched for prompt and pager
//! patterns, so long reports (full MAC tables, running configs) stay cheap.

use std::fmt;

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Collects printable output from the terminal state machine.
#[derive(Default)]
struct Printable {
    out: Vec<u8>,
}

impl Perform for Printable {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

/// Buffer for accumulating output and searching for patterns.
///
/// The escape parser keeps its state between calls to [`extend`](Self::extend),
/// so a sequence split across two SSH packets is still removed.
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    parser: Parser,
    printable: Printable,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
            printable: Printable::default(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        self.parser.advance(&mut self.printable, data);
        self.buffer.append(&mut self.printable.out);
    }

    /// Search only the tail of the buffer for the pattern.
    ///
    /// Returns `(start, end)` offsets into the full buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let offset = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[offset..])
            .map(|m| (offset + m.start(), offset + m.end()))
    }

    /// Remove a byte range, e.g. a pager marker that was answered.
    pub fn remove(&mut self, start: usize, end: usize) {
        let end = end.min(self.buffer.len());
        if start < end {
            self.buffer.drain(start..end);
        }
    }

    /// Take everything up to `end`, leaving the remainder buffered.
    pub fn split_to(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        let rest = self.buffer.split_off(end);
        std::mem::replace(&mut self.buffer, rest)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!\r\n");
        assert_eq!(buffer.as_slice(), b"Hello, world!\r\n");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"port\x1b[");
        buffer.extend(b"2Kstatus");
        assert_eq!(buffer.as_slice(), b"portstatus");
    }

    #[test]
    fn test_tail_search() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nGRS1042-CORE>");

        let pattern = Regex::new(r"GRS1042-CORE>").unwrap();
        assert_eq!(buffer.search_tail(&pattern), Some((101, 114)));
    }

    #[test]
    fn test_tail_search_not_in_tail() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"switch#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"switch#").unwrap();
        assert!(buffer.search_tail(&pattern).is_none());
        assert!(pattern.is_match(buffer.as_slice()));
    }

    #[test]
    fn test_remove_and_split() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"line1\n--More--line2\nsw>tail");

        let pager = Regex::new(r"--More--").unwrap();
        let (start, end) = buffer.search_tail(&pager).unwrap();
        buffer.remove(start, end);
        assert_eq!(buffer.as_slice(), b"line1\nline2\nsw>tail");

        let head = buffer.split_to(15);
        assert_eq!(head, b"line1\nline2\nsw>");
        assert_eq!(buffer.as_slice(), b"tail");
    }
}
