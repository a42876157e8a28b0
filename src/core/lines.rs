//! Line streaming for log files
//!
//! Log files are not guaranteed to be valid UTF-8 (binary payloads, mixed
//! encodings after rotation), so lines are decoded lossily instead of
//! failing the whole read the way `BufRead::lines` would.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::error::{LogError, Result};

/// Read buffer size for log scanning (64 KB)
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Iterator over the lines of a reader, with `\n` / `\r\n` stripped.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl LineReader<BufReader<File>> {
    /// Open a file for line streaming
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LogError::io(path, e))?;
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &[u8]) -> Vec<String> {
        LineReader::new(Cursor::new(input.to_vec()))
            .map(|l| l.unwrap())
            .collect()
    }

    #[test]
    fn test_splits_lines_and_strips_terminators() {
        assert_eq!(collect(b"a\nb\r\nc"), vec!["a", "b", "c"]);
        assert_eq!(collect(b"a\n"), vec!["a"]);
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn test_keeps_blank_lines() {
        assert_eq!(collect(b"a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let lines = collect(b"ok\n\xff\xfe bad\n");
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{FFFD}'));
        assert!(lines[1].ends_with(" bad"));
    }

    #[test]
    fn test_open_missing_file_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing.log");
        let err = LineReader::open(&missing).err().unwrap();
        assert_eq!(err.code(), "IO_ERROR");
        assert!(err.to_string().contains("missing.log"));
    }
}
