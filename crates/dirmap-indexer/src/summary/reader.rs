//! Bounded content reads.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default content window per file in bytes.
pub const DEFAULT_WINDOW_BYTES: usize = 8192;

/// A single line may overrun the window, but never past this multiple of it.
const HARD_CAP_FACTOR: usize = 4;

const BINARY_MESSAGE: &str = "Binary file, content not summarized.";
const DECODE_MESSAGE: &str = "Unable to decode file as UTF-8.";

/// Source of file content for summarization.
pub trait ContentReader {
    /// Read whole lines from the start of `path` until at least
    /// `window_bytes` bytes have been consumed or the file ends.
    fn read_window(&self, path: &Path, window_bytes: usize) -> io::Result<Vec<String>>;
}

/// Reads content from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read_window(&self, path: &Path, window_bytes: usize) -> io::Result<Vec<String>> {
        let file = File::open(path)?;
        let cap = window_bytes.saturating_mul(HARD_CAP_FACTOR) as u64;
        let mut reader = BufReader::new(file.take(cap));

        let mut buf = Vec::new();
        while buf.len() < window_bytes {
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
        }

        decode_lines(&buf)
    }
}

fn decode_lines(buf: &[u8]) -> io::Result<Vec<String>> {
    if buf.contains(&0) {
        return Err(io::Error::new(io::ErrorKind::InvalidData, BINARY_MESSAGE));
    }

    let text = match std::str::from_utf8(buf) {
        Ok(text) => text,
        // Window ended inside a multi-byte character
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&buf[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => {
            return Err(io::Error::new(io::ErrorKind::InvalidData, DECODE_MESSAGE));
        }
    };

    Ok(text.lines().map(str::to_string).collect())
}

/// Human-readable message for a failed content read.
pub(crate) fn describe_read_error(e: &io::Error) -> String {
    match e.kind() {
        io::ErrorKind::InvalidData => e.to_string(),
        _ => format!("Unable to read file: {}", e),
    }
}
