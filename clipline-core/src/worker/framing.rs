//! Incremental line framing over a raw byte stream.
//!
//! Worker output arrives in arbitrarily sized chunks that may split a line --
//! or a multi-byte UTF-8 sequence -- anywhere. The framer buffers the
//! incomplete tail at the byte layer and decodes only complete lines, so the
//! produced line sequence is identical for every chunking of the same stream.

/// Splits a byte stream into complete text lines across chunk boundaries.
#[derive(Debug, Default)]
pub struct LineFramer {
    tail: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self { tail: Vec::new() }
    }

    /// Feeds one chunk and returns every line completed by it, in order.
    ///
    /// The trailing partial line (if any) is carried over to the next call.
    /// A trailing `\r` is stripped so CRLF streams frame identically to LF.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.tail.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.tail[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + offset;
            lines.push(decode_line(&self.tail[consumed..end]));
            consumed = end + 1;
        }
        self.tail.drain(..consumed);
        lines
    }

    /// Flushes the leftover tail as one final line on stream end.
    ///
    /// Returns `None` when the stream ended exactly on a line boundary.
    pub fn finish(&mut self) -> Option<String> {
        if self.tail.is_empty() {
            None
        } else {
            let tail = std::mem::take(&mut self.tail);
            Some(decode_line(&tail))
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = match bytes.last() {
        Some(b'\r') => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    String::from_utf8_lossy(bytes).into_owned()
}
