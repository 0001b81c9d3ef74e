//! NDJSON stream decoding.

use mindmeld_protocols::ModelError;

use crate::api::GenerateChunk;

/// Splits a byte stream into complete lines.
///
/// Bytes are buffered until a newline arrives, so lines (and UTF-8
/// sequences) split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Feed bytes, returning every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Whatever is left once the stream ends without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Decode one NDJSON line.
pub fn parse_line(line: &str) -> Result<GenerateChunk, ModelError> {
    serde_json::from_str(line)
        .map_err(|e| ModelError::InvalidResponse(format!("{e}: {line}")))
}

/// Error reported by the server inside the stream.
pub fn stream_error(message: String) -> ModelError {
    if message.to_lowercase().contains("destroyed") {
        ModelError::SessionDestroyed(message)
    } else {
        ModelError::Stream(message)
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
