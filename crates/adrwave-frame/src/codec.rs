use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::topic::WAVEFORMS_TOPIC_PREFIX;

/// Byte that terminates a frame label.
pub const SEPARATOR: u8 = b' ';

/// Marker that introduces the decimal payload length at the end of a label.
pub const LENGTH_MARKER: &[u8; 2] = b"_s";

/// Default maximum payload size: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Default number of trailing label bytes kept while scanning: 4 KiB.
pub const DEFAULT_MAX_LABEL_LEN: usize = 4 * 1024;

/// A labeled, length-delimited unit recovered from an ADR stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The full label, including the `_s<N>` length marker.
    pub label: String,
    /// Exactly `N` payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(label: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }

    /// The label text in front of the final length marker.
    pub fn topic(&self) -> &str {
        match rfind_marker(self.label.as_bytes()) {
            Some(idx) => &self.label[..idx],
            None => &self.label,
        }
    }

    /// True if the label starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.label.starts_with(prefix)
    }

    /// True if the label carries waveform packets.
    pub fn is_waveforms(&self) -> bool {
        self.has_prefix(WAVEFORMS_TOPIC_PREFIX)
    }

    /// The total wire size of this frame (label + separator + payload).
    pub fn wire_size(&self) -> usize {
        self.label.len() + 1 + self.payload.len()
    }
}

/// Extract the payload length declared by a label.
///
/// The length is the text after the rightmost `_s`. It must be a non-empty
/// run of ASCII digits that fits in `usize`; anything else returns `None`.
pub fn parse_payload_len(label: &[u8]) -> Option<usize> {
    let idx = rfind_marker(label)?;
    let digits = &label[idx + LENGTH_MARKER.len()..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

fn rfind_marker(label: &[u8]) -> Option<usize> {
    label.windows(LENGTH_MARKER.len()).rposition(|w| w == LENGTH_MARKER)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────┬─────┬──────────────────┐
/// │ Label                │ " " │ Payload          │
/// │ <topic>_s<N> (ASCII) │     │ (N bytes)        │
/// └──────────────────────┴─────┴──────────────────┘
/// ```
pub fn encode_frame(topic: &str, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if topic.as_bytes().contains(&SEPARATOR) {
        return Err(FrameError::InvalidTopic {
            topic: topic.to_string(),
            reason: "topic must not contain a space",
        });
    }
    let len = payload.len().to_string();
    dst.reserve(topic.len() + LENGTH_MARKER.len() + len.len() + 1 + payload.len());
    dst.put_slice(topic.as_bytes());
    dst.put_slice(LENGTH_MARKER);
    dst.put_slice(len.as_bytes());
    dst.put_u8(SEPARATOR);
    dst.put_slice(payload);
    Ok(())
}

/// Configuration for the frame reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest declared payload accepted. Larger declarations are treated as
    /// malformed labels. Default: 64 MiB.
    pub max_payload_size: usize,
    /// Number of trailing label bytes kept while looking for a separator.
    /// Default: 4 KiB.
    pub max_label_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}
