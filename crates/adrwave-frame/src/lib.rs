//! Streaming reader for ADR frame streams.
//!
//! An ADR file is an append-only sequence of `<label> <payload>` units with
//! no file header, footer or index. Each label ends in `_s<N>`, the decimal
//! byte length of the payload following the separating space.
//!
//! The reader is forward-only and skips anything it cannot frame: labels
//! without a length marker, and payloads cut short by the end of the file.

pub mod codec;
pub mod error;
pub mod reader;
pub mod topic;
pub mod writer;

pub use codec::{
    encode_frame, parse_payload_len, Frame, FrameConfig, DEFAULT_MAX_LABEL_LEN,
    DEFAULT_MAX_PAYLOAD, LENGTH_MARKER, SEPARATOR,
};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, ReaderStats};
pub use topic::{TopicKind, EVENTS_TOPIC_PREFIX, STATUS_TOPIC_PREFIX, WAVEFORMS_TOPIC_PREFIX};
pub use writer::FrameWriter;
