/// Errors that can occur while reading or writing ADR frames.
///
/// Malformed and truncated frames are not errors: the reader skips them.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A topic cannot be written as a frame label.
    #[error("invalid frame topic {topic:?}: {reason}")]
    InvalidTopic { topic: String, reason: &'static str },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
