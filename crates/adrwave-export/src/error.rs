use std::path::PathBuf;

/// Errors that abort an export or scan.
///
/// Framing and decoding irregularities never show up here; the reader and
/// decoder skip them.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The input file could not be opened.
    #[error("cannot open input {path:?}: {source}")]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("cannot create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A channel's output could not be created.
    #[error("cannot create output {destination} for channel {channel}: {source}")]
    SinkCreate {
        channel: u8,
        destination: String,
        source: std::io::Error,
    },

    /// Writing or flushing a channel's output failed.
    #[error("cannot write output for channel {channel}: {source}")]
    SinkWrite { channel: u8, source: std::io::Error },

    /// Reading the input stream failed.
    #[error("frame error: {0}")]
    Frame(#[from] adrwave_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, ExportError>;
