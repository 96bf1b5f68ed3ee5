/// Reasons a waveform packet cannot be decoded or encoded.
///
/// Decoding errors describe a truncated tail; the payload decoder stops at
/// them rather than failing the scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// Fewer bytes remain than a packet header needs.
    #[error("incomplete packet header ({available} of {needed} bytes)")]
    IncompleteHeader { needed: usize, available: usize },

    /// The header declares more samples than the buffer holds.
    #[error("incomplete sample block ({declared} samples need {needed} bytes, {available} available)")]
    IncompleteSamples {
        declared: u32,
        needed: usize,
        available: usize,
    },

    /// A sample sequence too long for the 32-bit count field.
    #[error("too many samples for one packet ({count})")]
    TooManySamples { count: usize },
}

pub type Result<T> = std::result::Result<T, PacketError>;
