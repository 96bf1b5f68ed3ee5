//! Decode ABCD `.adr` acquisition files and export waveforms per channel.
//!
//! # Crate Structure
//!
//! - [`frame`] - Streaming reader for `<label>_s<N> <payload>` frames
//! - [`packet`] - Waveform packet layout and payload decoder
//! - [`export`] - Channel routing, CSV sinks and the export driver (behind `export` feature)

/// Re-export frame types.
pub mod frame {
    pub use adrwave_frame::*;
}

/// Re-export packet types.
pub mod packet {
    pub use adrwave_packet::*;
}

/// Re-export export types (requires `export` feature).
#[cfg(feature = "export")]
pub mod export {
    pub use adrwave_export::*;
}
