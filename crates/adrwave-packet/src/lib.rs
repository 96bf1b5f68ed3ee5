//! Waveform packet codec for ABCD digitizer payloads.
//!
//! A waveform frame's payload holds one or more packets packed back to back.
//! Each packet is a fixed 14-byte little-endian header followed by
//! `samples_number` unsigned 16-bit samples. The last four samples are
//! hardware padding and are removed on decode.
//!
//! Decoding never fails a scan: an incomplete trailing packet ends the
//! payload and is reported through [`PacketDecoder::truncation`].

pub mod decoder;
pub mod error;
pub mod layout;
pub mod packet;

pub use decoder::{decode_packet, decode_payload, DecodedPayload, PacketDecoder};
pub use error::{PacketError, Result};
pub use layout::{PacketHeader, HEADER_SIZE, PADDING_SAMPLES, SAMPLE_SIZE};
pub use packet::{encode_packet, trim_padding, WaveformPacket};
