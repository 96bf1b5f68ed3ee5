use bytes::{BufMut, BytesMut};

use crate::error::{PacketError, Result};
use crate::layout::{PacketHeader, PADDING_SAMPLES, SAMPLE_SIZE};

/// One decoded waveform with its hardware padding removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformPacket {
    /// Opaque ordering key from the digitizer clock.
    pub timestamp: u64,
    /// Digitizer channel; selects the output sink.
    pub channel: u8,
    /// Sample count declared in the header, before trimming.
    pub samples_number: u32,
    /// Number of gates; carried but not interpreted.
    pub gates_number: u8,
    /// Unscaled samples, trimmed.
    pub samples: Vec<u16>,
}

impl WaveformPacket {
    /// Build a packet from a decoded header and its raw samples.
    ///
    /// The trailing padding is removed here, so every packet is final.
    pub fn from_raw(header: PacketHeader, mut samples: Vec<u16>) -> Self {
        trim_padding(&mut samples);
        Self {
            timestamp: header.timestamp,
            channel: header.channel,
            samples_number: header.samples_number,
            gates_number: header.gates_number,
            samples,
        }
    }
}

/// Drop the last [`PADDING_SAMPLES`] values. Shorter sequences are kept whole.
pub fn trim_padding(samples: &mut Vec<u16>) {
    if samples.len() >= PADDING_SAMPLES {
        samples.truncate(samples.len() - PADDING_SAMPLES);
    }
}

/// Encode one packet with its raw (untrimmed) samples.
pub fn encode_packet(
    timestamp: u64,
    channel: u8,
    gates_number: u8,
    raw_samples: &[u16],
    dst: &mut BytesMut,
) -> Result<()> {
    let samples_number =
        u32::try_from(raw_samples.len()).map_err(|_| PacketError::TooManySamples {
            count: raw_samples.len(),
        })?;

    let header = PacketHeader {
        timestamp,
        channel,
        samples_number,
        gates_number,
    };
    header.write_to(dst);

    dst.reserve(raw_samples.len() * SAMPLE_SIZE);
    for &sample in raw_samples {
        dst.put_u16_le(sample);
    }
    Ok(())
}
