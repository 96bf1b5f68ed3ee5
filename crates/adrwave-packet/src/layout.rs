//! Binary layout of one waveform packet.
//!
//! All multi-byte fields are little-endian, as written by the digitizer
//! host. The layout is a compatibility contract with recorded files.
//!
//! ```text
//! offset  width  field
//! 0       8      timestamp       u64 LE
//! 8       1      channel         u8
//! 9       4      samples_number  u32 LE
//! 13      1      gates_number    u8
//! 14      2*n    samples         u16 LE each
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{PacketError, Result};

pub const TIMESTAMP_OFFSET: usize = 0;
pub const CHANNEL_OFFSET: usize = 8;
pub const SAMPLES_NUMBER_OFFSET: usize = 9;
pub const GATES_NUMBER_OFFSET: usize = 13;

/// Fixed header size: timestamp (8) + channel (1) + samples_number (4) + gates_number (1).
pub const HEADER_SIZE: usize = 14;

/// Width of one sample.
pub const SAMPLE_SIZE: usize = 2;

/// Trailing samples the hardware appends to every waveform.
pub const PADDING_SAMPLES: usize = 4;

/// The fixed-size part of a waveform packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Opaque ordering key from the digitizer clock.
    pub timestamp: u64,
    /// Digitizer channel.
    pub channel: u8,
    /// Declared number of samples following the header.
    pub samples_number: u32,
    /// Number of gates; carried but not interpreted.
    pub gates_number: u8,
}

impl PacketHeader {
    /// Read a header from the start of `buf`.
    pub fn read_from(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(PacketError::IncompleteHeader {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }

        let mut src = &buf[..HEADER_SIZE];
        let timestamp = src.get_u64_le();
        let channel = src.get_u8();
        let samples_number = src.get_u32_le();
        let gates_number = src.get_u8();

        Ok(Self {
            timestamp,
            channel,
            samples_number,
            gates_number,
        })
    }

    /// Append the header to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_u64_le(self.timestamp);
        dst.put_u8(self.channel);
        dst.put_u32_le(self.samples_number);
        dst.put_u8(self.gates_number);
    }

    /// Bytes occupied by the declared sample block, if addressable.
    pub fn sample_block_len(&self) -> Option<usize> {
        usize::try_from(self.samples_number)
            .ok()?
            .checked_mul(SAMPLE_SIZE)
    }
}
