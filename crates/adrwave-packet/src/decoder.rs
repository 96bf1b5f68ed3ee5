use bytes::Buf;

use crate::error::{PacketError, Result};
use crate::layout::{PacketHeader, HEADER_SIZE};
use crate::packet::WaveformPacket;

/// Decode one packet from the start of `buf`.
///
/// Returns the packet and the number of bytes it occupied.
pub fn decode_packet(buf: &[u8]) -> Result<(WaveformPacket, usize)> {
    let header = PacketHeader::read_from(buf)?;
    let available = buf.len() - HEADER_SIZE;

    let block_len = match header.sample_block_len() {
        Some(len) if len <= available => len,
        needed => {
            return Err(PacketError::IncompleteSamples {
                declared: header.samples_number,
                needed: needed.unwrap_or(usize::MAX),
                available,
            })
        }
    };

    let mut src = &buf[HEADER_SIZE..HEADER_SIZE + block_len];
    let mut samples = Vec::with_capacity(header.samples_number as usize);
    while src.has_remaining() {
        samples.push(src.get_u16_le());
    }

    Ok((WaveformPacket::from_raw(header, samples), HEADER_SIZE + block_len))
}

/// Iterates over the packets packed back to back in one payload.
///
/// Stops at the end of the buffer or at the first incomplete packet; the
/// rest of the buffer is then left unread and [`truncation`] says why.
///
/// [`truncation`]: PacketDecoder::truncation
#[derive(Debug, Clone)]
pub struct PacketDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
    truncation: Option<PacketError>,
}

impl<'a> PacketDecoder<'a> {
    /// Start decoding at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            truncation: None,
        }
    }

    /// Bytes consumed by the packets decoded so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Why decoding stopped before the end of the buffer, if it did.
    pub fn truncation(&self) -> Option<&PacketError> {
        self.truncation.as_ref()
    }

    /// Bytes left unread after the last complete packet.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl Iterator for PacketDecoder<'_> {
    type Item = WaveformPacket;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncation.is_some() || self.pos >= self.buf.len() {
            return None;
        }

        match decode_packet(&self.buf[self.pos..]) {
            Ok((packet, consumed)) => {
                self.pos += consumed;
                Some(packet)
            }
            Err(err) => {
                tracing::debug!(
                    offset = self.pos,
                    discarded = self.remaining(),
                    error = %err,
                    "discarding incomplete waveform packet"
                );
                self.truncation = Some(err);
                None
            }
        }
    }
}

/// All packets of one payload plus where decoding stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPayload {
    pub packets: Vec<WaveformPacket>,
    /// Cursor position after the last complete packet.
    pub consumed: usize,
    pub truncation: Option<PacketError>,
}

/// Decode every complete packet in `buf`.
pub fn decode_payload(buf: &[u8]) -> DecodedPayload {
    let mut decoder = PacketDecoder::new(buf);
    let packets = decoder.by_ref().collect();
    DecodedPayload {
        packets,
        consumed: decoder.position(),
        truncation: decoder.truncation,
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::packet::encode_packet;

    fn payload(packets: &[(u64, u8, &[u16])]) -> BytesMut {
        let mut buf = BytesMut::new();
        for (timestamp, channel, samples) in packets {
            encode_packet(*timestamp, *channel, 1, samples, &mut buf).unwrap();
        }
        buf
    }

    #[test]
    fn decode_single_packet() {
        let buf = payload(&[(99, 7, &[10, 20, 30, 40, 50, 60, 70, 80])]);
        let (packet, consumed) = decode_packet(&buf).unwrap();

        assert_eq!(consumed, buf.len());
        assert_eq!(packet.timestamp, 99);
        assert_eq!(packet.channel, 7);
        assert_eq!(packet.samples_number, 8);
        assert_eq!(packet.gates_number, 1);
        assert_eq!(packet.samples, vec![10, 20, 30, 40]);
    }

    #[test]
    fn short_packet_is_not_trimmed() {
        let buf = payload(&[(1, 7, &[1, 2, 3])]);
        let (packet, _) = decode_packet(&buf).unwrap();
        assert_eq!(packet.samples, vec![1, 2, 3]);
    }

    #[test]
    fn decode_many_packed_packets() {
        let raw: Vec<Vec<u16>> = (0..12u16)
            .map(|n| (0..n).map(|s| s * 100 + n).collect())
            .collect();
        let specs: Vec<(u64, u8, &[u16])> = raw
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u64, (i % 4) as u8, s.as_slice()))
            .collect();
        let buf = payload(&specs);

        let decoded = decode_payload(&buf);
        assert_eq!(decoded.packets.len(), raw.len());
        assert_eq!(decoded.consumed, buf.len());
        assert!(decoded.truncation.is_none());

        for (packet, samples) in decoded.packets.iter().zip(&raw) {
            let expected = if samples.len() >= 4 {
                &samples[..samples.len() - 4]
            } else {
                &samples[..]
            };
            assert_eq!(packet.samples, expected);
            assert_eq!(packet.samples_number as usize, samples.len());
        }
    }

    #[test]
    fn empty_payload_yields_nothing() {
        let decoded = decode_payload(&[]);
        assert!(decoded.packets.is_empty());
        assert_eq!(decoded.consumed, 0);
        assert!(decoded.truncation.is_none());
    }

    #[test]
    fn incomplete_header_tail_is_discarded() {
        let mut buf = payload(&[(1, 2, &[5, 6, 7, 8, 9])]);
        let complete = buf.len();
        buf.put_slice(&[0xAA; 13]);

        let decoded = decode_payload(&buf);
        assert_eq!(decoded.packets.len(), 1);
        assert_eq!(decoded.consumed, complete);
        assert_eq!(
            decoded.truncation,
            Some(PacketError::IncompleteHeader {
                needed: HEADER_SIZE,
                available: 13
            })
        );
    }

    #[test]
    fn incomplete_sample_block_is_discarded() {
        let mut buf = payload(&[(1, 2, &[5, 6, 7, 8, 9]), (2, 3, &[1, 2, 3, 4, 5, 6])]);
        buf.truncate(buf.len() - 1);

        let mut decoder = PacketDecoder::new(&buf);
        let first = decoder.next().unwrap();
        assert_eq!(first.channel, 2);
        assert!(decoder.next().is_none());
        assert!(matches!(
            decoder.truncation(),
            Some(PacketError::IncompleteSamples {
                declared: 6,
                needed: 12,
                available: 11
            })
        ));
        assert_eq!(decoder.remaining(), HEADER_SIZE + 11);
        assert!(decoder.next().is_none());
    }

    #[test]
    fn huge_declared_count_does_not_overread() {
        let mut buf = BytesMut::new();
        PacketHeader {
            timestamp: 0,
            channel: 1,
            samples_number: u32::MAX,
            gates_number: 0,
        }
        .write_to(&mut buf);
        buf.put_u16_le(1);

        let decoded = decode_payload(&buf);
        assert!(decoded.packets.is_empty());
        assert_eq!(decoded.consumed, 0);
        assert!(matches!(
            decoded.truncation,
            Some(PacketError::IncompleteSamples { declared: u32::MAX, .. })
        ));
    }

    #[test]
    fn zero_sample_packets() {
        let buf = payload(&[(1, 0, &[]), (2, 1, &[])]);
        let decoded = decode_payload(&buf);

        assert_eq!(decoded.packets.len(), 2);
        assert!(decoded.packets.iter().all(|p| p.samples.is_empty()));
        assert_eq!(decoded.consumed, 2 * HEADER_SIZE);
    }
}
