use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use adrwave_frame::{FrameConfig, FrameReader, TopicKind};
use adrwave_packet::PacketDecoder;

use crate::error::{ExportError, Result};
use crate::export::READ_BUFFER_CAPACITY;
use crate::report::{ChannelSurvey, ScanReport, TopicReport};

/// Distinct topics listed by name in a [`ScanReport`]. Later topics are
/// grouped under [`OVERFLOW_TOPIC`], one entry per [`TopicKind`].
pub const MAX_DISTINCT_TOPICS: usize = 256;

/// Topic name of the per-kind overflow entries.
pub const OVERFLOW_TOPIC: &str = "*";

fn topic_report(topic: String, kind: TopicKind) -> TopicReport {
    TopicReport {
        topic,
        kind: kind.name(),
        frames: 0,
        payload_bytes: 0,
    }
}

/// Survey a stream without writing anything.
///
/// Counts frames per topic and decodes every frame whose label starts with
/// `waveform_prefix` to count packets per channel.
pub fn scan_stream<R: BufRead>(
    source: R,
    config: FrameConfig,
    waveform_prefix: &str,
) -> Result<ScanReport> {
    let start = Instant::now();
    let mut reader = FrameReader::with_config(source, config);
    let mut topics: BTreeMap<String, TopicReport> = BTreeMap::new();
    let mut overflow: BTreeMap<TopicKind, TopicReport> = BTreeMap::new();
    let mut channels: BTreeMap<u8, ChannelSurvey> = BTreeMap::new();
    let mut truncated_payloads = 0u64;

    while let Some(frame) = reader.read_frame()? {
        let topic = frame.topic();
        let kind = TopicKind::of(&frame.label);
        let entry = if topics.contains_key(topic) || topics.len() < MAX_DISTINCT_TOPICS {
            topics
                .entry(topic.to_string())
                .or_insert_with(|| topic_report(topic.to_string(), kind))
        } else {
            overflow.entry(kind).or_insert_with(|| {
                tracing::debug!(
                    kind = kind.name(),
                    limit = MAX_DISTINCT_TOPICS,
                    "too many distinct topics; grouping new ones by kind"
                );
                topic_report(OVERFLOW_TOPIC.to_string(), kind)
            })
        };
        entry.frames += 1;
        entry.payload_bytes += frame.payload.len() as u64;

        if !frame.has_prefix(waveform_prefix) {
            continue;
        }

        let mut packets = PacketDecoder::new(&frame.payload);
        for packet in packets.by_ref() {
            let len = packet.samples.len();
            let survey = channels
                .entry(packet.channel)
                .or_insert_with(|| ChannelSurvey {
                    channel: packet.channel,
                    packets: 0,
                    min_samples: len,
                    max_samples: len,
                });
            survey.packets += 1;
            survey.min_samples = survey.min_samples.min(len);
            survey.max_samples = survey.max_samples.max(len);
        }
        if packets.truncation().is_some() {
            truncated_payloads += 1;
        }
    }

    Ok(ScanReport {
        stream: reader.stats(),
        topics: topics.into_values().chain(overflow.into_values()).collect(),
        channels: channels.into_values().collect(),
        truncated_payloads,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

/// Survey the ADR file at `input`.
pub fn scan_file(input: &Path, config: FrameConfig, waveform_prefix: &str) -> Result<ScanReport> {
    let file = File::open(input).map_err(|source| ExportError::SourceOpen {
        path: input.to_path_buf(),
        source,
    })?;
    scan_stream(
        BufReader::with_capacity(READ_BUFFER_CAPACITY, file),
        config,
        waveform_prefix,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use adrwave_frame::{FrameWriter, WAVEFORMS_TOPIC_PREFIX};
    use adrwave_packet::encode_packet;
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn counts_topics_and_channels() {
        let mut payload = BytesMut::new();
        encode_packet(1, 0, 1, &[1, 2, 3, 4, 5, 6], &mut payload).unwrap();
        encode_packet(2, 0, 1, &[1, 2, 3, 4, 5, 6, 7, 8], &mut payload).unwrap();
        encode_packet(3, 5, 1, &[1], &mut payload).unwrap();

        let mut writer = FrameWriter::new(Vec::new());
        writer.write_frame("status_abcd", b"{}").unwrap();
        writer.write_frame("data_abcd_waveforms_v0", &payload).unwrap();
        writer.write_frame("status_abcd", b"{}").unwrap();
        writer.write_raw(b"junk ").unwrap();

        let report = scan_stream(
            Cursor::new(writer.into_inner()),
            FrameConfig::default(),
            WAVEFORMS_TOPIC_PREFIX,
        )
        .unwrap();

        assert_eq!(report.stream.frames, 3);
        assert_eq!(report.stream.skipped_unmarked, 1);
        assert_eq!(report.topics.len(), 2);
        assert_eq!(report.topics[0].topic, "data_abcd_waveforms_v0");
        assert_eq!(report.topics[0].kind, "WAVEFORMS");
        assert_eq!(report.topics[1].frames, 2);
        assert_eq!(report.topics[1].kind, "STATUS");

        assert_eq!(
            report.channels,
            vec![
                ChannelSurvey {
                    channel: 0,
                    packets: 2,
                    min_samples: 2,
                    max_samples: 4,
                },
                ChannelSurvey {
                    channel: 5,
                    packets: 1,
                    min_samples: 1,
                    max_samples: 1,
                },
            ]
        );
        assert_eq!(report.truncated_payloads, 0);
    }

    #[test]
    fn distinct_topics_are_bounded() {
        let mut writer = FrameWriter::new(Vec::new());
        for i in 0..MAX_DISTINCT_TOPICS + 10 {
            writer.write_frame(&format!("junk{i}"), b"x").unwrap();
        }
        writer.write_frame("status_abcd_late", b"{}").unwrap();
        writer.write_frame("junk0", b"yy").unwrap();

        let report = scan_stream(
            Cursor::new(writer.into_inner()),
            FrameConfig::default(),
            WAVEFORMS_TOPIC_PREFIX,
        )
        .unwrap();

        assert_eq!(report.topics.len(), MAX_DISTINCT_TOPICS + 2);
        let junk0 = report.topics.iter().find(|t| t.topic == "junk0").unwrap();
        assert_eq!(junk0.frames, 2);

        let grouped: Vec<_> = report.topics.iter().filter(|t| t.topic == OVERFLOW_TOPIC).collect();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].kind, "STATUS");
        assert_eq!(grouped[0].frames, 1);
        assert_eq!(grouped[1].kind, "OTHER");
        assert_eq!(grouped[1].frames, 10);
        assert_eq!(grouped[1].payload_bytes, 10);
        assert_eq!(report.stream.frames, MAX_DISTINCT_TOPICS as u64 + 12);
    }

    #[test]
    fn scan_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_file(
            &dir.path().join("nope.adr"),
            FrameConfig::default(),
            WAVEFORMS_TOPIC_PREFIX,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::SourceOpen { .. }));
    }
}
