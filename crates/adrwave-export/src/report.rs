use adrwave_frame::ReaderStats;
use serde::Serialize;

/// Records exported for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub channel: u8,
    pub records: u64,
    pub dropped_at_cap: u64,
    pub destination: String,
}

/// Outcome of one export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub mode: &'static str,
    pub channels: Vec<ChannelReport>,
    #[serde(flatten)]
    pub stream: ReaderStats,
    pub waveform_frames: u64,
    pub packets: u64,
    /// Waveform payloads that ended in an incomplete packet.
    pub truncated_payloads: u64,
    pub excluded_records: u64,
    /// True if the single-channel cap ended the scan.
    pub stopped_early: bool,
    pub elapsed_ms: u64,
}

impl ExportReport {
    /// Records written across all channels.
    pub fn total_records(&self) -> u64 {
        self.channels.iter().map(|c| c.records).sum()
    }
}

/// Frames seen under one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicReport {
    pub topic: String,
    pub kind: &'static str,
    pub frames: u64,
    pub payload_bytes: u64,
}

/// Waveform packets seen on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSurvey {
    pub channel: u8,
    pub packets: u64,
    /// Smallest and largest trimmed sample count.
    pub min_samples: usize,
    pub max_samples: usize,
}

/// Read-only survey of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    #[serde(flatten)]
    pub stream: ReaderStats,
    pub topics: Vec<TopicReport>,
    pub channels: Vec<ChannelSurvey>,
    pub truncated_payloads: u64,
    pub elapsed_ms: u64,
}
