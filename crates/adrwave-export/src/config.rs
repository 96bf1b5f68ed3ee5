use std::fmt;
use std::str::FromStr;

use adrwave_frame::{FrameConfig, WAVEFORMS_TOPIC_PREFIX};
use serde::Serialize;

/// Records written between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Upper bound on records written to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordCap {
    #[default]
    Unbounded,
    /// At most this many records. `Limit(0)` writes nothing.
    Limit(u64),
}

impl RecordCap {
    /// Interpret a user-facing count where 0 means unbounded.
    pub fn from_count(count: u64) -> Self {
        if count == 0 {
            Self::Unbounded
        } else {
            Self::Limit(count)
        }
    }

    /// True if a sink holding `written` records may take another one.
    pub fn allows(self, written: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limit(max) => written < max,
        }
    }
}

impl fmt::Display for RecordCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Limit(max) => write!(f, "{max}"),
        }
    }
}

/// Which channels an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelector {
    Single(u8),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid channel {input:?}: expected {expected}")]
pub struct ParseChannelError {
    input: String,
    expected: &'static str,
}

impl FromStr for ChannelSelector {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s == "-1" {
            return Ok(Self::All);
        }
        s.parse::<u8>()
            .map(Self::Single)
            .map_err(|_| ParseChannelError {
                input: s.to_string(),
                expected: "0-255, \"all\" or -1",
            })
    }
}

/// Channel left out of an all-channel export; `-1` or `none` leaves out nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludedChannel(pub Option<u8>);

impl FromStr for ExcludedChannel {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s == "-1" {
            return Ok(Self(None));
        }
        s.parse::<u8>()
            .map(|channel| Self(Some(channel)))
            .map_err(|_| ParseChannelError {
                input: s.to_string(),
                expected: "0-255, \"none\" or -1",
            })
    }
}

/// Export policy applied by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// One channel into one sink; the scan stops once `cap` is reached.
    Single { channel: u8, cap: RecordCap },
    /// Every channel except `exclude`, each into its own sink.
    All { cap: RecordCap, exclude: Option<u8> },
}

impl ExportMode {
    /// Build a mode from a selector. `exclude` only applies to `All`.
    pub fn from_selector(selector: ChannelSelector, cap: RecordCap, exclude: Option<u8>) -> Self {
        match selector {
            ChannelSelector::Single(channel) => Self::Single { channel, cap },
            ChannelSelector::All => Self::All { cap, exclude },
        }
    }

    /// Short name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::All { .. } => "all",
        }
    }
}

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub mode: ExportMode,
    pub frame: FrameConfig,
    /// Label prefix of frames holding waveform packets.
    pub waveform_prefix: String,
    /// Log progress every N written records; 0 disables progress lines.
    pub progress_interval: u64,
}

/// Exports every channel without a cap.
impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(ExportMode::All {
            cap: RecordCap::Unbounded,
            exclude: None,
        })
    }
}

impl ExportConfig {
    /// Settings for `mode` with default frame limits, prefix and progress interval.
    pub fn new(mode: ExportMode) -> Self {
        Self {
            mode,
            frame: FrameConfig::default(),
            waveform_prefix: WAVEFORMS_TOPIC_PREFIX.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Override frame reader limits.
    ///
    /// Oversized payload declarations are skipped as malformed labels.
    pub fn with_frame_config(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }

    /// Override the waveform label prefix.
    pub fn with_waveform_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.waveform_prefix = prefix.into();
        self
    }

    /// Override the progress interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }
}
