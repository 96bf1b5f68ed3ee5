//! Topic prefixes published by the ABCD acquisition system.
//!
//! Only waveform frames carry data this workspace decodes. The other
//! prefixes are recognized so stream surveys can group frames by kind.

/// Packed waveform packets.
pub const WAVEFORMS_TOPIC_PREFIX: &str = "data_abcd_waveforms";

/// Packed energy/timestamp events.
pub const EVENTS_TOPIC_PREFIX: &str = "data_abcd_events";

/// Periodic status documents.
pub const STATUS_TOPIC_PREFIX: &str = "status_abcd";

/// Classification of a frame label by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopicKind {
    Waveforms,
    Events,
    Status,
    Other,
}

impl TopicKind {
    /// Classify a frame label.
    pub fn of(label: &str) -> Self {
        if label.starts_with(WAVEFORMS_TOPIC_PREFIX) {
            Self::Waveforms
        } else if label.starts_with(EVENTS_TOPIC_PREFIX) {
            Self::Events
        } else if label.starts_with(STATUS_TOPIC_PREFIX) {
            Self::Status
        } else {
            Self::Other
        }
    }

    /// Returns a human-readable name for the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Waveforms => "WAVEFORMS",
            Self::Events => "EVENTS",
            Self::Status => "STATUS",
            Self::Other => "OTHER",
        }
    }
}
