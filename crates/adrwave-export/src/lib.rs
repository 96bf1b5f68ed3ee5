//! Per-channel export of waveforms decoded from ADR streams.
//!
//! Frames flow one at a time from the reader through the packet decoder
//! into a [`Router`], which applies the export policy and writes each
//! surviving waveform as one CSV line to its channel's sink.
//!
//! Two policies exist:
//! - single channel: one sink, optional record cap that ends the scan;
//! - all channels: one lazily created sink per channel, optional per-channel
//!   cap, optional excluded channel.

pub mod config;
pub mod error;
pub mod export;
pub mod naming;
pub mod report;
pub mod router;
pub mod scan;
pub mod sink;

pub use config::{
    ChannelSelector, ExcludedChannel, ExportConfig, ExportMode, ParseChannelError, RecordCap,
    DEFAULT_PROGRESS_INTERVAL,
};
pub use error::{ExportError, Result};
pub use export::{export_file, export_stream};
pub use naming::{output_file_name, output_path, output_stem};
pub use report::{ChannelReport, ChannelSurvey, ExportReport, ScanReport, TopicReport};
pub use router::{Flow, Router};
pub use scan::{scan_file, scan_stream, MAX_DISTINCT_TOPICS, OVERFLOW_TOPIC};
pub use sink::{write_samples_csv, ChannelSink, FileSinks, MemorySinks, SinkFactory};
