use clap::{Args, Subcommand};
use std::path::PathBuf;

use adrwave_export::{ChannelSelector, ExcludedChannel, DEFAULT_PROGRESS_INTERVAL};
use adrwave_frame::{FrameConfig, DEFAULT_MAX_LABEL_LEN, DEFAULT_MAX_PAYLOAD, WAVEFORMS_TOPIC_PREFIX};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod export;
pub mod scan;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export waveforms to per-channel CSV files.
    Export(ExportArgs),
    /// Survey frames and channels without writing anything.
    Scan(ScanArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Export(args) => export::run(args, format),
        Command::Scan(args) => scan::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Options shared by commands that read an ADR stream.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Largest frame payload accepted, in bytes. Larger declarations are skipped.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD, env = "ADRWAVE_MAX_PAYLOAD")]
    pub max_payload: usize,
    /// Label prefix of frames holding waveform packets.
    #[arg(long, value_name = "PREFIX", default_value = WAVEFORMS_TOPIC_PREFIX)]
    pub topic_prefix: String,
}

impl StreamArgs {
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload,
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// ADR file to read.
    pub input: PathBuf,
    /// Channel to export (0-255), or "all" (-1 also selects all).
    #[arg(
        long,
        short = 'c',
        default_value = "all",
        allow_hyphen_values = true,
        env = "ADRWAVE_CHANNEL"
    )]
    pub channel: ChannelSelector,
    /// Maximum waveforms per channel (0 = no limit).
    #[arg(long, short = 'm', default_value_t = 0, env = "ADRWAVE_MAX")]
    pub max: u64,
    /// Channel to leave out when exporting all channels (-1 or "none" = no exclusion).
    #[arg(
        long,
        short = 'x',
        allow_hyphen_values = true,
        env = "ADRWAVE_EXCLUDE"
    )]
    pub exclude: Option<ExcludedChannel>,
    /// Directory for CSV files. Default: next to the input.
    #[arg(long, short = 'o', value_name = "DIR", env = "ADRWAVE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
    /// Log progress every N exported waveforms (0 = off).
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_every: u64,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// ADR file to read.
    pub input: PathBuf,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
