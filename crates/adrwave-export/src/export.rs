use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use adrwave_frame::FrameReader;
use adrwave_packet::PacketDecoder;

use crate::config::{ExportConfig, ExportMode};
use crate::error::{ExportError, Result};
use crate::report::{ChannelReport, ExportReport};
use crate::router::{Flow, Router};
use crate::sink::{ChannelSink, FileSinks, SinkFactory};

pub(crate) const READ_BUFFER_CAPACITY: usize = 256 * 1024;

#[derive(Debug, Default)]
struct Tally {
    waveform_frames: u64,
    packets: u64,
    truncated_payloads: u64,
}

/// Export waveforms from `source` through `router`.
///
/// Frames are read, decoded and routed one at a time. Every sink is
/// flushed on return, including when the scan fails part way.
pub fn export_stream<R, F>(
    source: R,
    mut router: Router<F>,
    config: &ExportConfig,
) -> Result<(ExportReport, Vec<ChannelSink<F::Writer>>)>
where
    R: BufRead,
    F: SinkFactory,
{
    let start = Instant::now();
    let mut reader = FrameReader::with_config(source, config.frame);
    let mut tally = Tally::default();

    let stopped_early = match drive(&mut reader, &mut router, config, &mut tally) {
        Ok(stopped) => stopped,
        Err(err) => {
            router.abandon();
            return Err(err);
        }
    };

    let mode = router.mode().name();
    let excluded_records = router.excluded();
    let sinks = router.finish()?;

    let report = ExportReport {
        mode,
        channels: sinks
            .iter()
            .map(|sink| ChannelReport {
                channel: sink.channel(),
                records: sink.records(),
                dropped_at_cap: sink.dropped_at_cap(),
                destination: sink.destination().to_string(),
            })
            .collect(),
        stream: reader.stats(),
        waveform_frames: tally.waveform_frames,
        packets: tally.packets,
        truncated_payloads: tally.truncated_payloads,
        excluded_records,
        stopped_early,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    tracing::info!(
        records = report.total_records(),
        channels = report.channels.len(),
        elapsed_ms = report.elapsed_ms,
        "export finished"
    );
    Ok((report, sinks))
}

/// Returns `true` if the router asked to stop before the end of the stream.
fn drive<R, F>(
    reader: &mut FrameReader<R>,
    router: &mut Router<F>,
    config: &ExportConfig,
    tally: &mut Tally,
) -> Result<bool>
where
    R: BufRead,
    F: SinkFactory,
{
    while let Some(frame) = reader.read_frame()? {
        if !frame.has_prefix(&config.waveform_prefix) {
            continue;
        }
        tally.waveform_frames += 1;

        let mut packets = PacketDecoder::new(&frame.payload);
        for packet in packets.by_ref() {
            tally.packets += 1;

            let before = router.written();
            let flow = router.route(&packet)?;
            let written = router.written();
            if written > before
                && config.progress_interval > 0
                && written % config.progress_interval == 0
            {
                tracing::info!(records = written, "exported waveforms");
            }

            if flow == Flow::Stop {
                return Ok(true);
            }
        }
        if packets.truncation().is_some() {
            tally.truncated_payloads += 1;
        }
    }
    Ok(false)
}

/// Export waveforms from the ADR file at `input` into CSV files.
///
/// Outputs go next to `input` unless `output_dir` is given. The output
/// directory is created only once the input has been opened.
pub fn export_file(
    input: &Path,
    output_dir: Option<&Path>,
    config: &ExportConfig,
) -> Result<ExportReport> {
    let file = File::open(input).map_err(|source| ExportError::SourceOpen {
        path: input.to_path_buf(),
        source,
    })?;
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let sinks = FileSinks::for_input(input, output_dir);
    if let ExportMode::Single { channel, cap } = config.mode {
        tracing::info!(
            channel,
            cap = %cap,
            destination = %sinks.destination(channel),
            "exporting single channel"
        );
    }
    let router = Router::new(config.mode, sinks)?;

    let source = BufReader::with_capacity(READ_BUFFER_CAPACITY, file);
    let (report, _sinks) = export_stream(source, router, config)?;
    Ok(report)
}
