use std::io::IsTerminal;
use std::path::Path;

use adrwave_export::{ExportReport, ScanReport};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    kind: &'static str,
    input: String,
    #[serde(flatten)]
    report: &'a T,
}

fn print_json<T: Serialize>(kind: &'static str, input: &Path, report: &T) {
    let out = Tagged {
        kind,
        input: input.display().to_string(),
        report,
    };
    println!(
        "{}",
        serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
    );
}

fn seconds(elapsed_ms: u64) -> f64 {
    elapsed_ms as f64 / 1000.0
}

pub fn print_export_report(input: &Path, report: &ExportReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json("export-report", input, report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "WAVEFORMS", "DROPPED AT CAP", "OUTPUT"]);
            for channel in &report.channels {
                table.add_row(vec![
                    channel.channel.to_string(),
                    channel.records.to_string(),
                    channel.dropped_at_cap.to_string(),
                    channel.destination.clone(),
                ]);
            }
            println!("{table}");
            println!(
                "{} waveforms from {} frames in {:.3} s{}",
                report.total_records(),
                report.stream.frames,
                seconds(report.elapsed_ms),
                if report.stopped_early {
                    " (stopped at cap)"
                } else {
                    ""
                }
            );
        }
        OutputFormat::Pretty => {
            println!("Finished. Exported {} waveforms", report.total_records());
            for channel in &report.channels {
                println!(
                    "  Channel {}: {} waveforms -> {}",
                    channel.channel, channel.records, channel.destination
                );
            }
            if report.excluded_records > 0 {
                println!("  Excluded: {} waveforms", report.excluded_records);
            }
            println!("Elapsed time: {:.3} s", seconds(report.elapsed_ms));
        }
    }
}

pub fn print_scan_report(input: &Path, report: &ScanReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json("scan-report", input, report),
        OutputFormat::Table => {
            let mut topics = Table::new();
            topics
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOPIC", "KIND", "FRAMES", "BYTES"]);
            for topic in &report.topics {
                topics.add_row(vec![
                    topic.topic.clone(),
                    topic.kind.to_string(),
                    topic.frames.to_string(),
                    topic.payload_bytes.to_string(),
                ]);
            }
            println!("{topics}");

            let mut channels = Table::new();
            channels
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "WAVEFORMS", "MIN SAMPLES", "MAX SAMPLES"]);
            for channel in &report.channels {
                channels.add_row(vec![
                    channel.channel.to_string(),
                    channel.packets.to_string(),
                    channel.min_samples.to_string(),
                    channel.max_samples.to_string(),
                ]);
            }
            println!("{channels}");
            print_skips(report);
        }
        OutputFormat::Pretty => {
            println!(
                "{}: {} frames, {} bytes",
                input.display(),
                report.stream.frames,
                report.stream.bytes_read
            );
            for topic in &report.topics {
                println!("  {} ({}): {} frames", topic.topic, topic.kind, topic.frames);
            }
            for channel in &report.channels {
                println!(
                    "  Channel {}: {} waveforms, {}-{} samples",
                    channel.channel, channel.packets, channel.min_samples, channel.max_samples
                );
            }
            print_skips(report);
        }
    }
}

fn print_skips(report: &ScanReport) {
    let stream = &report.stream;
    println!(
        "skipped: {} unmarked, {} oversized, {} truncated frames; {} truncated payloads ({:.3} s)",
        stream.skipped_unmarked,
        stream.skipped_oversized,
        stream.skipped_truncated,
        report.truncated_payloads,
        seconds(report.elapsed_ms)
    );
}
