use adrwave_export::{export_file, ChannelSelector, ExportConfig, ExportMode, RecordCap};

use crate::cmd::ExportArgs;
use crate::exit::{export_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_export_report, OutputFormat};

pub fn run(args: ExportArgs, format: OutputFormat) -> CliResult<i32> {
    let exclude = args.exclude.and_then(|excluded| excluded.0);
    if let (ChannelSelector::Single(channel), Some(excluded)) = (args.channel, exclude) {
        return Err(CliError::new(
            USAGE,
            format!("--exclude {excluded} has no effect when exporting only channel {channel}"),
        ));
    }

    let mode = ExportMode::from_selector(
        args.channel,
        RecordCap::from_count(args.max),
        exclude,
    );
    let config = ExportConfig::new(mode)
        .with_frame_config(args.stream.frame_config())
        .with_waveform_prefix(args.stream.topic_prefix)
        .with_progress_interval(args.progress_every);

    let report = export_file(&args.input, args.output_dir.as_deref(), &config)
        .map_err(|err| export_error("export failed", err))?;

    print_export_report(&args.input, &report, format);
    Ok(SUCCESS)
}
