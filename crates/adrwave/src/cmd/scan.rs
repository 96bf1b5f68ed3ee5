use adrwave_export::scan_file;

use crate::cmd::ScanArgs;
use crate::exit::{export_error, CliResult, SUCCESS};
use crate::output::{print_scan_report, OutputFormat};

pub fn run(args: ScanArgs, format: OutputFormat) -> CliResult<i32> {
    let report = scan_file(
        &args.input,
        args.stream.frame_config(),
        &args.stream.topic_prefix,
    )
    .map_err(|err| export_error("scan failed", err))?;

    print_scan_report(&args.input, &report, format);
    Ok(SUCCESS)
}
