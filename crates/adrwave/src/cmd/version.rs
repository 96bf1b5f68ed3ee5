use adrwave_packet::{HEADER_SIZE, PADDING_SAMPLES};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("adrwave {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: adrwave");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("ADRWAVE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("ADRWAVE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "packet_layout: header={HEADER_SIZE}B little-endian, padding={PADDING_SAMPLES} samples"
    );

    Ok(SUCCESS)
}
