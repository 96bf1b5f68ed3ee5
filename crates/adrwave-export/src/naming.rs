//! Output file naming.
//!
//! `run_042.adr` exported on channel 3 becomes `run_042_wf_ch3.csv`.

use std::path::{Path, PathBuf};

/// Extension of raw acquisition files.
pub const ADR_EXTENSION: &str = ".adr";

const FALLBACK_STEM: &str = "waveforms";

/// The input file name without a trailing `.adr`.
pub fn output_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(ADR_EXTENSION).unwrap_or(&name);
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// `<stem>_wf_ch<channel>.csv`
pub fn output_file_name(stem: &str, channel: u8) -> String {
    format!("{stem}_wf_ch{channel}.csv")
}

/// `<dir>/<stem>_wf_ch<channel>.csv`
pub fn output_path(dir: &Path, stem: &str, channel: u8) -> PathBuf {
    dir.join(output_file_name(stem, channel))
}

/// The directory holding `input`, or `.` for a bare file name.
pub fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
