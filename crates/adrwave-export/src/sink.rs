use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::naming::{default_output_dir, output_path, output_stem};

const FILE_BUFFER_CAPACITY: usize = 64 * 1024;

/// Write one record as a line of comma-separated sample values.
pub fn write_samples_csv<W: Write>(out: &mut W, samples: &[u16]) -> io::Result<()> {
    for (i, sample) in samples.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        write!(out, "{sample}")?;
    }
    out.write_all(b"\n")
}

/// Opens output destinations for channels.
pub trait SinkFactory {
    type Writer: Write;

    /// Open the destination for `channel`.
    fn create(&mut self, channel: u8) -> io::Result<Self::Writer>;

    /// Human-readable name of the destination for `channel`.
    fn destination(&self, channel: u8) -> String;
}

/// Buffered CSV files named after the input file.
#[derive(Debug, Clone)]
pub struct FileSinks {
    dir: PathBuf,
    stem: String,
}

impl FileSinks {
    /// Sinks writing `<stem>_wf_ch<N>.csv` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Sinks next to `input`, or in `output_dir` when given.
    pub fn for_input(input: &Path, output_dir: Option<&Path>) -> Self {
        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_dir(input));
        Self::new(dir, output_stem(input))
    }

    /// Path of the CSV file for `channel`.
    pub fn path_for(&self, channel: u8) -> PathBuf {
        output_path(&self.dir, &self.stem, channel)
    }
}

impl SinkFactory for FileSinks {
    type Writer = BufWriter<File>;

    fn create(&mut self, channel: u8) -> io::Result<Self::Writer> {
        let file = File::create(self.path_for(channel))?;
        Ok(BufWriter::with_capacity(FILE_BUFFER_CAPACITY, file))
    }

    fn destination(&self, channel: u8) -> String {
        self.path_for(channel).display().to_string()
    }
}

/// In-memory sinks, one `Vec<u8>` per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySinks;

impl SinkFactory for MemorySinks {
    type Writer = Vec<u8>;

    fn create(&mut self, _channel: u8) -> io::Result<Self::Writer> {
        Ok(Vec::new())
    }

    fn destination(&self, channel: u8) -> String {
        format!("memory:ch{channel}")
    }
}

/// An open output for one channel and the records written to it.
#[derive(Debug)]
pub struct ChannelSink<W> {
    channel: u8,
    destination: String,
    writer: W,
    records: u64,
    dropped_at_cap: u64,
}

impl<W: Write> ChannelSink<W> {
    /// Wrap an open `writer` for `channel`, with no records yet.
    pub fn new(channel: u8, destination: impl Into<String>, writer: W) -> Self {
        Self {
            channel,
            destination: destination.into(),
            writer,
            records: 0,
            dropped_at_cap: 0,
        }
    }

    /// Append one record and count it.
    pub fn write_record(&mut self, samples: &[u16]) -> io::Result<()> {
        write_samples_csv(&mut self.writer, samples)?;
        self.records += 1;
        Ok(())
    }

    pub(crate) fn note_dropped(&mut self) {
        self.dropped_at_cap += 1;
    }

    /// Flush buffered records to the destination.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Records refused because the channel was at its cap.
    pub fn dropped_at_cap(&self) -> u64 {
        self.dropped_at_cap
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(samples: &[u16]) -> String {
        let mut out = Vec::new();
        write_samples_csv(&mut out, samples).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn csv_line_is_comma_joined() {
        assert_eq!(csv(&[10, 20, 30, 40]), "10,20,30,40\n");
        assert_eq!(csv(&[65535]), "65535\n");
    }

    #[test]
    fn empty_record_is_empty_line() {
        assert_eq!(csv(&[]), "\n");
    }

    #[test]
    fn sink_counts_records() {
        let mut sink = ChannelSink::new(7, "memory:ch7", Vec::new());
        sink.write_record(&[1, 2, 3]).unwrap();
        sink.write_record(&[4]).unwrap();
        sink.note_dropped();

        assert_eq!(sink.records(), 2);
        assert_eq!(sink.dropped_at_cap(), 1);
        assert_eq!(sink.channel(), 7);
        assert_eq!(sink.destination(), "memory:ch7");
        assert_eq!(sink.into_inner(), b"1,2,3\n4\n".to_vec());
    }

    #[test]
    fn file_sinks_create_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sinks = FileSinks::new(dir.path(), "run_001");

        let mut writer = sinks.create(4).unwrap();
        write_samples_csv(&mut writer, &[5, 6]).unwrap();
        writer.flush().unwrap();

        let path = dir.path().join("run_001_wf_ch4.csv");
        assert_eq!(sinks.path_for(4), path);
        assert_eq!(sinks.destination(4), path.display().to_string());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "5,6\n");
    }

    #[test]
    fn file_sinks_follow_input_location() {
        let sinks = FileSinks::for_input(Path::new("/data/run_9.adr"), None);
        assert_eq!(sinks.path_for(0), PathBuf::from("/data/run_9_wf_ch0.csv"));

        let sinks = FileSinks::for_input(Path::new("/data/run_9.adr"), Some(Path::new("/out")));
        assert_eq!(sinks.path_for(0), PathBuf::from("/out/run_9_wf_ch0.csv"));
    }

    #[test]
    fn file_sink_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sinks = FileSinks::new(dir.path().join("missing"), "run");
        let err = sinks.create(1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
