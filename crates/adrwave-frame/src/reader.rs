use std::io::{BufRead, ErrorKind};

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::{parse_payload_len, Frame, FrameConfig, SEPARATOR};
use crate::error::{FrameError, Result};

const INITIAL_LABEL_CAPACITY: usize = 128;
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Counters kept while scanning a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReaderStats {
    /// Bytes consumed from the source.
    pub bytes_read: u64,
    /// Complete frames returned.
    pub frames: u64,
    /// Labels without a parseable `_s<N>` marker.
    pub skipped_unmarked: u64,
    /// Labels declaring more than `max_payload_size` bytes.
    pub skipped_oversized: u64,
    /// Frames whose payload ran past the end of the source.
    pub skipped_truncated: u64,
}

/// Reads complete frames from any `BufRead` source.
///
/// The reader is forward-only. Labels without a usable length marker and
/// frames cut short by the end of the source are skipped; callers only ever
/// see complete frames. At most one label and one payload are buffered.
pub struct FrameReader<R> {
    inner: R,
    label: BytesMut,
    config: FrameConfig,
    stats: ReaderStats,
    finished: bool,
}

impl<R: BufRead> FrameReader<R> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: R, config: FrameConfig) -> Self {
        Self {
            inner,
            label: BytesMut::with_capacity(INITIAL_LABEL_CAPACITY),
            config,
            stats: ReaderStats::default(),
            finished: false,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Ok(None)` once the source is exhausted. A trailing label
    /// without a separator is discarded silently.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if !self.fill_label()? {
                if !self.label.is_empty() {
                    tracing::trace!(
                        len = self.label.len(),
                        "discarding unterminated label at end of stream"
                    );
                    self.label.clear();
                }
                return Ok(None);
            }

            let label = self.label.split().freeze();
            let Some(len) = parse_payload_len(&label) else {
                self.stats.skipped_unmarked += 1;
                tracing::trace!(
                    label = %String::from_utf8_lossy(&label),
                    "skipping label without length marker"
                );
                continue;
            };

            if len > self.config.max_payload_size {
                self.stats.skipped_oversized += 1;
                tracing::debug!(
                    label = %String::from_utf8_lossy(&label),
                    size = len,
                    max = self.config.max_payload_size,
                    "skipping label with oversized payload"
                );
                continue;
            }

            match self.read_payload(len)? {
                Some(payload) => {
                    self.stats.frames += 1;
                    return Ok(Some(Frame {
                        label: String::from_utf8_lossy(&label).into_owned(),
                        payload,
                    }));
                }
                None => {
                    self.stats.skipped_truncated += 1;
                    tracing::debug!(
                        label = %String::from_utf8_lossy(&label),
                        declared = len,
                        "dropping truncated frame at end of stream"
                    );
                }
            }
        }
    }

    /// Accumulate label bytes up to and including the next separator.
    ///
    /// Returns `false` if the source ends first.
    fn fill_label(&mut self) -> Result<bool> {
        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if available.is_empty() {
                return Ok(false);
            }

            let (consumed, found) = match available.iter().position(|&b| b == SEPARATOR) {
                Some(idx) => {
                    self.label.extend_from_slice(&available[..idx]);
                    (idx + 1, true)
                }
                None => {
                    self.label.extend_from_slice(available);
                    (available.len(), false)
                }
            };
            self.inner.consume(consumed);
            self.stats.bytes_read += consumed as u64;

            // Keep the tail: the length marker sits at the end of a label.
            if self.label.len() > self.config.max_label_len {
                let excess = self.label.len() - self.config.max_label_len;
                self.label.advance(excess);
            }

            if found {
                return Ok(true);
            }
        }
    }

    /// Read exactly `len` payload bytes, or `None` if the source ends first.
    fn read_payload(&mut self, len: usize) -> Result<Option<Bytes>> {
        let mut payload = BytesMut::with_capacity(len.min(INITIAL_PAYLOAD_CAPACITY));
        while payload.len() < len {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if available.is_empty() {
                return Ok(None);
            }

            let n = available.len().min(len - payload.len());
            payload.extend_from_slice(&available[..n]);
            self.inner.consume(n);
            self.stats.bytes_read += n as u64;
        }
        Ok(Some(payload.freeze()))
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Yields frames until the source is exhausted or an I/O error occurs.
impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
