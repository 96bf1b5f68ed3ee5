use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use adrwave_packet::WaveformPacket;

use crate::config::ExportMode;
use crate::error::{ExportError, Result};
use crate::sink::{ChannelSink, SinkFactory};

/// What the driving loop should do after a record was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The single-channel cap was reached; stop scanning.
    Stop,
}

/// Routes decoded waveforms to per-channel sinks.
///
/// Owns every sink it opens. Sinks live until [`finish`] or [`abandon`].
///
/// [`finish`]: Router::finish
/// [`abandon`]: Router::abandon
pub struct Router<F: SinkFactory> {
    mode: ExportMode,
    factory: F,
    sinks: BTreeMap<u8, ChannelSink<F::Writer>>,
    written: u64,
    excluded: u64,
    ignored: u64,
}

impl<F: SinkFactory> Router<F> {
    /// Create a router.
    ///
    /// In single-channel mode the sink is opened here, so an unwritable
    /// destination fails before any input is read.
    pub fn new(mode: ExportMode, factory: F) -> Result<Self> {
        let mut router = Self {
            mode,
            factory,
            sinks: BTreeMap::new(),
            written: 0,
            excluded: 0,
            ignored: 0,
        };
        if let ExportMode::Single { channel, .. } = mode {
            router.sink_for(channel)?;
        }
        Ok(router)
    }

    /// Dispose of one record according to the export mode.
    pub fn route(&mut self, packet: &WaveformPacket) -> Result<Flow> {
        match self.mode {
            ExportMode::Single { channel, cap } => {
                if packet.channel != channel {
                    self.ignored += 1;
                    return Ok(Flow::Continue);
                }

                let sink = self.sink_for(channel)?;
                if !cap.allows(sink.records()) {
                    return Ok(Flow::Stop);
                }
                sink.write_record(&packet.samples)
                    .map_err(|source| ExportError::SinkWrite { channel, source })?;
                let at_cap = !cap.allows(sink.records());
                self.written += 1;

                if at_cap {
                    tracing::info!(channel, records = self.written, "record cap reached");
                    Ok(Flow::Stop)
                } else {
                    Ok(Flow::Continue)
                }
            }
            ExportMode::All { cap, exclude } => {
                let channel = packet.channel;
                if exclude == Some(channel) {
                    self.excluded += 1;
                    return Ok(Flow::Continue);
                }

                let sink = self.sink_for(channel)?;
                if cap.allows(sink.records()) {
                    sink.write_record(&packet.samples)
                        .map_err(|source| ExportError::SinkWrite { channel, source })?;
                    self.written += 1;
                } else {
                    sink.note_dropped();
                }
                Ok(Flow::Continue)
            }
        }
    }

    fn sink_for(&mut self, channel: u8) -> Result<&mut ChannelSink<F::Writer>> {
        match self.sinks.entry(channel) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let destination = self.factory.destination(channel);
                let writer =
                    self.factory
                        .create(channel)
                        .map_err(|source| ExportError::SinkCreate {
                            channel,
                            destination: destination.clone(),
                            source,
                        })?;
                tracing::info!(channel, destination = %destination, "created channel output");
                Ok(entry.insert(ChannelSink::new(channel, destination, writer)))
            }
        }
    }

    pub fn mode(&self) -> &ExportMode {
        &self.mode
    }

    /// Records written across all sinks.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Records dropped because their channel is excluded.
    pub fn excluded(&self) -> u64 {
        self.excluded
    }

    /// Records for other channels in single-channel mode.
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Open sinks, ordered by channel.
    pub fn sinks(&self) -> impl Iterator<Item = &ChannelSink<F::Writer>> {
        self.sinks.values()
    }

    /// Flush and hand back every sink, ordered by channel.
    ///
    /// Every sink is flushed even if an earlier one fails; the first
    /// failure is returned.
    pub fn finish(self) -> Result<Vec<ChannelSink<F::Writer>>> {
        let mut first_err = None;
        let mut sinks = Vec::with_capacity(self.sinks.len());
        for (channel, mut sink) in self.sinks {
            if let Err(source) = sink.flush() {
                tracing::warn!(channel, error = %source, "failed to flush channel output");
                first_err.get_or_insert(ExportError::SinkWrite { channel, source });
            }
            sinks.push(sink);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(sinks),
        }
    }

    /// Flush what can be flushed and close every sink. Used on error paths.
    pub fn abandon(self) {
        for (channel, mut sink) in self.sinks {
            if let Err(err) = sink.flush() {
                tracing::warn!(channel, error = %err, "failed to flush channel output");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::*;
    use crate::config::RecordCap;
    use crate::sink::MemorySinks;

    fn packet(channel: u8, samples: &[u16]) -> WaveformPacket {
        WaveformPacket {
            timestamp: 0,
            channel,
            samples_number: samples.len() as u32,
            gates_number: 0,
            samples: samples.to_vec(),
        }
    }

    fn lines(sink: &ChannelSink<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sink.get_ref().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn single_mode_opens_sink_eagerly() {
        let router = Router::new(
            ExportMode::Single {
                channel: 3,
                cap: RecordCap::Unbounded,
            },
            MemorySinks,
        )
        .unwrap();

        let sinks = router.finish().unwrap();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].channel(), 3);
        assert_eq!(sinks[0].records(), 0);
    }

    #[test]
    fn single_mode_filters_other_channels() {
        let mut router = Router::new(
            ExportMode::Single {
                channel: 7,
                cap: RecordCap::Unbounded,
            },
            MemorySinks,
        )
        .unwrap();

        assert_eq!(router.route(&packet(7, &[10, 20])).unwrap(), Flow::Continue);
        assert_eq!(router.route(&packet(1, &[99])).unwrap(), Flow::Continue);
        assert_eq!(router.route(&packet(7, &[1, 2, 3])).unwrap(), Flow::Continue);

        assert_eq!(router.written(), 2);
        assert_eq!(router.ignored(), 1);
        let sinks = router.finish().unwrap();
        assert_eq!(lines(&sinks[0]), vec!["10,20", "1,2,3"]);
    }

    #[test]
    fn single_mode_stops_at_cap() {
        let mut router = Router::new(
            ExportMode::Single {
                channel: 0,
                cap: RecordCap::Limit(2),
            },
            MemorySinks,
        )
        .unwrap();

        assert_eq!(router.route(&packet(0, &[1])).unwrap(), Flow::Continue);
        assert_eq!(router.route(&packet(0, &[2])).unwrap(), Flow::Stop);
        assert_eq!(router.written(), 2);
    }

    #[test]
    fn all_mode_creates_sinks_lazily() {
        let mut router = Router::new(
            ExportMode::All {
                cap: RecordCap::Unbounded,
                exclude: None,
            },
            MemorySinks,
        )
        .unwrap();
        assert_eq!(router.sinks().count(), 0);

        router.route(&packet(5, &[1])).unwrap();
        router.route(&packet(2, &[2])).unwrap();
        router.route(&packet(5, &[3])).unwrap();

        let sinks = router.finish().unwrap();
        let channels: Vec<u8> = sinks.iter().map(|s| s.channel()).collect();
        assert_eq!(channels, vec![2, 5]);
        assert_eq!(lines(&sinks[1]), vec!["1", "3"]);
        assert_eq!(sinks[1].destination(), "memory:ch5");
    }

    #[test]
    fn all_mode_caps_each_channel_independently() {
        let mut router = Router::new(
            ExportMode::All {
                cap: RecordCap::Limit(1),
                exclude: None,
            },
            MemorySinks,
        )
        .unwrap();

        for i in 0..3u16 {
            assert_eq!(router.route(&packet(1, &[i])).unwrap(), Flow::Continue);
            assert_eq!(router.route(&packet(2, &[i + 10])).unwrap(), Flow::Continue);
        }

        let sinks = router.finish().unwrap();
        assert_eq!(lines(&sinks[0]), vec!["0"]);
        assert_eq!(lines(&sinks[1]), vec!["10"]);
        assert_eq!(sinks[0].dropped_at_cap(), 2);
        assert_eq!(sinks[1].dropped_at_cap(), 2);
    }

    #[test]
    fn all_mode_never_opens_excluded_channel() {
        let mut router = Router::new(
            ExportMode::All {
                cap: RecordCap::Unbounded,
                exclude: Some(4),
            },
            MemorySinks,
        )
        .unwrap();

        for _ in 0..5 {
            router.route(&packet(4, &[1, 2])).unwrap();
        }

        assert_eq!(router.excluded(), 5);
        assert_eq!(router.written(), 0);
        assert!(router.finish().unwrap().is_empty());
    }

    #[test]
    fn sink_create_failure_aborts() {
        let mut router = Router::new(
            ExportMode::All {
                cap: RecordCap::Unbounded,
                exclude: None,
            },
            FailingSinks { fail_on: 9 },
        )
        .unwrap();

        router.route(&packet(1, &[1])).unwrap();
        let err = router.route(&packet(9, &[1])).unwrap_err();
        assert!(matches!(
            err,
            ExportError::SinkCreate { channel: 9, ref destination, .. } if destination == "test:ch9"
        ));

        let sinks = router.finish().unwrap();
        assert_eq!(sinks.len(), 1);
        assert_eq!(lines(&sinks[0]), vec!["1"]);
    }

    #[test]
    fn single_mode_sink_failure_is_immediate() {
        let result = Router::new(
            ExportMode::Single {
                channel: 9,
                cap: RecordCap::Unbounded,
            },
            FailingSinks { fail_on: 9 },
        );
        assert!(matches!(result, Err(ExportError::SinkCreate { channel: 9, .. })));
    }

    #[test]
    fn write_failure_names_channel() {
        let mut router = Router::new(
            ExportMode::All {
                cap: RecordCap::Unbounded,
                exclude: None,
            },
            BrokenWriters,
        )
        .unwrap();

        let err = router.route(&packet(6, &[1])).unwrap_err();
        assert!(matches!(err, ExportError::SinkWrite { channel: 6, .. }));
        router.abandon();
    }

    struct FailingSinks {
        fail_on: u8,
    }

    impl SinkFactory for FailingSinks {
        type Writer = Vec<u8>;

        fn create(&mut self, channel: u8) -> io::Result<Self::Writer> {
            if channel == self.fail_on {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            Ok(Vec::new())
        }

        fn destination(&self, channel: u8) -> String {
            format!("test:ch{channel}")
        }
    }

    struct BrokenWriters;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    impl SinkFactory for BrokenWriters {
        type Writer = BrokenWriter;

        fn create(&mut self, _channel: u8) -> io::Result<Self::Writer> {
            Ok(BrokenWriter)
        }

        fn destination(&self, channel: u8) -> String {
            format!("broken:ch{channel}")
        }
    }
}
