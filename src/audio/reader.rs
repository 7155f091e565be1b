//! Chunked sample draining on top of an [`InputBus`].
//!
//! [`SampleReader`] owns the bus and drains at most one configured chunk per
//! call — the granularity at which the recorder appends to storage and the
//! level meter samples the input.  Reads report how many samples actually
//! arrived; a partial chunk is normal, not an error.

use super::bus::{BusError, InputBus};
use super::level::mean_level;

// ---------------------------------------------------------------------------
// SampleReader
// ---------------------------------------------------------------------------

/// Drains fixed-size chunks of PCM samples from an input bus.
pub struct SampleReader<B: InputBus> {
    bus: B,
    chunk_samples: usize,
    /// Internal scratch for [`read_mean_level`](Self::read_mean_level).
    level_buf: Vec<i16>,
}

impl<B: InputBus> SampleReader<B> {
    /// Wrap `bus`, reading at most `chunk_samples` samples per call.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_samples == 0`.
    pub fn new(bus: B, chunk_samples: usize) -> Self {
        assert!(chunk_samples > 0, "chunk size must be > 0");
        Self {
            bus,
            chunk_samples,
            level_buf: vec![0; chunk_samples],
        }
    }

    /// The configured chunk size in samples.
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    /// Shared access to the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Start the bus clock.  Passthrough to [`InputBus::start`].
    pub fn start(&mut self) -> Result<(), BusError> {
        self.bus.start()
    }

    /// Stop the bus clock.  Passthrough to [`InputBus::stop`].
    pub fn stop(&mut self) -> Result<(), BusError> {
        self.bus.stop()
    }

    /// Blocking read of up to one chunk into `buf`.
    ///
    /// At most `min(buf.len(), chunk_samples)` samples are requested from
    /// the bus.  Returns the number of samples actually written; callers
    /// must not assume a full chunk.
    pub fn read_chunk(&mut self, buf: &mut [i16]) -> Result<usize, BusError> {
        let want = buf.len().min(self.chunk_samples);
        self.bus.read(&mut buf[..want])
    }

    /// Read one chunk and return the arithmetic mean of its samples.
    ///
    /// Used for live level metering, not for recording.  A zero-sample read
    /// returns `0.0` — a defined edge case, not an error.
    pub fn read_mean_level(&mut self) -> Result<f32, BusError> {
        // Split borrow: take the scratch out so `self.bus` stays reachable.
        let mut buf = std::mem::take(&mut self.level_buf);
        let result = self.bus.read(&mut buf);
        let level = result.map(|n| mean_level(&buf[..n]));
        self.level_buf = buf;
        level
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
