//! The audio input bus seam.
//!
//! [`InputBus`] is the interface between the recorder core and the capture
//! hardware: a start/stop clock lifecycle plus a blocking, count-reporting
//! sample read.  The production implementation is
//! [`CpalBus`](crate::audio::CpalBus); a hardware I2S bus on an embedded
//! target would implement the same trait against its own driver.
//!
//! [`MockBus`] (available under `#[cfg(test)]`) is a scripted stub that
//! replays a fixed sequence of chunks — useful for unit-testing the recorder
//! without any audio device.

use thiserror::Error;

// ---------------------------------------------------------------------------
// BusError
// ---------------------------------------------------------------------------

/// Errors reported by an audio input bus.
///
/// Driver-specific failures are carried as strings so the trait stays
/// independent of any particular backend's error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// `start` was called while the bus clock was already running.
    ///
    /// Starting twice without an intervening `stop` is undefined for the
    /// underlying hardware, so implementations must reject it.
    #[error("input bus is already started")]
    AlreadyStarted,

    /// The bus clock could not be started (device missing, stream rejected).
    #[error("failed to start input bus: {0}")]
    Start(String),

    /// A sample read failed, or `read` was called while the bus was stopped.
    #[error("input bus read failed: {0}")]
    Read(String),

    /// The bus clock could not be stopped cleanly.
    #[error("failed to stop input bus: {0}")]
    Stop(String),
}

// ---------------------------------------------------------------------------
// InputBus trait
// ---------------------------------------------------------------------------

/// A serial audio input bus delivering signed 16-bit mono PCM samples.
///
/// # Contract
///
/// - [`start`](Self::start) is **not** idempotent: callers must not start an
///   already-running bus.  Implementations return
///   [`BusError::AlreadyStarted`] when they do.
/// - [`stop`](Self::stop) is safe to call on a stopped bus; it closes the
///   current capture window.
/// - [`read`](Self::read) blocks until at least one sample is available or
///   the bus reports an error, then returns the number of samples actually
///   written into `buf` — which may be fewer than `buf.len()`.  Callers must
///   never assume a full buffer.
pub trait InputBus {
    /// Start the bus clock.
    fn start(&mut self) -> Result<(), BusError>;

    /// Stop the bus clock.
    fn stop(&mut self) -> Result<(), BusError>;

    /// Blocking read of up to `buf.len()` samples into `buf`.
    ///
    /// Returns the number of samples written.
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, BusError>;
}

// Compile-time assertion: Box<dyn InputBus> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn InputBus>) {}
};

// ---------------------------------------------------------------------------
// MockBus  (test-only)
// ---------------------------------------------------------------------------

/// A test double that replays a scripted sequence of read results.
///
/// Each call to [`read`](InputBus::read) pops the next scripted entry; once
/// the script is exhausted every further read returns zero samples.  The
/// mock also counts `start`/`stop` calls so tests can assert the clock
/// lifecycle.
#[cfg(test)]
#[derive(Default)]
pub struct MockBus {
    script: std::collections::VecDeque<Result<Vec<i16>, BusError>>,
    /// Number of `start` calls observed.
    pub starts: usize,
    /// Number of `stop` calls observed.
    pub stops: usize,
    /// When set, the next `start` call fails with this error.
    pub fail_start: Option<BusError>,
    /// When set, the next `stop` call fails with this error.
    pub fail_stop: Option<BusError>,
    running: bool,
}

#[cfg(test)]
impl MockBus {
    /// Create a mock with an empty script (every read returns 0 samples).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk of samples to be returned by the next unqueued read.
    pub fn push_chunk(&mut self, samples: &[i16]) {
        self.script.push_back(Ok(samples.to_vec()));
    }

    /// Queue `n` identical chunks.
    pub fn push_chunks(&mut self, samples: &[i16], n: usize) {
        for _ in 0..n {
            self.push_chunk(samples);
        }
    }

    /// Queue a read error.
    pub fn push_error(&mut self, err: BusError) {
        self.script.push_back(Err(err));
    }

    /// Whether the clock is currently running.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
impl InputBus for MockBus {
    fn start(&mut self) -> Result<(), BusError> {
        if let Some(err) = self.fail_start.take() {
            return Err(err);
        }
        if self.running {
            return Err(BusError::AlreadyStarted);
        }
        self.running = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BusError> {
        self.running = false;
        self.stops += 1;
        if let Some(err) = self.fail_stop.take() {
            return Err(err);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [i16]) -> Result<usize, BusError> {
        match self.script.pop_front() {
            Some(Ok(chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
