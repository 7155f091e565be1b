//! The recording session state machine.
//!
//! [`Recorder`] orchestrates the record-buffer-finalize pipeline:
//! open-temp-file → repeated read-and-append → stop, header synthesis, and
//! the two-pass rewrite into the final container.  Collaborators are
//! injected at construction ([`InputBus`] for the peripheral, [`Storage`]
//! for the medium) so the whole machine runs against test doubles.
//!
//! The model is single-threaded and cooperative: an external loop calls
//! [`tick`](Recorder::tick) repeatedly while recording is active, and every
//! read and file operation blocks the caller until it completes.  Chunks are
//! appended in the exact order they are read — there is no concurrency to
//! reorder them.

use std::io::{self, Seek, SeekFrom, Write};

use thiserror::Error;

use crate::audio::{BusError, InputBus, SampleReader};
use crate::config::CaptureConfig;
use crate::storage::Storage;
use crate::wav::{self, WavError, WavHeader, WavSpec};

use super::state::RecorderState;

/// Transfer-buffer size for the finalize copy, in bytes.
///
/// Comfortably larger than one peripheral chunk; the same allocation stages
/// sample serialization during ticks.
const COPY_BUF_LEN: usize = 24 * 1024;

// ---------------------------------------------------------------------------
// RecordError
// ---------------------------------------------------------------------------

/// Errors surfaced by the recording session.
///
/// Nothing is retried internally and nothing is swallowed: each variant is
/// returned by the operation that triggered it, and the state the session is
/// left in is documented on that operation.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Bus configuration, start, read, or stop failure.
    #[error("audio peripheral error: {0}")]
    Peripheral(#[from] BusError),

    /// A named file could not be created or opened.
    #[error("could not open {name}: {source}")]
    StorageOpen {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A write failed mid-stream (append during a tick, or container copy).
    #[error("write to {name} failed: {source}")]
    StorageWrite {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A read or seek failed during the finalize copy-back.
    #[error("read from {name} failed: {source}")]
    StorageRead {
        name: String,
        #[source]
        source: io::Error,
    },

    /// `start_recording` (or `start_monitoring`) while a recording is open.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// `stop_recording` while idle.
    #[error("no recording in progress")]
    NotRecording,

    /// The byte total no longer fits the container's 32-bit size fields.
    #[error("recorded payload exceeds the 4 GiB container limit")]
    PayloadTooLarge,
}

// ---------------------------------------------------------------------------
// RecordingSummary
// ---------------------------------------------------------------------------

/// What a successful `stop_recording` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    /// Name of the finalized container in storage.
    pub output_name: String,
    /// Payload bytes written after the 44-byte header.
    pub payload_bytes: u64,
    /// Recorded duration implied by the payload size and stream format.
    pub duration_secs: f64,
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// One open recording: the exclusively-owned temp handle and its byte count.
struct ActiveRecording<F> {
    raw_file: F,
    raw_name: String,
    bytes_written: u64,
}

/// The recording session state machine.
///
/// At most one recording is active at a time; `start_recording` enforces
/// this as a precondition rather than with a lock, because the model is
/// single-threaded.
pub struct Recorder<B: InputBus, S: Storage> {
    reader: SampleReader<B>,
    storage: S,
    spec: WavSpec,
    state: RecorderState,
    /// Clock running for level metering without an open recording.
    monitoring: bool,
    active: Option<ActiveRecording<S::File>>,
    /// Per-tick chunk landing zone, sized to one peripheral chunk.
    chunk_buf: Vec<i16>,
    /// Byte scratch reused for tick serialization and the finalize copy.
    copy_buf: Vec<u8>,
}

impl<B: InputBus, S: Storage> Recorder<B, S> {
    /// Build a recorder over `bus` and `storage` with `config`'s stream
    /// format and chunk size.
    pub fn new(bus: B, storage: S, config: &CaptureConfig) -> Self {
        let chunk_samples = config.chunk_samples;
        Self {
            reader: SampleReader::new(bus, chunk_samples),
            storage,
            spec: config.wav_spec(),
            state: RecorderState::Idle,
            monitoring: false,
            active: None,
            chunk_buf: vec![0; chunk_samples],
            copy_buf: vec![0; COPY_BUF_LEN.max(chunk_samples * 2)],
        }
    }

    /// Current state machine phase.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether a recording is open.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Bytes appended so far in the open recording; `0` while idle.
    pub fn bytes_recorded(&self) -> u64 {
        self.active.as_ref().map_or(0, |a| a.bytes_written)
    }

    // -- monitoring ---------------------------------------------------------

    /// Start the bus clock for level metering without opening a recording.
    ///
    /// Idempotent while monitoring; rejected with
    /// [`RecordError::AlreadyRecording`] while a recording is open (the
    /// clock is already running and owned by the session).
    pub fn start_monitoring(&mut self) -> Result<(), RecordError> {
        if self.active.is_some() {
            return Err(RecordError::AlreadyRecording);
        }
        if self.monitoring {
            return Ok(());
        }
        self.reader.start()?;
        self.monitoring = true;
        Ok(())
    }

    /// Stop a running level monitor.  No-op when not monitoring.
    pub fn stop_monitoring(&mut self) -> Result<(), RecordError> {
        if !self.monitoring {
            return Ok(());
        }
        self.monitoring = false;
        self.reader.stop()?;
        Ok(())
    }

    /// Read one chunk and return the arithmetic mean of its samples.
    ///
    /// Works while monitoring or recording (the clock must be running; see
    /// [`start_monitoring`](Self::start_monitoring)).  A zero-sample read
    /// returns `0.0`.
    pub fn read_mean_level(&mut self) -> Result<f32, RecordError> {
        Ok(self.reader.read_mean_level()?)
    }

    // -- recording ----------------------------------------------------------

    /// `Idle → Recording`: open `raw_name` for the raw payload, zero the
    /// byte counter, start the bus clock.
    ///
    /// Rejected with [`RecordError::AlreadyRecording`] while a recording is
    /// open — the in-progress counter and temp file are untouched.  On any
    /// failure the session stays `Idle`: an open failure never starts the
    /// clock, and a clock failure releases and removes the just-created
    /// temp file.  A running level monitor is handed over automatically.
    pub fn start_recording(&mut self, raw_name: &str) -> Result<(), RecordError> {
        if self.active.is_some() {
            return Err(RecordError::AlreadyRecording);
        }

        if self.monitoring {
            log::debug!("handing level monitor clock over to recording");
            self.monitoring = false;
            self.reader.stop()?;
        }

        let raw_file = self
            .storage
            .create(raw_name)
            .map_err(|source| RecordError::StorageOpen {
                name: raw_name.into(),
                source,
            })?;

        if let Err(e) = self.reader.start() {
            drop(raw_file);
            if let Err(rm) = self.storage.remove(raw_name) {
                log::warn!("could not remove unused temp file {raw_name}: {rm}");
            }
            return Err(e.into());
        }

        log::info!("recording started into {raw_name}");
        self.active = Some(ActiveRecording {
            raw_file,
            raw_name: raw_name.into(),
            bytes_written: 0,
        });
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// One iteration of the recording loop: read up to one chunk, append
    /// the samples actually read to the temp file, and return the byte
    /// count appended.
    ///
    /// A documented no-op returning `Ok(0)` while idle — no file is
    /// touched and no error is raised.  A failure leaves the session
    /// `Recording`: the caller decides whether to keep ticking or stop
    /// (best-effort continuation — losing one chunk should not discard the
    /// whole recording).  The byte counter only ever counts fully-appended
    /// chunks.
    pub fn tick(&mut self) -> Result<usize, RecordError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(0);
        };

        let samples = self.reader.read_chunk(&mut self.chunk_buf)?;
        if samples == 0 {
            return Ok(0);
        }

        let byte_len = samples * 2;
        for (i, &s) in self.chunk_buf[..samples].iter().enumerate() {
            self.copy_buf[i * 2..i * 2 + 2].copy_from_slice(&s.to_le_bytes());
        }

        active
            .raw_file
            .write_all(&self.copy_buf[..byte_len])
            .map_err(|source| RecordError::StorageWrite {
                name: active.raw_name.clone(),
                source,
            })?;

        active.bytes_written += byte_len as u64;
        Ok(byte_len)
    }

    /// `Recording → Finalizing → Idle`: stop the bus clock, synthesize the
    /// container into `output_name`, release the temp handle, and clean up.
    ///
    /// The session always reaches `Idle`, whatever goes wrong in between.
    /// The temp file is removed only after a successful finalize; on a
    /// finalize failure it is kept so the recorded bytes stay recoverable,
    /// and the container is logged as possibly missing or invalid.  A
    /// finalize error takes precedence over a bus-stop error in the return
    /// value; both are logged.
    pub fn stop_recording(&mut self, output_name: &str) -> Result<RecordingSummary, RecordError> {
        let mut active = self.active.take().ok_or(RecordError::NotRecording)?;
        self.state = RecorderState::Finalizing;
        log::info!(
            "stopping recording: {} bytes buffered in {}",
            active.bytes_written,
            active.raw_name
        );

        let bus_result = self.reader.stop();
        if let Err(ref e) = bus_result {
            log::warn!("audio bus did not stop cleanly: {e}");
        }

        let finalize_result = self.finalize(&mut active, output_name);

        let ActiveRecording { raw_file, raw_name, .. } = active;
        drop(raw_file);

        match &finalize_result {
            Ok(summary) => {
                if let Err(e) = self.storage.remove(&raw_name) {
                    // Non-fatal: the container already exists and is usable.
                    log::warn!("could not remove temp file {raw_name}: {e}");
                }
                log::info!(
                    "recording finalized: {} ({} payload bytes, {:.2}s)",
                    summary.output_name,
                    summary.payload_bytes,
                    summary.duration_secs
                );
            }
            Err(e) => {
                log::error!("finalize failed, container {output_name} may be missing or invalid: {e}");
                log::info!("raw payload kept in {raw_name} for recovery");
            }
        }

        self.state = RecorderState::Idle;

        match (finalize_result, bus_result) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(bus_err)) => Err(bus_err.into()),
            (Ok(summary), Ok(())) => Ok(summary),
        }
    }

    /// Rewind the raw payload and stream it into the container behind a
    /// freshly computed header.
    ///
    /// The output is opened only after the byte total has been validated
    /// and the raw file rewound, so an open failure aborts before any bytes
    /// are written and leaves the raw file untouched.
    fn finalize(
        &mut self,
        active: &mut ActiveRecording<S::File>,
        output_name: &str,
    ) -> Result<RecordingSummary, RecordError> {
        let data_len =
            u32::try_from(active.bytes_written).map_err(|_| RecordError::PayloadTooLarge)?;

        active
            .raw_file
            .seek(SeekFrom::Start(0))
            .map_err(|source| RecordError::StorageRead {
                name: active.raw_name.clone(),
                source,
            })?;

        let mut out = self
            .storage
            .create(output_name)
            .map_err(|source| RecordError::StorageOpen {
                name: output_name.into(),
                source,
            })?;

        let header = WavHeader::new(self.spec, data_len);
        let copied = wav::write_wav(&mut active.raw_file, &mut out, &header, &mut self.copy_buf)
            .map_err(|e| match e {
                WavError::Read(source) => RecordError::StorageRead {
                    name: active.raw_name.clone(),
                    source,
                },
                WavError::Write(source) => RecordError::StorageWrite {
                    name: output_name.into(),
                    source,
                },
            })?;

        if copied != u64::from(data_len) {
            log::warn!(
                "container {output_name} declares {data_len} payload bytes but {copied} were \
                 copied; the file may not play correctly"
            );
        }

        Ok(RecordingSummary {
            output_name: output_name.into(),
            payload_bytes: copied,
            duration_secs: copied as f64 / f64::from(self.spec.byte_rate()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
