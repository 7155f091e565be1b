//! mic-recorder — record a microphone to a WAV container.
//!
//! # Pipeline
//!
//! ```text
//! InputBus (cpal / hardware I2S / mock)
//!        │  blocking chunk reads
//!        ▼
//! SampleReader ──▶ Recorder::tick() ──▶ temp file (raw PCM, Storage)
//!        │                                   │ stop_recording()
//!        └─▶ read_mean_level()               ▼
//!            (live metering)       WavHeader + copy-back ──▶ final .wav
//! ```
//!
//! The core is a single-threaded, tick-driven state machine
//! (`Idle → Recording → Finalizing → Idle`).  An external loop calls
//! [`Recorder::tick`] repeatedly while recording; every call appends one
//! chunk of samples to the temp file in read order.  `stop_recording`
//! synthesizes the 44-byte container header from the exact byte count and
//! rewrites the payload behind it.
//!
//! Both collaborators are injected: any [`audio::InputBus`] and any
//! [`storage::Storage`] drive the same machine, which is how the state
//! machine is tested without hardware or a filesystem.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use mic_recorder::audio::CpalBus;
//! use mic_recorder::config::AppConfig;
//! use mic_recorder::recorder::Recorder;
//! use mic_recorder::storage::DiskStorage;
//!
//! let config = AppConfig::load().unwrap();
//! let bus = CpalBus::new(config.capture.sample_rate).unwrap();
//! let storage = DiskStorage::new("recordings").unwrap();
//! let mut recorder = Recorder::new(bus, storage, &config.capture);
//!
//! recorder.start_recording("take-01.raw").unwrap();
//! for _ in 0..1000 {
//!     recorder.tick().unwrap();
//! }
//! let summary = recorder.stop_recording("take-01.wav").unwrap();
//! println!("recorded {:.2}s", summary.duration_secs);
//! ```

pub mod audio;
pub mod config;
pub mod recorder;
pub mod storage;
pub mod wav;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use audio::{BusError, CpalBus, InputBus, SampleReader};
pub use config::{AppConfig, AppPaths, CaptureConfig};
pub use recorder::{RecordError, Recorder, RecorderState, RecordingSummary};
pub use storage::{DiskStorage, Storage};
pub use wav::{WavHeader, WavSpec};
