//! The record-buffer-finalize pipeline.
//!
//! # Lifecycle
//!
//! ```text
//! start_recording(raw)        tick()  × N                stop_recording(out)
//!   open temp, start clock ─▶ read chunk ─▶ append ─▶ …  ─▶ stop clock
//!                                                          ─▶ header + copy-back
//!                                                          ─▶ remove temp
//! ```
//!
//! [`Recorder`] is generic over its collaborators — any
//! [`InputBus`](crate::audio::InputBus) and any
//! [`Storage`](crate::storage::Storage) — so the same state machine drives a
//! desktop microphone, an embedded I2S bus, or the in-memory test doubles.

pub mod session;
pub mod state;

pub use session::{RecordError, Recorder, RecordingSummary};
pub use state::RecorderState;
