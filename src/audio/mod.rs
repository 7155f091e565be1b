//! Audio input — bus abstraction, microphone capture, chunked reading.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → CpalBus queue → SampleReader::read_chunk
//!           → Recorder tick loop (append to storage)
//!           → SampleReader::read_mean_level (live metering)
//! ```
//!
//! The [`InputBus`] trait is the seam: [`CpalBus`] implements it for desktop
//! devices, and the recorder only ever sees the trait, so hardware I2S
//! drivers and test doubles plug in the same way.

pub mod bus;
pub mod capture;
pub mod level;
pub mod reader;

pub use bus::{BusError, InputBus};
pub use capture::CpalBus;
pub use level::mean_level;
pub use reader::SampleReader;

// test-only re-export so other modules' test code can script a bus without
// `use crate::audio::bus::MockBus`.
#[cfg(test)]
pub use bus::MockBus;
