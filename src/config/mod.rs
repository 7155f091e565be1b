//! Configuration module for mic-recorder.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for capture and
//! recording, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, CaptureConfig, I2sPins, RecordingConfig};
