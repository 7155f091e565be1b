//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::wav::WavSpec;

use super::AppPaths;

// ---------------------------------------------------------------------------
// I2sPins
// ---------------------------------------------------------------------------

/// Physical pin assignment for a hardware I2S input bus.
///
/// Plain data: the recorder core never interprets these, they are handed to
/// whichever [`InputBus`](crate::audio::InputBus) implementation drives real
/// hardware.  The desktop `cpal` bus has no pins and ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2sPins {
    /// Bit clock (BCLK / SCK).
    pub bclk: u8,
    /// Word select / frame clock (WS / LRCLK).
    pub ws: u8,
    /// Serial data in.
    pub din: u8,
}

impl Default for I2sPins {
    fn default() -> Self {
        // Common INMP441-on-ESP32 wiring.
        Self {
            bclk: 26,
            ws: 25,
            din: 33,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Stream format and chunking for the audio input bus.
///
/// Immutable for the lifetime of a recording session: the finalize header is
/// derived from the same values the session was constructed with, so the
/// container always matches what was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Pin assignment for hardware bus implementations.
    pub pins: I2sPins,
    /// Bits per sample (the recorder's path is 16-bit).
    pub bits_per_sample: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples requested from the bus per read.
    pub chunk_samples: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pins: I2sPins::default(),
            bits_per_sample: 16,
            sample_rate: 44_100,
            chunk_samples: 64,
        }
    }
}

impl CaptureConfig {
    /// The container format this configuration records (always mono).
    pub fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingConfig
// ---------------------------------------------------------------------------

/// File naming and loop duration used by the CLI binary.
///
/// These are defaults, not the API: `start_recording` and `stop_recording`
/// take caller-supplied names, so multiple recordings never overwrite each
/// other unless the caller asks them to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Name of the raw payload scratch file.
    pub temp_name: String,
    /// Name of the finalized container.
    pub output_name: String,
    /// How long the binary's tick loop records, in seconds.
    pub max_record_secs: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            temp_name: "temp.raw".into(),
            output_name: "audio.wav".into(),
            max_record_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use mic_recorder::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Input bus format and chunking.
    pub capture: CaptureConfig,
    /// File names and CLI loop duration.
    pub recording: RecordingConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.capture.bits_per_sample, 16);
        assert_eq!(cfg.capture.sample_rate, 44_100);
        assert_eq!(cfg.capture.chunk_samples, 64);
        assert_eq!(
            cfg.capture.pins,
            I2sPins {
                bclk: 26,
                ws: 25,
                din: 33
            }
        );
        assert_eq!(cfg.recording.temp_name, "temp.raw");
        assert_eq!(cfg.recording.output_name, "audio.wav");
        assert_eq!(cfg.recording.max_record_secs, 10);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.capture.sample_rate = 22_050;
        cfg.capture.chunk_samples = 128;
        cfg.capture.pins.din = 35;
        cfg.recording.temp_name = "scratch.raw".into();
        cfg.recording.output_name = "take-02.wav".into();
        cfg.recording.max_record_secs = 30;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn wav_spec_mirrors_capture_config() {
        let cfg = CaptureConfig::default();
        let spec = cfg.wav_spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.byte_rate(), 88_200);
    }
}
