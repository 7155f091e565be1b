//! Application entry point — mic-recorder.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open [`DiskStorage`] in the platform recordings directory.
//! 4. Build the [`CpalBus`] over the default input device.
//! 5. Construct the [`Recorder`].
//! 6. Run a short level-meter pre-roll so the user sees input activity.
//! 7. Record by calling `tick()` in a loop for the configured duration.
//! 8. Stop, finalize the container, and log the summary.
//!
//! An optional first CLI argument overrides the recording duration in
//! seconds: `mic-recorder 5`.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use mic_recorder::{
    audio::CpalBus,
    config::{AppConfig, AppPaths},
    recorder::Recorder,
    storage::DiskStorage,
};

/// Consecutive tick failures tolerated before the recording is aborted.
///
/// One lost chunk should not discard a whole take, but a storage medium
/// that keeps failing will never produce a usable container.
const MAX_CONSECUTIVE_TICK_FAILURES: u32 = 5;

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("mic-recorder starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let record_secs = std::env::args()
        .nth(1)
        .map(|arg| {
            arg.parse::<u64>()
                .with_context(|| format!("invalid duration argument: {arg}"))
        })
        .transpose()?
        .unwrap_or(config.recording.max_record_secs);

    // 3. Storage
    let paths = AppPaths::new();
    let storage = DiskStorage::new(&paths.recordings_dir).with_context(|| {
        format!(
            "could not open recordings directory {}",
            paths.recordings_dir.display()
        )
    })?;
    log::info!("recordings directory: {}", paths.recordings_dir.display());

    // 4. Audio bus
    let bus = CpalBus::new(config.capture.sample_rate).context("could not open input device")?;

    // 5. Recorder
    let mut recorder = Recorder::new(bus, storage, &config.capture);

    // 6. Level-meter pre-roll
    recorder.start_monitoring().context("level monitor failed")?;
    for _ in 0..8 {
        match recorder.read_mean_level() {
            Ok(level) => log::info!("input level: {level:+.1}"),
            Err(e) => {
                log::warn!("level read failed: {e}");
                break;
            }
        }
    }

    // 7. Record (start_recording hands the monitor clock over)
    recorder
        .start_recording(&config.recording.temp_name)
        .context("could not start recording")?;
    log::info!("recording for {record_secs}s…");

    let started = Instant::now();
    let mut consecutive_failures = 0u32;
    while started.elapsed() < Duration::from_secs(record_secs) {
        match recorder.tick() {
            Ok(_) => consecutive_failures = 0,
            Err(e) => {
                // Best-effort continuation: keep ticking unless the medium
                // looks gone for good.
                consecutive_failures += 1;
                log::warn!("tick failed ({consecutive_failures}): {e}");
                if consecutive_failures >= MAX_CONSECUTIVE_TICK_FAILURES {
                    log::error!("too many consecutive failures; stopping early");
                    break;
                }
            }
        }
    }

    // 8. Finalize
    let summary = recorder
        .stop_recording(&config.recording.output_name)
        .context("finalize failed")?;

    log::info!(
        "saved {} ({} payload bytes, {:.2}s)",
        summary.output_name,
        summary.payload_bytes,
        summary.duration_secs
    );
    Ok(())
}
