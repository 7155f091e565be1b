//! Signal-level measurement for live metering.
//!
//! The recorder exposes a mean-level read so a UI or serial console can show
//! input activity without recording anything.  The measurement is the
//! arithmetic mean of the signed sample values of one chunk — a cheap DC-ish
//! level indicator, not an RMS loudness value.

// ---------------------------------------------------------------------------
// mean_level
// ---------------------------------------------------------------------------

/// Arithmetic mean of the signed sample values in `samples`.
///
/// Returns `0.0` for an empty slice — a zero-sample read is a defined edge
/// case, not an error.
///
/// # Example
///
/// ```rust
/// use mic_recorder::audio::mean_level;
///
/// assert_eq!(mean_level(&[]), 0.0);
/// assert_eq!(mean_level(&[0, 0, 0, 0]), 0.0);
/// assert_eq!(mean_level(&[100, 100, 100]), 100.0);
/// assert_eq!(mean_level(&[-50, 50]), 0.0);
/// ```
pub fn mean_level(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|&s| f32::from(s)).sum();
    sum / samples.len() as f32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
