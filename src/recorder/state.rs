//! Recording session states.
//!
//! The state machine transitions are:
//!
//! ```text
//! Idle ──start_recording──▶ Recording
//!      ◀──(open/start failure)──┘
//!
//! Recording ──tick──▶ Recording        (repeat while active)
//! Recording ──stop_recording──▶ Finalizing ──▶ Idle
//! ```
//!
//! `Finalizing` exists only for the duration of a `stop_recording` call —
//! the model is single-threaded, so from outside a call the recorder is
//! always either `Idle` or `Recording`.

// ---------------------------------------------------------------------------
// RecorderState
// ---------------------------------------------------------------------------

/// Phase of the record-buffer-finalize pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// No recording in progress; `tick` is a no-op.
    Idle,

    /// Temp file open, bus clock running; each `tick` appends one chunk.
    Recording,

    /// Stop requested; the container is being written from the temp file.
    Finalizing,
}

impl RecorderState {
    /// Returns `true` while a recording session holds the temp file.
    pub fn is_active(&self) -> bool {
        matches!(self, RecorderState::Recording | RecorderState::Finalizing)
    }

    /// A short human-readable label for logs and status displays.
    pub fn label(&self) -> &'static str {
        match self {
            RecorderState::Idle => "Idle",
            RecorderState::Recording => "Recording",
            RecorderState::Finalizing => "Finalizing",
        }
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        RecorderState::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
