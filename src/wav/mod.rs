//! WAV container synthesis — header layout and the finalize copy.
//!
//! A finalized recording is a 44-byte RIFF/WAVE header followed by the raw
//! little-endian PCM payload.  The header is the load-bearing contract with
//! downstream players: the declared payload size must equal the exact number
//! of payload bytes that follow it, and the declared container size must be
//! payload + 36.
//!
//! # Layout
//!
//! | Offset | Size | Field          | Value                          |
//! |--------|------|----------------|--------------------------------|
//! | 0      | 4    | riff tag       | `"RIFF"`                       |
//! | 4      | 4    | riff size      | payload bytes + 36             |
//! | 8      | 4    | format tag     | `"WAVE"`                       |
//! | 12     | 4    | chunk id       | `"fmt "`                       |
//! | 16     | 4    | chunk size     | 16                             |
//! | 20     | 2    | audio format   | 1 (PCM)                        |
//! | 22     | 2    | channel count  | configured channels            |
//! | 24     | 4    | sample rate    | configured rate                |
//! | 28     | 4    | byte rate      | rate × channels × bits / 8     |
//! | 32     | 2    | block align    | channels × bits / 8            |
//! | 34     | 2    | bits per sample| configured depth               |
//! | 36     | 4    | data tag       | `"data"`                       |
//! | 40     | 4    | payload size   | exact payload byte count       |

use std::io::{self, Read, Write};

use thiserror::Error;

/// Size of the container header in bytes.
pub const HEADER_LEN: usize = 44;

/// Riff-size overhead: everything in the container except the payload and
/// the first 8 header bytes.
const RIFF_OVERHEAD: u32 = 36;

/// PCM format tag.
const FORMAT_PCM: u16 = 1;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// A finalize-copy failure, split by which side of the copy failed so the
/// caller can report the right storage error kind.
#[derive(Debug, Error)]
pub enum WavError {
    /// Reading the raw payload failed.
    #[error("payload read failed: {0}")]
    Read(#[source] io::Error),

    /// Writing the container failed.
    #[error("container write failed: {0}")]
    Write(#[source] io::Error),
}

// ---------------------------------------------------------------------------
// WavSpec
// ---------------------------------------------------------------------------

/// Stream format parameters described by the header.
///
/// The recorder pins these to mono/16-bit/44100 Hz at the call site; the
/// header synthesis itself is generic over all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Interleaved channel count (1 = mono).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (e.g. 16).
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Bytes of audio per second of playback.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.channels) * u32::from(self.bits_per_sample) / 8
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }
}

// ---------------------------------------------------------------------------
// WavHeader
// ---------------------------------------------------------------------------

/// A computed 44-byte container header for a payload of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    spec: WavSpec,
    data_len: u32,
}

impl WavHeader {
    /// Describe a payload of exactly `data_len` bytes in `spec`'s format.
    pub fn new(spec: WavSpec, data_len: u32) -> Self {
        Self { spec, data_len }
    }

    /// The declared payload size in bytes.
    pub fn data_len(&self) -> u32 {
        self.data_len
    }

    /// The declared container size field: payload bytes + 36.
    pub fn riff_size(&self) -> u32 {
        self.data_len + RIFF_OVERHEAD
    }

    /// Pack the header into its 44-byte little-endian wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.riff_size().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&16u32.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.spec.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.spec.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.spec.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.spec.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&self.spec.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// write_wav
// ---------------------------------------------------------------------------

/// Write `header` to `out`, then stream the payload from `raw` until EOF in
/// `scratch`-sized chunks.  `raw` must already be positioned at the start of
/// the payload.
///
/// Returns the number of payload bytes copied.  On success the output holds
/// exactly the bytes `raw` held when the copy began — no truncation, no
/// padding.  On a mid-copy failure the output is left partially written;
/// there is no atomic replace.
///
/// # Panics
///
/// Panics if `scratch` is empty.
pub fn write_wav<R: Read, W: Write>(
    raw: &mut R,
    out: &mut W,
    header: &WavHeader,
    scratch: &mut [u8],
) -> Result<u64, WavError> {
    assert!(!scratch.is_empty(), "copy buffer must be non-empty");

    out.write_all(&header.to_bytes()).map_err(WavError::Write)?;

    let mut copied: u64 = 0;
    loop {
        let n = raw.read(scratch).map_err(WavError::Read)?;
        if n == 0 {
            break;
        }
        out.write_all(&scratch[..n]).map_err(WavError::Write)?;
        copied += n as u64;
    }

    out.flush().map_err(WavError::Write)?;
    Ok(copied)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
