//! Desktop microphone capture via `cpal`.
//!
//! [`CpalBus`] is the production [`InputBus`] implementation.  The cpal
//! callback runs on a dedicated audio thread and forwards each hardware
//! buffer — downmixed to mono and converted to `i16` — over an mpsc channel;
//! [`InputBus::read`] is a blocking pull from that channel.
//!
//! A desktop sound device has no pin assignment; the
//! [`I2sPins`](crate::config::I2sPins) in the capture configuration are
//! carried for hardware I2S implementations of the same trait and are not
//! used here.

use std::collections::VecDeque;
use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::bus::{BusError, InputBus};

// ---------------------------------------------------------------------------
// Sample conversion helpers
// ---------------------------------------------------------------------------

/// Convert one `f32` sample in `[-1.0, 1.0]` to a signed 16-bit sample.
///
/// Out-of-range input is clamped rather than wrapped.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// Downmix interleaved `f32` frames to mono `i16` by averaging channels.
///
/// The output length is `samples.len() / channels`; `channels == 0` yields
/// an empty vector.
pub fn frames_to_mono_i16(samples: &[f32], channels: u16) -> Vec<i16> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&s| f32_to_i16(s)).collect(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| f32_to_i16(frame.iter().sum::<f32>() / n as f32))
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// CpalBus
// ---------------------------------------------------------------------------

/// Microphone-backed input bus built on the system default capture device.
///
/// The stream is created on [`start`](InputBus::start) and torn down on
/// [`stop`](InputBus::stop) (dropping a `cpal::Stream` stops the hardware
/// stream).  Samples delivered between reads are queued internally, so a
/// slow tick loop loses nothing — it just reads further behind live.
pub struct CpalBus {
    device: cpal::Device,
    config: cpal::StreamConfig,
    channels: u16,
    stream: Option<cpal::Stream>,
    rx: Option<mpsc::Receiver<Vec<i16>>>,
    pending: VecDeque<i16>,
}

impl CpalBus {
    /// Create a bus over the system default input device at `sample_rate` Hz.
    ///
    /// The device's native channel count is kept; frames are downmixed to
    /// mono on delivery.
    ///
    /// # Errors
    ///
    /// [`BusError::Start`] when no input device exists or it cannot report a
    /// default configuration.
    pub fn new(sample_rate: u32) -> Result<Self, BusError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| BusError::Start("no input device on the default host".into()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| BusError::Start(e.to_string()))?;
        let channels = supported.channels();

        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            config,
            channels,
            stream: None,
            rx: None,
            pending: VecDeque::new(),
        })
    }

    /// The device name, for diagnostics.
    pub fn device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "<unknown>".into())
    }
}

impl InputBus for CpalBus {
    fn start(&mut self) -> Result<(), BusError> {
        if self.stream.is_some() {
            return Err(BusError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::channel::<Vec<i16>>();
        let channels = self.channels;

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Ignore send errors; the receiver side may have stopped.
                    let _ = tx.send(frames_to_mono_i16(data, channels));
                },
                |err: cpal::StreamError| {
                    log::error!("cpal stream error: {err}");
                },
                None, // no timeout
            )
            .map_err(|e| BusError::Start(e.to_string()))?;

        stream.play().map_err(|e| BusError::Start(e.to_string()))?;

        log::info!(
            "capture started: {} @ {} Hz, {} ch",
            self.device_name(),
            self.config.sample_rate.0,
            channels
        );

        self.stream = Some(stream);
        self.rx = Some(rx);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BusError> {
        // Dropping the stream stops the hardware side; the callback's sender
        // disconnects with it.
        self.stream = None;
        self.rx = None;
        self.pending.clear();
        Ok(())
    }

    fn read(&mut self, buf: &mut [i16]) -> Result<usize, BusError> {
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| BusError::Read("bus is not started".into()))?;

        // Block until at least one sample is queued.
        while self.pending.is_empty() {
            let chunk = rx
                .recv()
                .map_err(|_| BusError::Read("capture stream ended".into()))?;
            self.pending.extend(chunk);
        }

        let mut written = 0;
        while written < buf.len() {
            match self.pending.pop_front() {
                Some(s) => {
                    buf[written] = s;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
