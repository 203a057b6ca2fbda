//! Synthesized clip storage

use std::time::Duration;

/// One synthesized audio buffer
///
/// Samples are interleaved frame by frame (`L R L R ...` for stereo).
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Interleaved samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count (1 or 2 in practice)
    pub channels: u16,
}

impl Clip {
    /// Create a clip from interleaved samples
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Create a mono clip
    #[must_use]
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Number of frames (samples per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Playback duration
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Sample `channel` of `frame`, or `None` when either is out of range
    #[must_use]
    pub fn sample(&self, frame: usize, channel: u16) -> Option<f32> {
        if channel >= self.channels {
            return None;
        }
        let index = frame
            .checked_mul(usize::from(self.channels))?
            .checked_add(usize::from(channel))?;
        self.samples.get(index).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}
