//! Growable mix buffer for clip placement
//!
//! The buffer's sample rate and channel count are fixed at construction.
//! Offsets and lengths are expressed in frames; storage is interleaved.

use std::time::Duration;

use super::Clip;

/// Default extra room allocated whenever the buffer has to grow
pub const DEFAULT_HEADROOM: Duration = Duration::from_secs(10);

/// Owned, zero-initialized timeline with on-demand growth
#[derive(Debug, Clone)]
pub struct TimelineBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    headroom_frames: usize,
}

impl TimelineBuffer {
    /// Create a buffer with `initial_frames` of silence
    #[must_use]
    pub fn new(sample_rate: u32, channels: u16, initial_frames: usize) -> Self {
        let channels = channels.max(1);
        Self {
            samples: vec![0.0; initial_frames * usize::from(channels)],
            sample_rate,
            channels,
            headroom_frames: frames_for(DEFAULT_HEADROOM, sample_rate),
        }
    }

    /// Override the growth headroom
    #[must_use]
    pub fn with_headroom(mut self, headroom: Duration) -> Self {
        self.headroom_frames = frames_for(headroom, self.sample_rate);
        self
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Currently allocated extent in frames
    #[must_use]
    pub fn capacity_frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Grow to at least `end_frame` frames.
    ///
    /// Growth reallocates to `end_frame + headroom`, keeping existing content
    /// as the prefix and zero-filling the rest. Returns whether it grew.
    pub fn ensure_capacity(&mut self, end_frame: usize) -> bool {
        if end_frame <= self.capacity_frames() {
            return false;
        }
        let new_frames = end_frame + self.headroom_frames;
        self.samples
            .resize(new_frames * usize::from(self.channels), 0.0);
        true
    }

    /// Mix `clip` into the buffer starting at frame `offset`.
    ///
    /// Samples are added, not overwritten. A clip whose channel layout differs
    /// from the buffer is mapped onto it: mono is duplicated across every
    /// buffer channel, multi-channel into a mono buffer is averaged.
    pub fn write(&mut self, offset: usize, clip: &Clip) {
        let frames = clip.frames();
        self.ensure_capacity(offset + frames);

        let out_ch = usize::from(self.channels);
        let in_ch = usize::from(clip.channels);

        for frame in 0..frames {
            let src = &clip.samples[frame * in_ch..(frame + 1) * in_ch];
            let dst_start = (offset + frame) * out_ch;
            let dst = &mut self.samples[dst_start..dst_start + out_ch];

            if in_ch == out_ch {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d += s;
                }
            } else if out_ch == 1 {
                dst[0] += src.iter().sum::<f32>() / in_ch as f32;
            } else {
                for (ch, d) in dst.iter_mut().enumerate() {
                    *d += src[ch % in_ch];
                }
            }
        }
    }

    /// Truncate to `final_frames`, dropping unused headroom
    #[must_use]
    pub fn trim(mut self, final_frames: usize) -> Clip {
        let len = final_frames.min(self.capacity_frames()) * usize::from(self.channels);
        self.samples.truncate(len);
        self.samples.shrink_to_fit();
        Clip::new(self.samples, self.sample_rate, self.channels)
    }
}

/// Whole frames in `duration` at `sample_rate`
#[must_use]
pub fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}
