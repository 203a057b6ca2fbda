//! Linear edge fades for splice boundaries

use std::time::Duration;

use super::Clip;

/// Default fade window at each clip edge
pub const DEFAULT_FADE: Duration = Duration::from_millis(50);

/// Applies a linear fade-in and fade-out to clip edges
#[derive(Debug, Clone, Copy)]
pub struct Fader {
    duration: Duration,
}

impl Default for Fader {
    fn default() -> Self {
        Self::new(DEFAULT_FADE)
    }
}

impl Fader {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Fade window length in frames at `sample_rate`
    #[must_use]
    pub fn fade_frames(&self, sample_rate: u32) -> usize {
        (self.duration.as_secs_f64() * f64::from(sample_rate)) as usize
    }

    /// Fade the clip edges in place.
    ///
    /// Clips no longer than twice the fade window are left untouched.
    /// Returns whether the fade was applied.
    pub fn apply(&self, clip: &mut Clip) -> bool {
        let fade = self.fade_frames(clip.sample_rate);
        let frames = clip.frames();
        if fade == 0 || frames <= fade * 2 {
            return false;
        }

        let channels = usize::from(clip.channels);
        let tail_start = frames - fade;

        for i in 0..fade {
            let gain = ramp(i, fade);
            for ch in 0..channels {
                clip.samples[i * channels + ch] *= gain;
                // Reverse ramp: last frame gets ramp[0]
                clip.samples[(tail_start + i) * channels + ch] *= ramp(fade - 1 - i, fade);
            }
        }

        true
    }
}

/// Point `i` of an inclusive 0→1 linear space with `n` points
fn ramp(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_frames() {
        let fader = Fader::default();
        assert_eq!(fader.fade_frames(22_050), 1102);
        assert_eq!(fader.fade_frames(44_100), 2205);
        assert_eq!(fader.fade_frames(16_000), 800);
    }

    #[test]
    fn test_short_clip_untouched() {
        let fader = Fader::default();
        // 2 × 800 frames exactly: not strictly longer, so no fade
        let mut clip = Clip::mono(vec![1.0; 1600], 16_000);
        let before = clip.clone();
        assert!(!fader.apply(&mut clip));
        assert_eq!(clip, before);

        // applying again is still a no-op
        assert!(!fader.apply(&mut clip));
        assert_eq!(clip, before);
    }

    #[test]
    fn test_mono_ramps() {
        let fader = Fader::new(Duration::from_millis(1));
        // 1 ms at 4 kHz = 4 frames
        let mut clip = Clip::mono(vec![1.0; 12], 4000);
        assert!(fader.apply(&mut clip));

        let third = 1.0 / 3.0;
        let expected = [
            0.0, third, 2.0 * third, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0 * third, third, 0.0,
        ];
        for (got, want) in clip.samples.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn test_stereo_ramp_broadcast() {
        let fader = Fader::new(Duration::from_millis(1));
        let mut clip = Clip::new(vec![1.0; 20], 4000, 2);
        assert!(fader.apply(&mut clip));

        for frame in 0..clip.frames() {
            assert_eq!(clip.sample(frame, 0), clip.sample(frame, 1));
        }
        assert_eq!(clip.sample(0, 0), Some(0.0));
        assert_eq!(clip.sample(9, 1), Some(0.0));
        assert_eq!(clip.sample(5, 0), Some(1.0));
    }
}
