//! Peak normalization to prevent clipping on encode

/// Largest absolute sample value
#[must_use]
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
}

/// Scale samples down so the peak is 1.0, only if it currently exceeds 1.0.
///
/// Buffers already within full scale are left bit-identical. Returns the
/// gain that was applied (1.0 when untouched).
pub fn normalize_peak(samples: &mut [f32]) -> f32 {
    let peak = peak(samples);
    if peak <= 1.0 {
        return 1.0;
    }

    for s in samples.iter_mut() {
        *s /= peak;
    }
    1.0 / peak
}
