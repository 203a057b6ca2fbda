//! Forward-only overlap resolution for timed placement

/// Where a clip lands on the timeline, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Frame the cue's start time maps to
    pub nominal: usize,
    /// Frame the clip is actually written at
    pub offset: usize,
}

impl Placement {
    /// Frames the clip was pushed later than its cue
    #[must_use]
    pub fn shift(&self) -> usize {
        self.offset - self.nominal
    }

    #[must_use]
    pub fn is_shifted(&self) -> bool {
        self.offset > self.nominal
    }
}

/// Frame index for a cue start time
#[must_use]
pub fn nominal_frame(start_secs: f64, sample_rate: u32) -> usize {
    (start_secs.max(0.0) * f64::from(sample_rate)).round() as usize
}

/// Resolve the write offset for a clip whose cue starts at `start_secs`.
///
/// A clip never starts before `cursor` (the end of the previous clip); if its
/// cue time falls earlier it is shifted forward to `cursor`. Later cues keep
/// their nominal position and leave silence in between. The caller advances
/// the cursor.
#[must_use]
pub fn resolve_placement(start_secs: f64, sample_rate: u32, cursor: usize) -> Placement {
    let nominal = nominal_frame(start_secs, sample_rate);
    Placement {
        nominal,
        offset: nominal.max(cursor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_kept_when_cue_is_free() {
        let p = resolve_placement(5.0, 22_050, 44_100);
        assert_eq!(p.offset, 110_250);
        assert!(!p.is_shifted());
        assert_eq!(p.shift(), 0);
    }

    #[test]
    fn test_forced_forward_on_overlap() {
        // 0.5 s cue, previous clip ran to 1.5 s
        let p = resolve_placement(0.5, 22_050, 33_075);
        assert_eq!(p.nominal, 11_025);
        assert_eq!(p.offset, 33_075);
        assert_eq!(p.shift(), 22_050);
    }

    #[test]
    fn test_exact_boundary_not_shifted() {
        let p = resolve_placement(1.0, 1000, 1000);
        assert_eq!(p.offset, 1000);
        assert!(!p.is_shifted());
    }

    #[test]
    fn test_rounding_and_negative_start() {
        assert_eq!(nominal_frame(0.00005, 10_000), 1);
        assert_eq!(nominal_frame(0.00004, 10_000), 0);
        assert_eq!(nominal_frame(-3.0, 10_000), 0);
    }

    #[test]
    fn test_property_never_before_cursor() {
        for cursor in [0usize, 1, 999, 22_050, 1_000_000] {
            for start in [0.0, 0.01, 0.5, 1.0, 12.34, 100.0] {
                let p = resolve_placement(start, 22_050, cursor);
                assert!(p.offset >= cursor);
                assert!(p.offset >= p.nominal);
            }
        }
    }
}
