//=========================================================================
// Progress Blending
//=========================================================================
//
// Combines a raw readiness signal with minimum-duration pacing.
//
// Architecture:
//   raw (loader / handler) ─┐
//                           ├─> blend() ─> ProgressPhase ─> [start, start+length]
//   elapsed (frame time) ───┘
//
// A phase is re-sampled every frame; nothing is memoized except the
// high-water mark that keeps reported values monotonic.
//
//=========================================================================

//=== Blend Function ======================================================

/// Blends raw progress with elapsed-time pacing.
///
/// Returns `raw` when `min_duration <= 0`, otherwise
/// `min(raw, elapsed / min_duration)`. The result is always clamped to
/// `[0, 1]` and only reaches `1.0` once both `raw >= 1` and
/// `elapsed >= min_duration`.
///
/// ```
/// use aetheric_director::core::progress::blend;
///
/// assert_eq!(blend(0.5, 10.0, 0.0), 0.5);
/// assert_eq!(blend(1.0, 1.0, 2.0), 0.5);
/// assert_eq!(blend(0.25, 1.0, 2.0), 0.25);
/// ```
pub fn blend(raw: f32, elapsed: f32, min_duration: f32) -> f32 {
    let raw = clamp_unit(raw);

    if min_duration <= 0.0 {
        return raw;
    }

    let paced = clamp_unit(elapsed.max(0.0) / min_duration);
    raw.min(paced)
}

/// Clamps to `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

//=== ProgressSpan ========================================================

/// Sub-range of the reported progress bar a phase writes into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSpan {
    pub start: f32,
    pub length: f32,
}

impl ProgressSpan {
    /// The whole bar, used when no overlay is shown.
    pub const FULL: Self = Self { start: 0.0, length: 1.0 };

    /// First half of an overlay's bar (target scene loading).
    pub const FIRST_HALF: Self = Self { start: 0.0, length: 0.5 };

    /// Second half of an overlay's bar (incoming handler readiness).
    pub const SECOND_HALF: Self = Self { start: 0.5, length: 0.5 };

    /// Maps a local `[0, 1]` value into this span.
    pub fn map(&self, local: f32) -> f32 {
        clamp_unit(self.start + clamp_unit(local) * self.length)
    }

    /// Upper bound of the span.
    pub fn end(&self) -> f32 {
        self.map(1.0)
    }
}

//=== ProgressPhase =======================================================

/// One frame's reading of a [`ProgressPhase`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    /// Value to deliver to the progress reporter, already mapped into the span.
    pub value: f32,
    /// `true` once both the raw signal and the pacing have reached 1.0.
    pub done: bool,
}

/// Polling state of one progress phase.
///
/// The minimum duration is scaled by the span length, so the two halves of
/// an overlay bar together honor the full minimum loading time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPhase {
    span: ProgressSpan,
    min_duration: f32,
    elapsed: f32,
    high_water: f32,
}

impl ProgressPhase {
    pub fn new(span: ProgressSpan, min_loading_time: f32) -> Self {
        Self {
            span,
            min_duration: min_loading_time.max(0.0) * span.length,
            elapsed: 0.0,
            high_water: 0.0,
        }
    }

    /// Advances the phase clock by one frame.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Samples the phase against the current raw signal.
    pub fn sample(&mut self, raw: f32) -> PhaseSample {
        let local = blend(raw, self.elapsed, self.min_duration);
        let done = local >= 1.0;

        self.high_water = self.high_water.max(local);

        PhaseSample {
            value: self.span.map(self.high_water),
            done,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn min_duration(&self) -> f32 {
        self.min_duration
    }

    pub fn span(&self) -> ProgressSpan {
        self.span
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RAWS: [f32; 6] = [0.0, 0.1, 0.45, 0.9, 0.99, 1.0];
    const DURATIONS: [f32; 4] = [0.0, 0.5, 2.0, 7.5];

    //=====================================================================
    // blend()
    //=====================================================================

    #[test]
    fn blend_stays_in_unit_range() {
        for raw in RAWS {
            for d in DURATIONS {
                for step in 0..40 {
                    let value = blend(raw, step as f32 * 0.25, d);
                    assert!((0.0..=1.0).contains(&value), "blend({raw}, _, {d}) = {value}");
                }
            }
        }
    }

    #[test]
    fn blend_is_non_decreasing_in_elapsed() {
        for raw in RAWS {
            for d in DURATIONS {
                let mut previous = 0.0;
                for step in 0..40 {
                    let value = blend(raw, step as f32 * 0.1, d);
                    assert!(value >= previous, "regressed at step {step} (raw {raw}, d {d})");
                    previous = value;
                }
            }
        }
    }

    #[test]
    fn blend_without_minimum_tracks_raw() {
        for raw in RAWS {
            assert_eq!(blend(raw, 0.0, 0.0), raw);
            assert_eq!(blend(raw, 100.0, 0.0), raw);
            assert_eq!(blend(raw, 3.0, -1.0), raw);
        }
    }

    #[test]
    fn blend_clamps_out_of_range_raw() {
        assert_eq!(blend(1.7, 0.0, 0.0), 1.0);
        assert_eq!(blend(-0.3, 0.0, 0.0), 0.0);
        assert_eq!(blend(f32::NAN, 5.0, 1.0), 0.0);
    }

    #[test]
    fn blend_reaches_one_only_when_both_inputs_finish() {
        assert!(blend(1.0, 1.9, 2.0) < 1.0);
        assert!(blend(0.95, 5.0, 2.0) < 1.0);
        assert_eq!(blend(1.0, 2.0, 2.0), 1.0);
    }

    //=====================================================================
    // ProgressSpan
    //=====================================================================

    #[test]
    fn spans_map_into_their_halves() {
        assert_eq!(ProgressSpan::FIRST_HALF.map(1.0), 0.5);
        assert_eq!(ProgressSpan::SECOND_HALF.map(0.0), 0.5);
        assert_eq!(ProgressSpan::SECOND_HALF.end(), 1.0);
        assert_eq!(ProgressSpan::FULL.map(0.25), 0.25);
    }

    //=====================================================================
    // ProgressPhase
    //=====================================================================

    #[test]
    fn phase_scales_minimum_duration_by_span_length() {
        let full = ProgressPhase::new(ProgressSpan::FULL, 2.0);
        let half = ProgressPhase::new(ProgressSpan::FIRST_HALF, 2.0);

        assert_eq!(full.min_duration(), 2.0);
        assert_eq!(half.min_duration(), 1.0);
    }

    #[test]
    fn phase_finishes_when_raw_and_pacing_complete() {
        let mut phase = ProgressPhase::new(ProgressSpan::FULL, 1.0);

        let first = phase.sample(1.0);
        assert!(!first.done);
        assert_eq!(first.value, 0.0);

        phase.advance(0.5);
        let mid = phase.sample(1.0);
        assert!(!mid.done);
        assert_eq!(mid.value, 0.5);

        phase.advance(0.5);
        let last = phase.sample(1.0);
        assert!(last.done);
        assert_eq!(last.value, 1.0);
    }

    #[test]
    fn phase_never_reports_a_regression() {
        let mut phase = ProgressPhase::new(ProgressSpan::FULL, 0.0);

        assert_eq!(phase.sample(0.6).value, 0.6);
        assert_eq!(phase.sample(0.2).value, 0.6);
        assert_eq!(phase.sample(0.8).value, 0.8);
    }

    #[test]
    fn phase_ignores_negative_frame_time() {
        let mut phase = ProgressPhase::new(ProgressSpan::FULL, 1.0);
        phase.advance(-3.0);
        assert_eq!(phase.elapsed(), 0.0);
    }

    #[test]
    fn second_half_phase_starts_at_midpoint() {
        let mut phase = ProgressPhase::new(ProgressSpan::SECOND_HALF, 0.0);
        let sample = phase.sample(0.0);
        assert_eq!(sample.value, 0.5);
        assert!(!sample.done);
    }
}
