//! Baseline prediction.

use tracing::trace;

use crate::NetworkTick;

/// Linear extrapolation from two baselines.
///
/// Prediction is only used when both baselines exist and are evenly spaced
/// relative to the tick being sent. Otherwise every prediction is the first
/// baseline unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaPredictor {
    valid: bool,
}

impl DeltaPredictor {
    /// Creates a predictor for `tick` from the baseline ticks.
    #[must_use]
    pub fn new(
        tick: NetworkTick,
        baseline1: Option<NetworkTick>,
        baseline2: Option<NetworkTick>,
    ) -> Self {
        let valid = match (baseline1, baseline2) {
            (Some(b1), Some(b2)) => {
                let spacing = b1.raw().wrapping_sub(b2.raw());
                let ahead = tick.raw().wrapping_sub(b1.raw());
                let valid = spacing != 0 && spacing < 1 << 31 && ahead == spacing;
                if !valid {
                    trace!(
                        tick = tick.raw(),
                        baseline1 = b1.raw(),
                        baseline2 = b2.raw(),
                        "irregular baseline spacing, predicting from baseline1"
                    );
                }
                valid
            }
            _ => false,
        };
        Self { valid }
    }

    /// A predictor that always copies baseline1.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { valid: false }
    }

    /// Returns `true` if extrapolation is applied.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Predicts `b1 + (b1 - b2)` with wrapping arithmetic.
    #[must_use]
    pub const fn predict_i32(&self, baseline1: i32, baseline2: i32) -> i32 {
        if !self.valid {
            return baseline1;
        }
        baseline1.wrapping_add(baseline1.wrapping_sub(baseline2))
    }

    /// Predicts `b1 + (b1 - b2)` with wrapping arithmetic.
    #[must_use]
    pub const fn predict_u32(&self, baseline1: u32, baseline2: u32) -> u32 {
        if !self.valid {
            return baseline1;
        }
        baseline1.wrapping_add(baseline1.wrapping_sub(baseline2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor(tick: u32, b1: u32, b2: u32) -> DeltaPredictor {
        DeltaPredictor::new(
            NetworkTick::new(tick),
            Some(NetworkTick::new(b1)),
            Some(NetworkTick::new(b2)),
        )
    }

    #[test]
    fn uniform_spacing_extrapolates() {
        let p = predictor(12, 10, 8);
        assert!(p.is_valid());
        assert_eq!(p.predict_i32(10, 8), 12);
        assert_eq!(p.predict_u32(10, 8), 12);
        assert_eq!(p.predict_i32(10, 10), 10);
        assert_eq!(p.predict_i32(-5, 0), -10);
    }

    #[test]
    fn irregular_spacing_copies_baseline1() {
        let p = predictor(13, 10, 8);
        assert!(!p.is_valid());
        assert_eq!(p.predict_i32(10, 8), 10);
        assert_eq!(p.predict_u32(10, 8), 10);
    }

    #[test]
    fn missing_baseline_copies_baseline1() {
        let tick = NetworkTick::new(12);
        let b1 = Some(NetworkTick::new(10));
        assert!(!DeltaPredictor::new(tick, b1, None).is_valid());
        assert!(!DeltaPredictor::new(tick, None, None).is_valid());
        assert!(!DeltaPredictor::new(tick, None, b1).is_valid());
        assert!(!DeltaPredictor::disabled().is_valid());
    }

    #[test]
    fn zero_spacing_is_invalid() {
        assert!(!predictor(10, 10, 10).is_valid());
    }

    #[test]
    fn spacing_across_tick_wraparound() {
        // b2 = 0xFFFF_FFFE, b1 = 0, tick = 2: spacing 2 on both sides.
        let p = predictor(2, 0, u32::MAX - 1);
        assert!(p.is_valid());

        let p = predictor(0, u32::MAX, u32::MAX - 1);
        assert!(p.is_valid());
        assert_eq!(p.predict_u32(u32::MAX, u32::MAX - 1), 0);
    }

    #[test]
    fn backwards_spacing_is_invalid() {
        // b2 newer than b1 gives a spacing above half the range.
        assert!(!predictor(u32::MAX - 1, 0, 2).is_valid());
    }

    #[test]
    fn extrapolation_wraps_instead_of_overflowing() {
        let p = predictor(3, 2, 1);
        assert_eq!(p.predict_i32(i32::MAX, 0), -2);
        assert_eq!(p.predict_u32(0, u32::MAX), 1);
    }
}
