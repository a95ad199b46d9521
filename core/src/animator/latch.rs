//! Threshold latches with hysteresis

use smallvec::SmallVec;

use scrollstage_shared::ThresholdSpec;

/// Latch transition reported by [`ThresholdBank::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Entered(usize),
    Exited(usize),
}

#[derive(Debug, Clone, Copy)]
struct Latch {
    threshold: ThresholdSpec,
    active: bool,
}

/// Independent latches evaluated together
///
/// A latch turns on when `scroll >= enter` and off when `scroll < exit`
/// (`>` and `<=` for strict thresholds). Each transition is reported once;
/// a scroll that stays on one side reports nothing.
#[derive(Debug, Clone, Default)]
pub struct ThresholdBank {
    latches: SmallVec<[Latch; 4]>,
}

impl ThresholdBank {
    pub fn new(thresholds: impl IntoIterator<Item = ThresholdSpec>) -> Self {
        Self {
            latches: thresholds
                .into_iter()
                .map(|threshold| Latch {
                    threshold,
                    active: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.latches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latches.is_empty()
    }

    /// Evaluate every latch against `scroll` and return the transitions
    pub fn update(&mut self, scroll: f64) -> SmallVec<[Crossing; 4]> {
        let mut crossings = SmallVec::new();
        for (i, latch) in self.latches.iter_mut().enumerate() {
            if !latch.active && latch.threshold.enters(scroll) {
                latch.active = true;
                crossings.push(Crossing::Entered(i));
            } else if latch.active && latch.threshold.releases(scroll) {
                latch.active = false;
                crossings.push(Crossing::Exited(i));
            }
        }
        crossings
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.latches.get(index).is_some_and(|l| l.active)
    }

    /// OR of all latches
    pub fn any_active(&self) -> bool {
        self.latches.iter().any(|l| l.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_fires_once() {
        let mut bank = ThresholdBank::new([ThresholdSpec::new(0.076)]);
        assert!(bank.update(0.05).is_empty());
        assert_eq!(bank.update(0.08).as_slice(), &[Crossing::Entered(0)]);
        assert!(bank.update(0.08).is_empty());
        assert!(bank.update(0.09).is_empty());
        assert!(bank.is_active(0));
    }

    #[test]
    fn test_enter_at_exact_threshold() {
        let mut bank = ThresholdBank::new([ThresholdSpec::new(0.5)]);
        assert_eq!(bank.update(0.5).as_slice(), &[Crossing::Entered(0)]);
    }

    #[test]
    fn test_strict_threshold() {
        let mut bank = ThresholdBank::new([ThresholdSpec::new(0.076).strict()]);
        assert!(bank.update(0.076).is_empty());
        assert_eq!(bank.update(0.0761).as_slice(), &[Crossing::Entered(0)]);
        assert_eq!(bank.update(0.076).as_slice(), &[Crossing::Exited(0)]);
    }

    #[test]
    fn test_hysteresis_band_holds_latch() {
        let mut bank = ThresholdBank::new([ThresholdSpec::with_exit(0.29, 0.2873245662504144)]);
        bank.update(0.30);

        // Inside the band: still active, nothing fires
        assert!(bank.update(0.288).is_empty());
        assert!(bank.update(0.2895).is_empty());
        assert!(bank.is_active(0));

        assert_eq!(bank.update(0.287).as_slice(), &[Crossing::Exited(0)]);
        assert!(bank.update(0.2880).is_empty());
        assert!(!bank.is_active(0));
    }

    #[test]
    fn test_independent_latches_or() {
        let mut bank = ThresholdBank::new(
            [0.33, 0.35, 0.37, 0.39].into_iter().map(ThresholdSpec::new),
        );
        bank.update(0.34);
        assert!(bank.any_active());
        assert!(bank.is_active(0));
        assert!(!bank.is_active(1));

        let crossings = bank.update(0.40);
        assert_eq!(crossings.len(), 3);

        bank.update(0.20);
        assert!(!bank.any_active());
    }

    #[test]
    fn test_nan_changes_nothing() {
        let mut bank = ThresholdBank::new([ThresholdSpec::new(0.1)]);
        bank.update(0.2);
        assert!(bank.update(f64::NAN).is_empty());
        assert!(bank.is_active(0));
    }
}
