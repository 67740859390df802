use serde::{Deserialize, Serialize};

/// Smallest drift reported when comparing the stored balance with the tree sum.
pub const DRIFT_TOLERANCE: f64 = 1e-6;
/// Rounding allowance per unit of summed magnitude; summing in a different
/// order can differ by more than the absolute tolerance on large ledgers.
pub const RELATIVE_DRIFT_TOLERANCE: f64 = 1e-12;

/// Running total of every operation value, updated incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(f64);

impl Balance {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub(crate) fn credit(&mut self, delta: f64) {
        self.0 += delta;
    }

    pub(crate) fn replace(&mut self, previous: f64, current: f64) {
        self.0 += current - previous;
    }

    pub(crate) fn debit(&mut self, delta: f64) {
        self.0 -= delta;
    }

    /// Stored value minus `computed`; zero when the two agree within the
    /// rounding error expected for values whose magnitudes sum to `volume`.
    pub fn drift_from(self, computed: f64, volume: f64) -> f64 {
        let drift = self.0 - computed;
        let tolerance = DRIFT_TOLERANCE.max(volume.abs() * RELATIVE_DRIFT_TOLERANCE);
        if drift.abs() <= tolerance {
            0.0
        } else {
            drift
        }
    }
}
