//! Evenly spaced sample axis.

use sf_core::{Real, Tolerances, nearly_equal, sample_count};

use crate::error::SignalResult;

/// Evenly spaced axis `x_start, x_start + delta_x, ..., x_end` with `n` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub x_start: Real,
    pub x_end: Real,
    pub delta_x: Real,
    pub n: usize,
}

impl TimeAxis {
    /// Build an axis, deriving `n` from the span and interval.
    pub fn new(x_start: Real, x_end: Real, delta_x: Real) -> SignalResult<Self> {
        let n = sample_count(x_start, x_end, delta_x)?;
        Ok(Self {
            x_start,
            x_end,
            delta_x,
            n,
        })
    }

    /// Position of sample `k`.
    pub fn x_at(&self, k: usize) -> Real {
        self.x_start + k as Real * self.delta_x
    }

    /// Number of samples (and therefore simulation steps).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether two axes describe the same sample grid.
    pub fn same_grid(&self, other: &TimeAxis) -> bool {
        let tol = Tolerances::default();
        self.n == other.n
            && nearly_equal(self.x_start, other.x_start, tol)
            && nearly_equal(self.delta_x, other.delta_x, tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_positions() {
        let axis = TimeAxis::new(2.0, 3.0, 0.25).unwrap();
        assert_eq!(axis.len(), 5);
        assert_eq!(axis.x_at(0), 2.0);
        assert_eq!(axis.x_at(4), 3.0);
    }

    #[test]
    fn same_grid_ignores_rounding_noise() {
        let a = TimeAxis::new(0.0, 0.3, 0.1).unwrap();
        let b = TimeAxis::new(0.0, 0.1 + 0.2, 0.1).unwrap();
        assert!(a.same_grid(&b));
        let c = TimeAxis::new(0.1, 0.4, 0.1).unwrap();
        assert!(!a.same_grid(&c));
    }
}
