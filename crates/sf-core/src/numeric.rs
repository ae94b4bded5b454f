use crate::SfError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SfError::NonFinite { what, value: v })
    }
}

/// Number of evenly spaced samples covering `[start, end]` at spacing `delta`.
///
/// `n = round((end - start) / delta) + 1`
pub fn sample_count(start: Real, end: Real, delta: Real) -> Result<usize, SfError> {
    ensure_finite(start, "x_start")?;
    ensure_finite(end, "x_end")?;
    ensure_finite(delta, "delta_x")?;
    if delta <= 0.0 {
        return Err(SfError::InvalidArg {
            what: "delta_x must be positive",
        });
    }
    if end < start {
        return Err(SfError::InvalidArg {
            what: "x_end must not precede x_start",
        });
    }
    Ok(((end - start) / delta).round() as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn sample_count_rounds_to_nearest() {
        assert_eq!(sample_count(0.0, 5.0, 1.0).unwrap(), 6);
        assert_eq!(sample_count(0.0, 0.0, 0.5).unwrap(), 1);
        // 0.3 / 0.1 is slightly below 3 in binary
        assert_eq!(sample_count(0.0, 0.3, 0.1).unwrap(), 4);
    }

    #[test]
    fn sample_count_rejects_bad_axis() {
        assert!(sample_count(0.0, 1.0, 0.0).is_err());
        assert!(sample_count(1.0, 0.0, 0.1).is_err());
        assert!(sample_count(0.0, Real::INFINITY, 0.1).is_err());
    }
}
