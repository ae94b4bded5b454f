//! Sampled signal container.

use sf_core::{Real, SfError, ensure_finite};

use crate::axis::TimeAxis;
use crate::codomain::Codomain;
use crate::error::{SignalError, SignalResult};

/// Evenly sampled, multi-channel time series.
///
/// Samples are stored row-major: `y[k * channels + ch]` is channel `ch` at
/// sample `k`. The shape never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    x_start: Real,
    x_end: Real,
    delta_x: Real,
    n: usize,
    channels: usize,
    codomain: Codomain,
    y: Vec<Real>,
}

impl Signal {
    /// Zero-filled signal over `[x_start, x_end]`.
    pub fn zeros(
        x_start: Real,
        x_end: Real,
        delta_x: Real,
        codomain: Codomain,
        channels: usize,
    ) -> SignalResult<Self> {
        if channels == 0 {
            return Err(SfError::InvalidArg {
                what: "a signal needs at least one channel",
            }
            .into());
        }
        let axis = TimeAxis::new(x_start, x_end, delta_x)?;
        Ok(Self {
            x_start,
            x_end,
            delta_x,
            n: axis.n,
            channels,
            codomain,
            y: vec![0.0; axis.n * channels],
        })
    }

    /// Zero-filled signal over an existing axis.
    pub fn zeros_on(axis: &TimeAxis, codomain: Codomain, channels: usize) -> SignalResult<Self> {
        Self::zeros(axis.x_start, axis.x_end, axis.delta_x, codomain, channels)
    }

    /// Signal from row-major samples; `x_end` is derived from the sample count.
    pub fn from_samples(
        x_start: Real,
        delta_x: Real,
        codomain: Codomain,
        channels: usize,
        y: Vec<Real>,
    ) -> SignalResult<Self> {
        if channels == 0 || y.is_empty() || y.len() % channels != 0 {
            return Err(SignalError::Shape {
                len: y.len(),
                channels,
            });
        }
        for v in &y {
            ensure_finite(*v, "sample")?;
        }
        let n = y.len() / channels;
        let x_end = x_start + (n - 1) as Real * delta_x;
        // validates start/interval
        TimeAxis::new(x_start, x_end, delta_x)?;
        Ok(Self {
            x_start,
            x_end,
            delta_x,
            n,
            channels,
            codomain,
            y,
        })
    }

    /// Signal with an explicitly stated axis end, as read back from storage.
    ///
    /// The sample count must match `round((x_end - x_start) / delta_x) + 1`.
    pub fn from_parts(
        x_start: Real,
        x_end: Real,
        delta_x: Real,
        codomain: Codomain,
        channels: usize,
        y: Vec<Real>,
    ) -> SignalResult<Self> {
        let mut signal = Self::from_samples(x_start, delta_x, codomain, channels, y)?;
        let axis = TimeAxis::new(x_start, x_end, delta_x)?;
        if axis.n != signal.n {
            return Err(SignalError::AxisMismatch {
                declared: axis.n,
                found: signal.n,
            });
        }
        signal.x_end = x_end;
        Ok(signal)
    }

    /// Single-channel real signal.
    pub fn mono(x_start: Real, delta_x: Real, values: Vec<Real>) -> SignalResult<Self> {
        Self::from_samples(x_start, delta_x, Codomain::default(), 1, values)
    }

    /// Single-channel signal holding `value` for `n` samples starting at `x_start`.
    pub fn constant(x_start: Real, delta_x: Real, n: usize, value: Real) -> SignalResult<Self> {
        Self::mono(x_start, delta_x, vec![value; n])
    }

    pub fn x_start(&self) -> Real {
        self.x_start
    }

    pub fn x_end(&self) -> Real {
        self.x_end
    }

    pub fn delta_x(&self) -> Real {
        self.delta_x
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn codomain(&self) -> Codomain {
        self.codomain
    }

    pub fn axis(&self) -> TimeAxis {
        TimeAxis {
            x_start: self.x_start,
            x_end: self.x_end,
            delta_x: self.delta_x,
            n: self.n,
        }
    }

    /// Position of sample `k`.
    pub fn x_at(&self, k: usize) -> Real {
        self.x_start + k as Real * self.delta_x
    }

    /// Raw row-major samples.
    pub fn samples(&self) -> &[Real] {
        &self.y
    }

    /// All channels of sample `k`.
    pub fn row(&self, k: usize) -> &[Real] {
        &self.y[k * self.channels..(k + 1) * self.channels]
    }

    /// Channel `ch` of sample `k`.
    pub fn value(&self, k: usize, ch: usize) -> Real {
        self.y[k * self.channels + ch]
    }

    /// Overwrite channel `ch` of sample `k`.
    pub fn set(&mut self, k: usize, ch: usize, value: Real) {
        self.y[k * self.channels + ch] = value;
    }

    /// Copy of one channel as a plain vector.
    pub fn channel(&self, ch: usize) -> Vec<Real> {
        (0..self.n).map(|k| self.value(k, ch)).collect()
    }

    /// Index of the sample closest to `x`, clamped to the signal.
    pub fn nearest_index(&self, x: Real) -> usize {
        let pos = ((x - self.x_start) / self.delta_x).round();
        if pos <= 0.0 {
            0
        } else {
            (pos as usize).min(self.n - 1)
        }
    }

    /// Whether `x` falls within half a sample of the signal's span.
    pub fn covers(&self, x: Real) -> bool {
        let half = 0.5 * self.delta_x;
        x >= self.x_start - half && x < self.x_end + half
    }
}
