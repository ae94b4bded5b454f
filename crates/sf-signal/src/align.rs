//! Alignment of several signals onto one common axis.

use sf_core::{Tolerances, nearly_equal};
use tracing::debug;

use crate::axis::TimeAxis;
use crate::error::{SignalError, SignalResult};
use crate::signal::Signal;

/// Common axis spanning every signal in `signals`.
///
/// All signals must share one sampling interval; the axis runs from the
/// earliest start to the latest end.
pub fn common_axis<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> SignalResult<TimeAxis> {
    let tol = Tolerances::default();
    let mut iter = signals.into_iter();
    let first = iter.next().ok_or(SignalError::NoSignals)?;

    let delta_x = first.delta_x();
    let mut start = first.x_start();
    let mut end = first.x_end();

    for (i, signal) in iter.enumerate() {
        if !nearly_equal(signal.delta_x(), delta_x, tol) {
            return Err(SignalError::SamplingMismatch {
                index: i + 1,
                expected: delta_x,
                found: signal.delta_x(),
            });
        }
        start = start.min(signal.x_start());
        end = end.max(signal.x_end());
    }

    TimeAxis::new(start, end, delta_x)
}

/// Copy `signal` onto `axis`, zero outside the original span.
///
/// Each axis position inside the original span takes the value of the
/// nearest original sample.
pub fn align_to(signal: &Signal, axis: &TimeAxis) -> SignalResult<Signal> {
    let mut aligned = Signal::zeros_on(axis, signal.codomain(), signal.channels())?;
    for k in 0..axis.n {
        let x = axis.x_at(k);
        if !signal.covers(x) {
            continue;
        }
        let src = signal.nearest_index(x);
        for ch in 0..signal.channels() {
            aligned.set(k, ch, signal.value(src, ch));
        }
    }
    Ok(aligned)
}

/// Replace every signal that does not already span the common axis with a
/// padded copy, returning the axis.
///
/// Accepts any collection of mutable signal references, so callers can pad
/// signals that live inside larger structures in place.
pub fn pad_signals<'a>(
    signals: impl IntoIterator<Item = &'a mut Signal>,
) -> SignalResult<TimeAxis> {
    let mut signals: Vec<&'a mut Signal> = signals.into_iter().collect();
    let axis = common_axis(signals.iter().map(|s| &**s))?;
    for (i, signal) in signals.iter_mut().enumerate() {
        if signal.axis().same_grid(&axis) {
            continue;
        }
        debug!(
            index = i,
            from = signal.x_start(),
            to = signal.x_end(),
            "padding signal onto common axis"
        );
        **signal = align_to(&**signal, &axis)?;
    }
    Ok(axis)
}
