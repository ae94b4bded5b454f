//! Sampled signal container and time-axis alignment for signalflow.
//!
//! A [`Signal`] is an evenly sampled function of one independent variable
//! carrying one or more channels of amplitude. The simulation engine consumes
//! signals through Input components and produces them through Output
//! components; it never reshapes a signal in place.
//!
//! # Alignment
//!
//! Input signals may start and end at different positions. Before a run all of
//! them are placed on one common [`TimeAxis`] by [`pad_signals`], which
//! allocates zero-filled signals over the union of their spans and copies the
//! original samples into position with a nearest-sample lookup.

pub mod align;
pub mod axis;
pub mod codomain;
pub mod error;
pub mod signal;

pub use align::{align_to, common_axis, pad_signals};
pub use axis::TimeAxis;
pub use codomain::{Codomain, CodomainKind};
pub use error::{SignalError, SignalResult};
pub use signal::Signal;
