//! Error types for building and running systems.

use std::fmt;

use sf_core::CompId;
use sf_expr::ExprError;
use sf_signal::SignalError;
use thiserror::Error;

use crate::connector::PortDirection;

/// Result type for system operations.
pub type SystemResult<T> = Result<T, SystemError>;

/// Errors raised by the simulation engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    /// The system cannot be run as built. Always raised before the first step.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A component failed while a run was in progress.
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl SystemError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, SystemError::Configuration(_))
    }
}

impl From<SignalError> for SystemError {
    fn from(err: SignalError) -> Self {
        SystemError::Configuration(ConfigurationError::Signal(err))
    }
}

/// Build-time errors: topology, parameters and signal shapes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Component {component} does not exist")]
    UnknownComponent { component: CompId },

    #[error("{kind} component {component} has no {direction} port {port} ({available} available)")]
    PortOutOfRange {
        component: CompId,
        kind: &'static str,
        direction: PortDirection,
        port: usize,
        available: usize,
    },

    #[error("Input port {port} of component {component} has {count} incoming connectors")]
    FanIn {
        component: CompId,
        port: usize,
        count: usize,
    },

    #[error("Cycle through component {component} passes through no Sum or Delay")]
    UnbrokenCycle { component: CompId },

    #[error(
        "Subsystem {component} declares {declared_inputs} input(s) and {declared_outputs} output(s), \
         its system provides {actual_inputs} and {actual_outputs}"
    )]
    SubsystemPorts {
        component: CompId,
        declared_inputs: usize,
        declared_outputs: usize,
        actual_inputs: usize,
        actual_outputs: usize,
    },

    #[error("Input {component} is sampled every {found}, expected {expected}")]
    SamplingMismatch {
        component: CompId,
        expected: f64,
        found: f64,
    },

    #[error("System has no Input component to define the time axis")]
    NoInputs,

    #[error("Output components need at least one channel")]
    NoChannels,

    #[error("Gain component {component} has non-finite coefficient {coefficient}")]
    NonFiniteGain { component: CompId, coefficient: f64 },

    #[error("Invalid expression '{expression}': {source}")]
    InvalidExpression {
        expression: String,
        source: ExprError,
    },

    #[error("Invalid signal: {0}")]
    Signal(#[from] SignalError),

    #[error("In subsystem {component}: {source}")]
    Nested {
        component: CompId,
        source: Box<ConfigurationError>,
    },
}

/// A Function component could not produce a value.
///
/// `path` lists component ids from the outermost system down to the failing
/// component, so a failure inside a subsystem reads `subsystem/function`.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("component {} failed at step {step}: {source}", ComponentPath(.path))]
pub struct EvaluationError {
    pub path: Vec<CompId>,
    pub step: usize,
    pub source: ExprError,
}

impl EvaluationError {
    pub fn new(component: CompId, step: usize, source: ExprError) -> Self {
        Self {
            path: vec![component],
            step,
            source,
        }
    }

    /// The failing component itself (innermost entry of the path).
    pub fn component(&self) -> Option<CompId> {
        self.path.last().copied()
    }

    /// Re-anchor an error raised inside a nested system under `subsystem`.
    pub(crate) fn within(mut self, subsystem: CompId) -> Self {
        self.path.insert(0, subsystem);
        self
    }
}

struct ComponentPath<'a>(&'a [CompId]);

impl fmt::Display for ComponentPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
