//! Discrete-time signal-flow simulation engine.
//!
//! A [`System`] is an ordered list of components wired together by
//! connectors. Running it walks a common time axis one sample at a time:
//! Input components publish their samples, every other component applies its
//! transfer rule in a precomputed order, and Output components record what
//! arrives at their ports.
//!
//! # Architecture
//!
//! - Topology ([`System`], [`Component`], [`Connector`]) is immutable while a
//!   run is in progress.
//! - Per-run state (port values, Sum/Delay memory, nested subsystem state)
//!   lives in a `SimulationState` owned by the running `simulate` call and is
//!   rebuilt from zero on every call.
//! - The evaluation order ([`Schedule`]) is computed once per run. Feedback is
//!   only accepted when every cycle passes through a Sum or Delay.
//!
//! # Example
//!
//! ```
//! use sf_signal::Signal;
//! use sf_system::System;
//!
//! let mut system = System::new();
//! let input = system.add_input(Signal::constant(0.0, 1.0, 4, 1.0).unwrap());
//! let sum = system.add_sum();
//! let output = system.add_output();
//! system.add_connector((input, 0), (sum, 0)).unwrap();
//! system.add_connector((sum, 0), (output, 0)).unwrap();
//!
//! let outputs = system.simulate().unwrap();
//! assert_eq!(outputs[0].channel(0), vec![1.0, 2.0, 3.0, 4.0]);
//! ```

pub mod component;
pub mod connector;
pub mod error;
pub mod schedule;
pub mod sim;
pub mod system;

mod state;
pub(crate) mod validate;

pub use component::{Component, ComponentKind};
pub use connector::{Connector, Endpoint, PortDirection};
pub use error::{ConfigurationError, EvaluationError, SystemError, SystemResult};
pub use schedule::Schedule;
pub use sim::{SimOutcome, StepControl, StepProgress};
pub use system::System;
