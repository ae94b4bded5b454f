//! Component variants and their port layout.
//!
//! Components are the processing elements of a system:
//! - **Sources**: Input components publish signal samples
//! - **Processors**: Add, Split, Sum, Delay, Gain, Function, Subsystem
//! - **Sinks**: Output components record what reaches them

use sf_core::{CompId, Real};
use sf_expr::Expression;
use sf_signal::Signal;

use crate::system::System;

/// A component in a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: CompId,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(id: CompId, kind: ComponentKind) -> Self {
        Self { id, kind }
    }

    /// Number of input ports.
    pub fn num_inputs(&self) -> usize {
        self.kind.num_inputs()
    }

    /// Number of output ports.
    pub fn num_outputs(&self) -> usize {
        self.kind.num_outputs()
    }
}

/// Component kind defines the type, parameters and signal of a component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Publishes one output port per signal channel.
    Input { signal: Signal },

    /// Records its input ports into `signal` (allocated when a run starts).
    Output {
        channels: usize,
        signal: Option<Signal>,
    },

    /// `out = in0 + in1`
    Add,

    /// `out0 = out1 = in`
    Split,

    /// Running total: `out = in + memory; memory = out`
    Sum,

    /// One-sample delay: `out = memory; memory = in`
    Delay,

    /// `out = coefficient * in`
    Gain { coefficient: Real },

    /// `out = expression(in)`
    Function { expression: Expression },

    /// Nested system. Ports map positionally onto the nested Input and
    /// Output channels.
    Subsystem {
        system: Box<System>,
        inputs: usize,
        outputs: usize,
    },
}

impl ComponentKind {
    /// Human readable kind name, also used as the persisted type tag.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Input { .. } => "Input",
            ComponentKind::Output { .. } => "Output",
            ComponentKind::Add => "Add",
            ComponentKind::Split => "Split",
            ComponentKind::Sum => "Sum",
            ComponentKind::Delay => "Delay",
            ComponentKind::Gain { .. } => "Gain",
            ComponentKind::Function { .. } => "Function",
            ComponentKind::Subsystem { .. } => "Subsystem",
        }
    }

    /// Get the number of inputs this component expects.
    pub fn num_inputs(&self) -> usize {
        match self {
            ComponentKind::Input { .. } => 0,
            ComponentKind::Output { channels, .. } => *channels,
            ComponentKind::Add => 2,
            ComponentKind::Split => 1,
            ComponentKind::Sum => 1,
            ComponentKind::Delay => 1,
            ComponentKind::Gain { .. } => 1,
            ComponentKind::Function { .. } => 1,
            ComponentKind::Subsystem { inputs, .. } => *inputs,
        }
    }

    /// Get the number of outputs this component produces.
    pub fn num_outputs(&self) -> usize {
        match self {
            ComponentKind::Input { signal } => signal.channels(),
            ComponentKind::Output { .. } => 0,
            ComponentKind::Add => 1,
            ComponentKind::Split => 2,
            ComponentKind::Sum => 1,
            ComponentKind::Delay => 1,
            ComponentKind::Gain { .. } => 1,
            ComponentKind::Function { .. } => 1,
            ComponentKind::Subsystem { outputs, .. } => *outputs,
        }
    }

    /// Whether the component carries memory across steps.
    ///
    /// Connectors into a stateful component may close a feedback loop.
    pub fn is_stateful(&self) -> bool {
        match self {
            ComponentKind::Sum | ComponentKind::Delay => true,
            ComponentKind::Input { .. }
            | ComponentKind::Output { .. }
            | ComponentKind::Add
            | ComponentKind::Split
            | ComponentKind::Gain { .. }
            | ComponentKind::Function { .. }
            | ComponentKind::Subsystem { .. } => false,
        }
    }

    /// Whether the component is evaluated in the scheduled order, as opposed
    /// to being driven directly at the start (Input) or end (Output) of a step.
    pub fn is_processor(&self) -> bool {
        !matches!(
            self,
            ComponentKind::Input { .. } | ComponentKind::Output { .. }
        )
    }
}
