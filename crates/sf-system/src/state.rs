//! Per-run mutable state, kept apart from the immutable topology.

use sf_core::Real;

use crate::component::ComponentKind;
use crate::system::System;

/// Port values and memory of one component.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComponentState {
    pub inputs: Vec<Real>,
    pub outputs: Vec<Real>,
    /// Running total for Sum, previous input for Delay.
    pub memory: Real,
    /// State of a Subsystem's nested system, owned by this entry alone.
    pub nested: Option<Box<SimulationState>>,
}

/// State of every component of one system level, indexed by component slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimulationState {
    pub components: Vec<ComponentState>,
}

impl SimulationState {
    /// Fresh state: every port and memory at zero, recursively.
    pub fn new(system: &System) -> Self {
        let components = system
            .components()
            .iter()
            .map(|component| ComponentState {
                inputs: vec![0.0; component.num_inputs()],
                outputs: vec![0.0; component.num_outputs()],
                memory: 0.0,
                nested: match &component.kind {
                    ComponentKind::Subsystem { system, .. } => {
                        Some(Box::new(SimulationState::new(system)))
                    }
                    _ => None,
                },
            })
            .collect();
        Self { components }
    }
}
