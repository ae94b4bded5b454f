//! Checked evaluation order.
//!
//! Connectors between non-Input/Output components form a dependency graph.
//! An edge into a stateless component is *hard*: the consumer must run after
//! its producer within a step. An edge into a Sum or Delay is *soft*, because
//! those components can take their feedback contribution from memory. A
//! cycle made only of hard edges has no valid order and is rejected.
//!
//! The order itself is the strongly connected components of the full graph
//! in topological order. Inside a feedback loop the members are sorted by
//! their hard edges, ties going to the lowest component id.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use sf_core::CompId;
use tracing::debug;

use crate::component::ComponentKind;
use crate::connector::Endpoint;
use crate::error::ConfigurationError;
use crate::system::System;
use crate::validate;

/// Compiled per-run plan for one system level.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    order: Vec<CompId>,
    inputs: Vec<CompId>,
    outputs: Vec<CompId>,
    delays: Vec<CompId>,
    /// Per component slot, per input port: the connected source.
    sources: Vec<Vec<Option<Endpoint>>>,
    /// Per component slot: the schedule of a Subsystem's nested system.
    nested: Vec<Option<Schedule>>,
}

impl Schedule {
    /// Validate `system` (and every nested system) and compute its order.
    pub fn compile(system: &System) -> Result<Self, ConfigurationError> {
        validate::validate_structure(system)?;

        let components = system.components();
        let mut sources: Vec<Vec<Option<Endpoint>>> = components
            .iter()
            .map(|c| vec![None; c.num_inputs()])
            .collect();
        for connector in system.connectors() {
            sources[connector.dest.component.slot()][connector.dest.port] = Some(connector.source);
        }

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut delays = Vec::new();
        let mut nested = Vec::with_capacity(components.len());
        for component in components {
            match &component.kind {
                ComponentKind::Input { .. } => inputs.push(component.id),
                ComponentKind::Output { .. } => outputs.push(component.id),
                ComponentKind::Delay => delays.push(component.id),
                _ => {}
            }
            let inner = match &component.kind {
                ComponentKind::Subsystem { system, .. } => Some(Schedule::compile(system).map_err(
                    |source| ConfigurationError::Nested {
                        component: component.id,
                        source: Box::new(source),
                    },
                )?),
                _ => None,
            };
            nested.push(inner);
        }

        for (slot, ports) in sources.iter().enumerate() {
            for (port, source) in ports.iter().enumerate() {
                if source.is_none() {
                    debug!(component = slot, port, "input port left unconnected, reads 0");
                }
            }
        }

        let order = evaluation_order(system)?;
        debug!(
            components = components.len(),
            scheduled = order.len(),
            "compiled evaluation schedule"
        );

        Ok(Self {
            order,
            inputs,
            outputs,
            delays,
            sources,
            nested,
        })
    }

    /// Evaluation order of the processing components.
    pub fn order(&self) -> &[CompId] {
        &self.order
    }

    /// Input components, in insertion order.
    pub fn inputs(&self) -> &[CompId] {
        &self.inputs
    }

    /// Output components, in insertion order.
    pub fn outputs(&self) -> &[CompId] {
        &self.outputs
    }

    /// Delay components, latched at the end of every step.
    pub fn delays(&self) -> &[CompId] {
        &self.delays
    }

    /// Sources feeding each input port of `component`; `None` for an
    /// unconnected port.
    pub fn sources(&self, component: CompId) -> &[Option<Endpoint>] {
        self.sources
            .get(component.slot())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Schedule of the nested system when `component` is a Subsystem.
    pub fn nested(&self, component: CompId) -> Option<&Schedule> {
        self.nested.get(component.slot()).and_then(Option::as_ref)
    }
}

fn evaluation_order(system: &System) -> Result<Vec<CompId>, ConfigurationError> {
    let components = system.components();

    // Edge weight: whether the edge is hard.
    let mut graph: DiGraph<CompId, bool> = DiGraph::new();
    let mut nodes: Vec<Option<NodeIndex>> = vec![None; components.len()];
    for component in components.iter().filter(|c| c.kind.is_processor()) {
        nodes[component.id.slot()] = Some(graph.add_node(component.id));
    }
    for connector in system.connectors() {
        let from = nodes[connector.source.component.slot()];
        let to = nodes[connector.dest.component.slot()];
        if let (Some(from), Some(to)) = (from, to) {
            let hard = !components[connector.dest.component.slot()]
                .kind
                .is_stateful();
            graph.add_edge(from, to, hard);
        }
    }

    let hard_only = graph.filter_map(|_, id| Some(*id), |_, hard| hard.then_some(()));
    if let Err(cycle) = toposort(&hard_only, None) {
        return Err(ConfigurationError::UnbrokenCycle {
            component: hard_only[cycle.node_id()],
        });
    }

    let mut order = Vec::with_capacity(graph.node_count());
    // tarjan_scc yields components in reverse topological order.
    for scc in tarjan_scc(&graph).into_iter().rev() {
        if let [single] = scc.as_slice() {
            order.push(graph[*single]);
        } else {
            order.extend(order_loop(&graph, &scc));
        }
    }
    Ok(order)
}

/// Kahn's algorithm over the hard edges inside one feedback loop.
fn order_loop(graph: &DiGraph<CompId, bool>, members: &[NodeIndex]) -> Vec<CompId> {
    let mut in_degree: HashMap<NodeIndex, usize> = members.iter().map(|&n| (n, 0)).collect();
    for &node in members {
        for edge in graph.edges_directed(node, Direction::Outgoing) {
            if *edge.weight() {
                if let Some(deg) = in_degree.get_mut(&edge.target()) {
                    *deg += 1;
                }
            }
        }
    }

    let index: HashMap<CompId, NodeIndex> = members.iter().map(|&n| (graph[n], n)).collect();
    let mut ready: BTreeSet<CompId> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(node, _)| graph[*node])
        .collect();

    let mut order = Vec::with_capacity(members.len());
    while let Some(id) = ready.pop_first() {
        order.push(id);
        let node = index[&id];
        for edge in graph.edges_directed(node, Direction::Outgoing) {
            if !*edge.weight() {
                continue;
            }
            if let Some(deg) = in_degree.get_mut(&edge.target()) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(graph[edge.target()]);
                }
            }
        }
    }
    order
}
