//! Conversion between project definitions and runnable systems.

use std::collections::HashMap;

use sf_core::CompId;
use sf_signal::Signal;
use sf_system::{ComponentKind, System};

use crate::schema::{ComponentDef, ComponentKindDef, ConnectorDef, SignalDef, SystemDef};
use crate::validate::{ValidationError, validate_system};
use crate::{ProjectError, ProjectResult};

/// Build a runnable [`System`] from its definition, nested systems included.
///
/// Components are added in file order, so the Output order of the built
/// system follows the file.
pub fn build_system(def: &SystemDef) -> ProjectResult<System> {
    validate_system(def)?;

    let mut system = System::new();
    let mut ids: HashMap<&str, CompId> = HashMap::with_capacity(def.components.len());
    for component in &def.components {
        let id = add_component(&mut system, component, def)?;
        ids.insert(component.id.as_str(), id);
    }

    for connector in &def.connectors {
        let from = lookup(&ids, &connector.from, def)?;
        let to = lookup(&ids, &connector.to, def)?;
        system
            .add_connector((from, connector.from_port), (to, connector.to_port))
            .map_err(|source| ProjectError::Build {
                system: def.id.clone(),
                source,
            })?;
    }

    Ok(system)
}

fn add_component(
    system: &mut System,
    component: &ComponentDef,
    def: &SystemDef,
) -> ProjectResult<CompId> {
    let build_error = |source: sf_system::SystemError| ProjectError::Build {
        system: def.id.clone(),
        source,
    };
    let id = match &component.kind {
        ComponentKindDef::Input { signal } => system.add_input(signal_from_def(signal, def)?),
        ComponentKindDef::Output { channels } => {
            system.add_output_channels(*channels).map_err(build_error)?
        }
        ComponentKindDef::Add => system.add_add(),
        ComponentKindDef::Split => system.add_split(),
        ComponentKindDef::Sum => system.add_sum(),
        ComponentKindDef::Delay => system.add_delay(),
        ComponentKindDef::Gain { coefficient } => system.add_gain(*coefficient),
        ComponentKindDef::Function { expression } => {
            system.add_function(expression).map_err(build_error)?
        }
        ComponentKindDef::Subsystem {
            inputs,
            outputs,
            system: nested,
        } => {
            let nested = build_system(nested)?;
            system.add_subsystem_with_ports(nested, *inputs, *outputs)
        }
    };
    Ok(id)
}

fn lookup(ids: &HashMap<&str, CompId>, id: &str, def: &SystemDef) -> ProjectResult<CompId> {
    ids.get(id).copied().ok_or_else(|| {
        ValidationError::MissingReference {
            id: id.to_string(),
            context: format!("system '{}' connectors", def.name),
        }
        .into()
    })
}

fn signal_from_def(signal: &SignalDef, def: &SystemDef) -> ProjectResult<Signal> {
    let samples: Vec<f64> = signal.samples.iter().flatten().copied().collect();
    Signal::from_parts(
        signal.x_start,
        signal.x_end,
        signal.delta_x,
        signal.codomain,
        signal.channels,
        samples,
    )
    .map_err(|source| ProjectError::Signal {
        system: def.id.clone(),
        source,
    })
}

/// Stored form of a signal.
pub fn signal_def(signal: &Signal) -> SignalDef {
    SignalDef {
        x_start: signal.x_start(),
        x_end: signal.x_end(),
        delta_x: signal.delta_x(),
        channels: signal.channels(),
        codomain: signal.codomain(),
        samples: (0..signal.len()).map(|k| signal.row(k).to_vec()).collect(),
    }
}

/// Definition of `system` suitable for saving.
///
/// Component ids are written as `c<index>`; nested systems take the id of the
/// Subsystem component that owns them.
pub fn system_def(system: &System, id: &str, name: &str) -> SystemDef {
    let component_id = |c: CompId| format!("c{}", c.index());

    let components = system
        .components()
        .iter()
        .map(|component| {
            let cid = component_id(component.id);
            let kind = match &component.kind {
                ComponentKind::Input { signal } => ComponentKindDef::Input {
                    signal: signal_def(signal),
                },
                ComponentKind::Output { channels, .. } => ComponentKindDef::Output {
                    channels: *channels,
                },
                ComponentKind::Add => ComponentKindDef::Add,
                ComponentKind::Split => ComponentKindDef::Split,
                ComponentKind::Sum => ComponentKindDef::Sum,
                ComponentKind::Delay => ComponentKindDef::Delay,
                ComponentKind::Gain { coefficient } => ComponentKindDef::Gain {
                    coefficient: *coefficient,
                },
                ComponentKind::Function { expression } => ComponentKindDef::Function {
                    expression: expression.source().to_string(),
                },
                ComponentKind::Subsystem {
                    system: nested,
                    inputs,
                    outputs,
                } => ComponentKindDef::Subsystem {
                    inputs: *inputs,
                    outputs: *outputs,
                    system: Box::new(system_def(nested, &cid, &cid)),
                },
            };
            ComponentDef { id: cid, kind }
        })
        .collect();

    let connectors = system
        .connectors()
        .iter()
        .map(|connector| ConnectorDef {
            from: component_id(connector.source.component),
            from_port: connector.source.port,
            to: component_id(connector.dest.component),
            to_port: connector.dest.port,
        })
        .collect();

    SystemDef {
        id: id.to_string(),
        name: name.to_string(),
        components,
        connectors,
    }
}
