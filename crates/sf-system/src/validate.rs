//! Structural checks run before a system is scheduled.

use std::collections::HashMap;

use crate::component::ComponentKind;
use crate::connector::{Endpoint, PortDirection};
use crate::error::ConfigurationError;
use crate::system::System;

/// Validate connectors and component parameters of one system level.
///
/// Nested systems are checked when their own schedule is compiled.
pub(crate) fn validate_structure(system: &System) -> Result<(), ConfigurationError> {
    for connector in system.connectors() {
        system.check_port(connector.source, PortDirection::Output)?;
        system.check_port(connector.dest, PortDirection::Input)?;
    }

    validate_fan_in(system)?;

    for component in system.components() {
        match &component.kind {
            ComponentKind::Gain { coefficient } if !coefficient.is_finite() => {
                return Err(ConfigurationError::NonFiniteGain {
                    component: component.id,
                    coefficient: *coefficient,
                });
            }
            ComponentKind::Subsystem {
                system: nested,
                inputs,
                outputs,
            } => {
                let actual_inputs = nested.input_channels();
                let actual_outputs = nested.output_channels();
                if *inputs != actual_inputs || *outputs != actual_outputs {
                    return Err(ConfigurationError::SubsystemPorts {
                        component: component.id,
                        declared_inputs: *inputs,
                        declared_outputs: *outputs,
                        actual_inputs,
                        actual_outputs,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Every input port accepts at most one connector.
fn validate_fan_in(system: &System) -> Result<(), ConfigurationError> {
    let mut counts: HashMap<Endpoint, usize> = HashMap::new();
    for connector in system.connectors() {
        *counts.entry(connector.dest).or_default() += 1;
    }

    // Report the lowest offending port so the error is stable.
    let worst = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .min_by_key(|(endpoint, _)| *endpoint);
    match worst {
        Some((endpoint, count)) => Err(ConfigurationError::FanIn {
            component: endpoint.component,
            port: endpoint.port,
            count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_connector_into_a_port_is_fan_in() {
        let mut system = System::new();
        let a = system.add_gain(1.0);
        let b = system.add_gain(1.0);
        let sink = system.add_gain(1.0);
        system.add_connector((a, 0), (sink, 0)).unwrap();
        system.add_connector((b, 0), (sink, 0)).unwrap();

        let err = validate_structure(&system).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::FanIn {
                component: sink,
                port: 0,
                count: 2
            }
        );
    }

    #[test]
    fn fan_out_is_allowed() {
        let mut system = System::new();
        let a = system.add_gain(1.0);
        let b = system.add_gain(1.0);
        let c = system.add_gain(1.0);
        system.add_connector((a, 0), (b, 0)).unwrap();
        system.add_connector((a, 0), (c, 0)).unwrap();
        assert!(validate_structure(&system).is_ok());
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let mut system = System::new();
        let gain = system.add_gain(f64::NAN);
        assert!(matches!(
            validate_structure(&system),
            Err(ConfigurationError::NonFiniteGain { component, .. }) if component == gain
        ));
    }

    #[test]
    fn declared_subsystem_ports_must_match() {
        let mut inner = System::new();
        inner.add_output();

        let mut outer = System::new();
        let sub = outer.add_subsystem_with_ports(inner, 1, 1);
        assert_eq!(
            validate_structure(&outer).unwrap_err(),
            ConfigurationError::SubsystemPorts {
                component: sub,
                declared_inputs: 1,
                declared_outputs: 1,
                actual_inputs: 0,
                actual_outputs: 1,
            }
        );
    }
}
