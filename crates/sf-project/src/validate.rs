//! Project validation logic.
//!
//! Structural checks only: ids, references and shapes. Whether a system can
//! actually run (feedback loops, fan-in, expressions) is decided by
//! `sf-system` when the system is built and validated.

use std::collections::HashSet;

use crate::schema::{ComponentDef, ComponentKindDef, Project, SignalDef, SystemDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut system_ids = HashSet::new();
    for system in &project.systems {
        if !system_ids.insert(&system.id) {
            return Err(ValidationError::DuplicateId {
                id: system.id.clone(),
                context: "systems".to_string(),
            });
        }
        validate_system(system)?;
    }

    Ok(())
}

pub(crate) fn validate_system(system: &SystemDef) -> Result<(), ValidationError> {
    let mut component_ids = HashSet::new();
    for component in &system.components {
        if !component_ids.insert(&component.id) {
            return Err(ValidationError::DuplicateId {
                id: component.id.clone(),
                context: format!("system '{}' components", system.name),
            });
        }
        validate_component(component, &system.name)?;
    }

    for connector in &system.connectors {
        for id in [&connector.from, &connector.to] {
            if !component_ids.contains(id) {
                return Err(ValidationError::MissingReference {
                    id: id.clone(),
                    context: format!("system '{}' connectors", system.name),
                });
            }
        }
    }

    Ok(())
}

fn validate_component(component: &ComponentDef, system_name: &str) -> Result<(), ValidationError> {
    match &component.kind {
        ComponentKindDef::Input { signal } => {
            validate_signal(signal, &format!("{system_name}/{}", component.id))
        }
        ComponentKindDef::Output { channels } if *channels == 0 => {
            Err(ValidationError::InvalidValue {
                field: format!("component '{}' channels", component.id),
                value: "0".to_string(),
                reason: "outputs need at least one channel".to_string(),
            })
        }
        ComponentKindDef::Gain { coefficient } if !coefficient.is_finite() => {
            Err(ValidationError::InvalidValue {
                field: format!("component '{}' coefficient", component.id),
                value: coefficient.to_string(),
                reason: "gain must be finite".to_string(),
            })
        }
        ComponentKindDef::Function { expression } if expression.trim().is_empty() => {
            Err(ValidationError::InvalidValue {
                field: format!("component '{}' expression", component.id),
                value: String::new(),
                reason: "expression must not be empty".to_string(),
            })
        }
        ComponentKindDef::Subsystem { system, .. } => validate_system(system),
        _ => Ok(()),
    }
}

fn validate_signal(signal: &SignalDef, context: &str) -> Result<(), ValidationError> {
    if signal.channels == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} signal channels"),
            value: "0".to_string(),
            reason: "signals need at least one channel".to_string(),
        });
    }
    if signal.samples.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} signal samples"),
            value: "[]".to_string(),
            reason: "signals need at least one sample".to_string(),
        });
    }
    if !(signal.delta_x.is_finite() && signal.delta_x > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} signal delta_x"),
            value: signal.delta_x.to_string(),
            reason: "sampling interval must be positive".to_string(),
        });
    }
    for (k, row) in signal.samples.iter().enumerate() {
        if row.len() != signal.channels {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} signal samples[{k}]"),
                value: row.len().to_string(),
                reason: format!("expected {} channel value(s)", signal.channels),
            });
        }
    }
    Ok(())
}
