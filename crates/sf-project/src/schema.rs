//! Project schema definitions.

use serde::{Deserialize, Serialize};
use sf_signal::Codomain;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Files written before versioning carry no field and read as 0.
    #[serde(default)]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub systems: Vec<SystemDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub connectors: Vec<ConnectorDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub id: String,
    pub kind: ComponentKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ComponentKindDef {
    Input {
        signal: SignalDef,
    },
    Output {
        #[serde(default = "default_channels")]
        channels: usize,
    },
    Add,
    Split,
    Sum,
    Delay,
    Gain {
        coefficient: f64,
    },
    Function {
        expression: String,
    },
    Subsystem {
        inputs: usize,
        outputs: usize,
        system: Box<SystemDef>,
    },
}

fn default_channels() -> usize {
    1
}

impl ComponentKindDef {
    /// Type tag as written in project files.
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKindDef::Input { .. } => "Input",
            ComponentKindDef::Output { .. } => "Output",
            ComponentKindDef::Add => "Add",
            ComponentKindDef::Split => "Split",
            ComponentKindDef::Sum => "Sum",
            ComponentKindDef::Delay => "Delay",
            ComponentKindDef::Gain { .. } => "Gain",
            ComponentKindDef::Function { .. } => "Function",
            ComponentKindDef::Subsystem { .. } => "Subsystem",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorDef {
    pub from: String,
    #[serde(default)]
    pub from_port: usize,
    pub to: String,
    #[serde(default)]
    pub to_port: usize,
}

/// Sampled signal stored inline, one row of channel values per sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalDef {
    pub x_start: f64,
    pub x_end: f64,
    pub delta_x: f64,
    pub channels: usize,
    #[serde(default)]
    pub codomain: Codomain,
    pub samples: Vec<Vec<f64>>,
}
