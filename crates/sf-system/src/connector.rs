//! Connectors between component ports.

use std::fmt;

use sf_core::{CompId, ConnectorId};

/// One port of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub component: CompId,
    pub port: usize,
}

impl Endpoint {
    pub fn new(component: CompId, port: usize) -> Self {
        Self { component, port }
    }
}

impl From<(CompId, usize)> for Endpoint {
    fn from((component, port): (CompId, usize)) -> Self {
        Self { component, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.port)
    }
}

/// Which side of a component a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Directed wire from an output port to an input port.
///
/// A destination port accepts exactly one connector; a source port may feed
/// any number of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub id: ConnectorId,
    pub source: Endpoint,
    pub dest: Endpoint,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.dest)
    }
}
