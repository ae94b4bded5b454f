//! System builder and topology accessors.

use sf_core::{CompId, ConnectorId, Real};
use sf_expr::Expression;
use sf_signal::{Signal, SignalError, TimeAxis};
use tracing::debug;

use crate::component::{Component, ComponentKind};
use crate::connector::{Connector, Endpoint, PortDirection};
use crate::error::{ConfigurationError, SystemResult};
use crate::schedule::Schedule;

/// Block diagram of components wired by connectors.
///
/// Components and connectors are kept in insertion order and addressed by
/// ids derived from their position, so ids stay stable for the lifetime of
/// the system. Outputs of [`System::simulate`] follow the insertion order of
/// the Output components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct System {
    components: Vec<Component>,
    connectors: Vec<Connector>,
    axis: Option<TimeAxis>,
}

impl System {
    /// Create an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ComponentKind) -> CompId {
        let id = CompId::from_usize(self.components.len());
        self.components.push(Component::new(id, kind));
        id
    }

    /// Add an Input publishing `signal`, one output port per channel.
    pub fn add_input(&mut self, signal: Signal) -> CompId {
        self.push(ComponentKind::Input { signal })
    }

    /// Add a single-channel Output.
    pub fn add_output(&mut self) -> CompId {
        self.push(ComponentKind::Output {
            channels: 1,
            signal: None,
        })
    }

    /// Add an Output recording `channels` input ports.
    pub fn add_output_channels(&mut self, channels: usize) -> SystemResult<CompId> {
        if channels == 0 {
            return Err(ConfigurationError::NoChannels.into());
        }
        Ok(self.push(ComponentKind::Output {
            channels,
            signal: None,
        }))
    }

    pub fn add_add(&mut self) -> CompId {
        self.push(ComponentKind::Add)
    }

    pub fn add_split(&mut self) -> CompId {
        self.push(ComponentKind::Split)
    }

    pub fn add_sum(&mut self) -> CompId {
        self.push(ComponentKind::Sum)
    }

    pub fn add_delay(&mut self) -> CompId {
        self.push(ComponentKind::Delay)
    }

    /// Add a Gain. A non-finite coefficient is rejected when the system is
    /// validated.
    pub fn add_gain(&mut self, coefficient: Real) -> CompId {
        self.push(ComponentKind::Gain { coefficient })
    }

    /// Add a Function evaluating `expression` at its input value.
    ///
    /// The expression is parsed immediately; syntax errors, unknown names and
    /// wrong arities are reported here rather than during a run.
    pub fn add_function(&mut self, expression: &str) -> SystemResult<CompId> {
        let parsed =
            Expression::parse(expression).map_err(|source| ConfigurationError::InvalidExpression {
                expression: expression.to_string(),
                source,
            })?;
        Ok(self.push(ComponentKind::Function { expression: parsed }))
    }

    /// Add a Subsystem wrapping `system`, with ports matching the nested
    /// Input and Output channel totals.
    pub fn add_subsystem(&mut self, system: System) -> CompId {
        let inputs = system.input_channels();
        let outputs = system.output_channels();
        self.add_subsystem_with_ports(system, inputs, outputs)
    }

    /// Add a Subsystem with explicitly declared port counts.
    ///
    /// Counts that disagree with the nested system are rejected at validation.
    pub fn add_subsystem_with_ports(
        &mut self,
        system: System,
        inputs: usize,
        outputs: usize,
    ) -> CompId {
        self.push(ComponentKind::Subsystem {
            system: Box::new(system),
            inputs,
            outputs,
        })
    }

    /// Wire an output port to an input port.
    ///
    /// Multiple connectors into one input port are accepted here and rejected
    /// at validation, so a system loaded from disk reports every problem the
    /// same way.
    pub fn add_connector(
        &mut self,
        source: impl Into<Endpoint>,
        dest: impl Into<Endpoint>,
    ) -> SystemResult<ConnectorId> {
        let source = source.into();
        let dest = dest.into();
        self.check_port(source, PortDirection::Output)?;
        self.check_port(dest, PortDirection::Input)?;

        let id = ConnectorId::from_usize(self.connectors.len());
        self.connectors.push(Connector { id, source, dest });
        Ok(id)
    }

    pub(crate) fn check_port(
        &self,
        endpoint: Endpoint,
        direction: PortDirection,
    ) -> Result<(), ConfigurationError> {
        let component =
            self.component(endpoint.component)
                .ok_or(ConfigurationError::UnknownComponent {
                    component: endpoint.component,
                })?;
        let available = match direction {
            PortDirection::Input => component.num_inputs(),
            PortDirection::Output => component.num_outputs(),
        };
        if endpoint.port >= available {
            return Err(ConfigurationError::PortOutOfRange {
                component: endpoint.component,
                kind: component.kind.name(),
                direction,
                port: endpoint.port,
                available,
            });
        }
        Ok(())
    }

    /// All components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id.slot())
    }

    /// All connectors in insertion order.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Total channel count of the Input components, i.e. the number of input
    /// ports this system presents when used as a subsystem.
    pub fn input_channels(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Input { .. }))
            .map(Component::num_outputs)
            .sum()
    }

    /// Total channel count of the Output components.
    pub fn output_channels(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Output { .. }))
            .map(Component::num_inputs)
            .sum()
    }

    /// Axis computed by the most recent padding, if any.
    pub fn axis(&self) -> Option<TimeAxis> {
        self.axis
    }

    /// Signals currently held by the Output components, in insertion order.
    ///
    /// Empty until the first run; after a cancelled or failed run they hold
    /// the samples written so far.
    pub fn output_signals(&self) -> Vec<&Signal> {
        self.components
            .iter()
            .filter_map(|c| match &c.kind {
                ComponentKind::Output {
                    signal: Some(signal),
                    ..
                } => Some(signal),
                _ => None,
            })
            .collect()
    }

    /// Check the system can be run: connector fan-in, port counts of every
    /// subsystem, Gain coefficients, feedback loops, and Input signals that
    /// agree on one sampling interval. Nothing is padded.
    pub fn validate(&self) -> SystemResult<()> {
        Schedule::compile(self)?;
        self.input_axis()?;
        Ok(())
    }

    /// Common axis of the Input signals as they stand.
    pub fn input_axis(&self) -> SystemResult<TimeAxis> {
        let inputs = self.input_ids()?;
        let signals = self.components.iter().filter_map(|c| match &c.kind {
            ComponentKind::Input { signal } => Some(signal),
            _ => None,
        });
        let axis = sf_signal::common_axis(signals).map_err(|err| tag_input(&inputs, err))?;
        Ok(axis)
    }

    fn input_ids(&self) -> Result<Vec<CompId>, ConfigurationError> {
        let inputs: Vec<CompId> = self
            .components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Input { .. }))
            .map(|c| c.id)
            .collect();
        if inputs.is_empty() {
            return Err(ConfigurationError::NoInputs);
        }
        Ok(inputs)
    }

    /// Order in which the non-Input/Output components are evaluated each step.
    pub fn evaluation_order(&self) -> SystemResult<Vec<CompId>> {
        Ok(Schedule::compile(self)?.order().to_vec())
    }

    /// Align every Input signal to one common axis and give every Output a
    /// zeroed signal over it.
    ///
    /// Input signals must share one sampling interval. The axis spans the
    /// earliest start to the latest end; signals not already on it are
    /// replaced by zero-padded copies. Outputs take the codomain of the first
    /// Input.
    pub fn pad_signals(&mut self) -> SystemResult<TimeAxis> {
        let inputs = self.input_ids()?;

        let signals = self.components.iter_mut().filter_map(|c| match &mut c.kind {
            ComponentKind::Input { signal } => Some(signal),
            _ => None,
        });
        let axis = sf_signal::pad_signals(signals).map_err(|err| tag_input(&inputs, err))?;

        let codomain = self
            .components
            .iter()
            .find_map(|c| match &c.kind {
                ComponentKind::Input { signal } => Some(signal.codomain()),
                _ => None,
            })
            .unwrap_or_default();
        for component in &mut self.components {
            if let ComponentKind::Output { channels, signal } = &mut component.kind {
                *signal = Some(Signal::zeros_on(&axis, codomain, *channels)?);
            }
        }

        debug!(
            x_start = axis.x_start,
            x_end = axis.x_end,
            steps = axis.len(),
            "padded system signals"
        );
        self.axis = Some(axis);
        Ok(axis)
    }

    /// Move the Output signals out of their components, in insertion order.
    pub(crate) fn take_output_signals(&mut self) -> Vec<Signal> {
        self.components
            .iter_mut()
            .filter_map(|c| match &mut c.kind {
                ComponentKind::Output { signal, .. } => signal.take(),
                _ => None,
            })
            .collect()
    }

    /// Hand signals back to the Output components, in insertion order.
    pub(crate) fn restore_output_signals(&mut self, signals: &[Signal]) {
        let slots = self.components.iter_mut().filter_map(|c| match &mut c.kind {
            ComponentKind::Output { signal, .. } => Some(signal),
            _ => None,
        });
        for (slot, signal) in slots.zip(signals) {
            *slot = Some(signal.clone());
        }
    }
}

/// Name the Input component behind a signal-level alignment error.
fn tag_input(inputs: &[CompId], err: SignalError) -> ConfigurationError {
    match err {
        SignalError::SamplingMismatch {
            index,
            expected,
            found,
        } => ConfigurationError::SamplingMismatch {
            component: inputs[index],
            expected,
            found,
        },
        SignalError::NoSignals => ConfigurationError::NoInputs,
        other => ConfigurationError::Signal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SystemError;

    #[test]
    fn ids_follow_insertion_order() {
        let mut system = System::new();
        let a = system.add_gain(2.0);
        let b = system.add_delay();
        assert_eq!(a.slot(), 0);
        assert_eq!(b.slot(), 1);
        assert_eq!(system.component(b).map(|c| c.kind.name()), Some("Delay"));
    }

    #[test]
    fn connector_to_missing_component_is_rejected() {
        let mut system = System::new();
        let gain = system.add_gain(1.0);
        let err = system
            .add_connector((gain, 0), (CompId::from_index(9), 0))
            .unwrap_err();
        assert!(matches!(
            err,
            SystemError::Configuration(ConfigurationError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn connector_port_range_is_checked() {
        let mut system = System::new();
        let add = system.add_add();
        let out = system.add_output();
        let err = system.add_connector((add, 1), (out, 0)).unwrap_err();
        assert!(matches!(
            err,
            SystemError::Configuration(ConfigurationError::PortOutOfRange {
                direction: PortDirection::Output,
                port: 1,
                available: 1,
                ..
            })
        ));
        assert!(system.add_connector((add, 0), (out, 0)).is_ok());
    }

    #[test]
    fn bad_expression_is_a_configuration_error() {
        let mut system = System::new();
        let err = system.add_function("sin(").unwrap_err();
        assert!(err.is_configuration());
        assert!(system.components().is_empty());
    }

    #[test]
    fn zero_channel_output_is_rejected() {
        let mut system = System::new();
        assert_eq!(
            system.add_output_channels(0).unwrap_err(),
            SystemError::Configuration(ConfigurationError::NoChannels)
        );
    }

    #[test]
    fn subsystem_ports_follow_nested_channels() {
        let mut inner = System::new();
        inner.add_input(Signal::zeros(0.0, 1.0, 1.0, Default::default(), 2).unwrap());
        inner.add_output_channels(3).unwrap();

        let mut outer = System::new();
        let sub = outer.add_subsystem(inner);
        let component = outer.component(sub).unwrap();
        assert_eq!(component.num_inputs(), 2);
        assert_eq!(component.num_outputs(), 3);
    }

    #[test]
    fn padding_without_inputs_fails() {
        let mut system = System::new();
        system.add_output();
        assert_eq!(
            system.pad_signals().unwrap_err(),
            SystemError::Configuration(ConfigurationError::NoInputs)
        );
    }

    #[test]
    fn padding_names_the_mismatched_input() {
        let mut system = System::new();
        system.add_input(Signal::constant(0.0, 1.0, 4, 1.0).unwrap());
        system.add_gain(1.0);
        let odd = system.add_input(Signal::constant(0.0, 0.5, 4, 1.0).unwrap());
        let err = system.pad_signals().unwrap_err();
        assert!(matches!(
            err,
            SystemError::Configuration(ConfigurationError::SamplingMismatch { component, .. })
                if component == odd
        ));
    }

    #[test]
    fn validation_leaves_input_signals_untouched() {
        let mut system = System::new();
        let early = system.add_input(Signal::constant(0.0, 1.0, 3, 1.0).unwrap());
        system.add_input(Signal::constant(4.0, 1.0, 3, 1.0).unwrap());
        system.add_output();

        system.validate().unwrap();
        assert_eq!(system.input_axis().unwrap().n, 7);
        let Some(ComponentKind::Input { signal }) = system.component(early).map(|c| &c.kind) else {
            panic!("expected an Input");
        };
        assert_eq!(signal.len(), 3);
        assert!(system.axis().is_none());
    }

    #[test]
    fn padding_allocates_outputs_on_the_common_axis() {
        let mut system = System::new();
        system.add_input(Signal::constant(0.0, 1.0, 6, 1.0).unwrap());
        system.add_input(Signal::constant(2.0, 1.0, 7, 1.0).unwrap());
        system.add_output_channels(2).unwrap();

        let axis = system.pad_signals().unwrap();
        assert_eq!(axis.n, 9);
        let outputs = system.output_signals();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].len(), 9);
        assert_eq!(outputs[0].channels(), 2);
    }
}
