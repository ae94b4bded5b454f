//! Step loop, progress reporting and cancellation.

use sf_core::{CompId, Real};
use sf_signal::{Signal, TimeAxis};
use tracing::{debug, info, trace};

use crate::component::{Component, ComponentKind};
use crate::error::{EvaluationError, SystemResult};
use crate::schedule::Schedule;
use crate::state::{ComponentState, SimulationState};
use crate::system::System;

/// Progress report passed to the callback after every completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProgress {
    /// Index of the step that just finished.
    pub step: usize,
    pub total_steps: usize,
    /// Axis position of that step.
    pub x: Real,
}

impl StepProgress {
    /// Fraction of the run completed, in `(0, 1]`.
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            (self.step + 1) as f64 / self.total_steps as f64
        }
    }
}

/// Answer of the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepControl {
    #[default]
    Continue,
    Cancel,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SimOutcome {
    /// Every step ran.
    Completed { outputs: Vec<Signal> },
    /// The progress callback asked to stop. Outputs hold the samples of the
    /// completed steps and zeros after them.
    Cancelled {
        completed_steps: usize,
        outputs: Vec<Signal>,
    },
}

impl SimOutcome {
    pub fn outputs(&self) -> &[Signal] {
        match self {
            SimOutcome::Completed { outputs } | SimOutcome::Cancelled { outputs, .. } => outputs,
        }
    }

    pub fn into_outputs(self) -> Vec<Signal> {
        match self {
            SimOutcome::Completed { outputs } | SimOutcome::Cancelled { outputs, .. } => outputs,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SimOutcome::Cancelled { .. })
    }
}

/// Where a system level takes its Input values from.
#[derive(Debug, Clone, Copy)]
enum Feed<'a> {
    /// The Input components' own signals (outermost level).
    Signals,
    /// Values written into a Subsystem's input ports, flattened over the
    /// nested Input channels.
    Ports(&'a [Real]),
}

enum StepsRun {
    Completed,
    Cancelled(usize),
}

impl System {
    /// Run the system to completion and return one signal per Output
    /// component, in insertion order.
    pub fn simulate(&mut self) -> SystemResult<Vec<Signal>> {
        let outcome = self.simulate_with_progress(&mut |_| StepControl::Continue)?;
        Ok(outcome.into_outputs())
    }

    /// Run the system, calling `progress` after every step.
    ///
    /// The callback is the only cancellation point. Every call starts from
    /// zeroed memory and recomputes the axis and evaluation order, so nothing
    /// carries over from an earlier run. Configuration errors surface before
    /// the first step; an evaluation error stops the run at the failing step.
    /// In every case the Output components keep the samples written so far.
    pub fn simulate_with_progress(
        &mut self,
        progress: &mut dyn FnMut(&StepProgress) -> StepControl,
    ) -> SystemResult<SimOutcome> {
        let schedule = Schedule::compile(self)?;
        let axis = self.pad_signals()?;
        let mut state = SimulationState::new(self);
        let mut outputs = self.take_output_signals();

        info!(
            components = self.components().len(),
            steps = axis.len(),
            "starting simulation"
        );
        let run = self.run_steps(&schedule, &mut state, &axis, &mut outputs, progress);
        self.restore_output_signals(&outputs);

        match run? {
            StepsRun::Completed => {
                info!(steps = axis.len(), "simulation completed");
                Ok(SimOutcome::Completed { outputs })
            }
            StepsRun::Cancelled(completed_steps) => {
                info!(completed_steps, "simulation cancelled");
                Ok(SimOutcome::Cancelled {
                    completed_steps,
                    outputs,
                })
            }
        }
    }

    fn run_steps(
        &self,
        schedule: &Schedule,
        state: &mut SimulationState,
        axis: &TimeAxis,
        outputs: &mut [Signal],
        progress: &mut dyn FnMut(&StepProgress) -> StepControl,
    ) -> Result<StepsRun, EvaluationError> {
        let total_steps = axis.len();
        for k in 0..total_steps {
            step(self, schedule, state, k, Feed::Signals)?;

            for (signal, &id) in outputs.iter_mut().zip(schedule.outputs()) {
                for (ch, &value) in state.components[id.slot()].inputs.iter().enumerate() {
                    signal.set(k, ch, value);
                }
            }
            trace!(step = k, x = axis.x_at(k), "step complete");

            let report = StepProgress {
                step: k,
                total_steps,
                x: axis.x_at(k),
            };
            if progress(&report) == StepControl::Cancel {
                debug!(step = k, "cancellation requested by progress callback");
                return Ok(StepsRun::Cancelled(k + 1));
            }
        }
        Ok(StepsRun::Completed)
    }
}

/// Advance one system level by one step.
fn step(
    system: &System,
    schedule: &Schedule,
    state: &mut SimulationState,
    k: usize,
    feed: Feed<'_>,
) -> Result<(), EvaluationError> {
    let components = system.components();

    // Inputs publish their samples.
    let mut offset = 0;
    for &id in schedule.inputs() {
        let ComponentKind::Input { signal } = &components[id.slot()].kind else {
            continue;
        };
        let ports = &mut state.components[id.slot()].outputs;
        match feed {
            Feed::Signals => ports.copy_from_slice(signal.row(k)),
            Feed::Ports(values) => {
                let width = ports.len();
                ports.copy_from_slice(&values[offset..offset + width]);
                offset += width;
            }
        }
    }

    for &id in schedule.order() {
        pull(schedule, state, id);
        let component = &components[id.slot()];
        transfer(component, schedule, &mut state.components[id.slot()], k)?;
    }

    // Delays latch the value that reached them this step.
    for &id in schedule.delays() {
        pull(schedule, state, id);
        let delay = &mut state.components[id.slot()];
        delay.memory = delay.inputs[0];
    }

    for &id in schedule.outputs() {
        pull(schedule, state, id);
    }
    Ok(())
}

/// Copy the connected source values into the input ports of `id`.
fn pull(schedule: &Schedule, state: &mut SimulationState, id: CompId) {
    for (port, source) in schedule.sources(id).iter().enumerate() {
        if let Some(source) = source {
            let value = state.components[source.component.slot()].outputs[source.port];
            state.components[id.slot()].inputs[port] = value;
        }
    }
}

fn transfer(
    component: &Component,
    schedule: &Schedule,
    state: &mut ComponentState,
    k: usize,
) -> Result<(), EvaluationError> {
    match &component.kind {
        // Driven at the step boundaries, never scheduled.
        ComponentKind::Input { .. } | ComponentKind::Output { .. } => {}
        ComponentKind::Add => state.outputs[0] = state.inputs[0] + state.inputs[1],
        ComponentKind::Split => {
            let value = state.inputs[0];
            state.outputs[0] = value;
            state.outputs[1] = value;
        }
        ComponentKind::Sum => {
            let total = state.inputs[0] + state.memory;
            state.outputs[0] = total;
            state.memory = total;
        }
        ComponentKind::Delay => state.outputs[0] = state.memory,
        ComponentKind::Gain { coefficient } => state.outputs[0] = coefficient * state.inputs[0],
        ComponentKind::Function { expression } => {
            state.outputs[0] = expression
                .eval(state.inputs[0])
                .map_err(|source| EvaluationError::new(component.id, k, source))?;
        }
        ComponentKind::Subsystem { system, .. } => {
            // Schedule::compile and SimulationState::new both build a nested
            // entry for every Subsystem, from the same system.
            let (Some(inner_schedule), Some(inner)) =
                (schedule.nested(component.id), state.nested.as_deref_mut())
            else {
                unreachable!("subsystem {} has no nested schedule or state", component.id);
            };
            step(system, inner_schedule, inner, k, Feed::Ports(&state.inputs))
                .map_err(|err| err.within(component.id))?;

            let mut offset = 0;
            for &id in inner_schedule.outputs() {
                let values = &inner.components[id.slot()].inputs;
                state.outputs[offset..offset + values.len()].copy_from_slice(values);
                offset += values.len();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Signal {
        Signal::mono(0.0, 1.0, (0..n).map(|k| k as f64).collect()).unwrap()
    }

    #[test]
    fn gain_scales_every_sample() {
        let mut system = System::new();
        let input = system.add_input(ramp(4));
        let gain = system.add_gain(-2.0);
        let output = system.add_output();
        system.add_connector((input, 0), (gain, 0)).unwrap();
        system.add_connector((gain, 0), (output, 0)).unwrap();

        let outputs = system.simulate().unwrap();
        assert_eq!(outputs[0].channel(0), vec![0.0, -2.0, -4.0, -6.0]);
    }

    #[test]
    fn add_combines_both_ports() {
        let mut system = System::new();
        let a = system.add_input(ramp(3));
        let b = system.add_input(Signal::constant(0.0, 1.0, 3, 10.0).unwrap());
        let add = system.add_add();
        let output = system.add_output();
        system.add_connector((a, 0), (add, 0)).unwrap();
        system.add_connector((b, 0), (add, 1)).unwrap();
        system.add_connector((add, 0), (output, 0)).unwrap();

        let outputs = system.simulate().unwrap();
        assert_eq!(outputs[0].channel(0), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn split_feeds_both_outputs() {
        let mut system = System::new();
        let input = system.add_input(ramp(3));
        let split = system.add_split();
        let first = system.add_output();
        let second = system.add_output();
        system.add_connector((input, 0), (split, 0)).unwrap();
        system.add_connector((split, 0), (first, 0)).unwrap();
        system.add_connector((split, 1), (second, 0)).unwrap();

        let outputs = system.simulate().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn unconnected_ports_read_zero() {
        let mut system = System::new();
        let input = system.add_input(ramp(3));
        let add = system.add_add();
        let output = system.add_output();
        system.add_connector((input, 0), (add, 0)).unwrap();
        system.add_connector((add, 0), (output, 0)).unwrap();

        let outputs = system.simulate().unwrap();
        assert_eq!(outputs[0].channel(0), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn subsystem_runs_its_nested_system_every_step() {
        let mut inner = System::new();
        let port = inner.add_input(Signal::constant(0.0, 1.0, 1, 0.0).unwrap());
        let gain = inner.add_gain(3.0);
        let inner_out = inner.add_output();
        inner.add_connector((port, 0), (gain, 0)).unwrap();
        inner.add_connector((gain, 0), (inner_out, 0)).unwrap();

        let mut system = System::new();
        let input = system.add_input(ramp(3));
        let sub = system.add_subsystem(inner);
        let output = system.add_output();
        system.add_connector((input, 0), (sub, 0)).unwrap();
        system.add_connector((sub, 0), (output, 0)).unwrap();

        let schedule = Schedule::compile(&system).unwrap();
        let state = SimulationState::new(&system);
        assert!(schedule.nested(sub).is_some());
        assert!(state.components[sub.slot()].nested.is_some());

        let outputs = system.simulate().unwrap();
        assert_eq!(outputs[0].channel(0), vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn progress_reports_every_step() {
        let mut system = System::new();
        let input = system.add_input(ramp(5));
        let output = system.add_output();
        system.add_connector((input, 0), (output, 0)).unwrap();

        let mut seen = Vec::new();
        let outcome = system
            .simulate_with_progress(&mut |p| {
                seen.push((p.step, p.total_steps));
                StepControl::Continue
            })
            .unwrap();
        assert!(!outcome.is_cancelled());
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.last(), Some(&(4, 5)));
    }

    #[test]
    fn fraction_complete_counts_finished_steps() {
        let p = StepProgress {
            step: 1,
            total_steps: 4,
            x: 1.0,
        };
        assert_eq!(p.fraction_complete(), 0.5);
    }
}
