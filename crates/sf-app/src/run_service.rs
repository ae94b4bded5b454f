//! Run execution service.

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use sf_project::schema::{Project, SystemDef};
use sf_signal::Signal;
use sf_system::{SimOutcome, StepControl};
use tracing::info;

use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service;

/// Options for running simulations.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many steps; the run then reports
    /// [`RunOutcome::Cancelled`] with the outputs written so far. At least
    /// one step always runs.
    pub max_steps: Option<NonZeroUsize>,
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub system_id: &'a str,
    pub options: RunOptions,
}

/// How the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { steps: usize },
    Cancelled { completed_steps: usize },
}

/// Wall-clock timing of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub build_time_s: f64,
    pub simulate_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub system_id: String,
    pub outcome: RunOutcome,
    pub outputs: Vec<Signal>,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    system_id: &str,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            system_id,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Load the project and run one of its systems.
pub fn run_system(request: &RunRequest) -> AppResult<RunResponse> {
    run_system_with_progress(request, None)
}

/// Load the project and run one of its systems, streaming progress events.
pub fn run_system_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        request.system_id,
        RunStage::LoadingProject,
        started,
        Some(request.project_path.display().to_string()),
    );
    let project = project_service::load_project(request.project_path)?;
    let def = project_service::get_system(&project, request.system_id)?;
    let load_time_s = started.elapsed().as_secs_f64();

    let mut response = run_system_def(def, &request.options, progress_cb)?;
    response.timing.load_time_s = load_time_s;
    response.timing.total_time_s = started.elapsed().as_secs_f64();
    Ok(response)
}

/// Build and run an already loaded system definition.
pub fn run_system_def(
    def: &SystemDef,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit_progress(&mut progress_cb, &def.id, RunStage::Building, started, None);
    let mut system = sf_project::build_system(def)?;
    let build_time_s = started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, &def.id, RunStage::Simulating, started, None);
    let sim_started = Instant::now();
    let max_steps = options.max_steps;
    let outcome = system.simulate_with_progress(&mut |step| {
        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(RunProgressEvent {
                step: Some(*step),
                ..RunProgressEvent::stage(
                    def.id.as_str(),
                    RunStage::Simulating,
                    started.elapsed().as_secs_f64(),
                    None,
                )
            });
        }
        match max_steps {
            Some(max) if step.step + 1 >= max.get() && step.step + 1 < step.total_steps => {
                StepControl::Cancel
            }
            _ => StepControl::Continue,
        }
    })?;
    let simulate_time_s = sim_started.elapsed().as_secs_f64();

    let (outcome, outputs, stage) = match outcome {
        SimOutcome::Completed { outputs } => {
            let steps = system.axis().map_or(0, |axis| axis.len());
            (RunOutcome::Completed { steps }, outputs, RunStage::Completed)
        }
        SimOutcome::Cancelled {
            completed_steps,
            outputs,
        } => (
            RunOutcome::Cancelled { completed_steps },
            outputs,
            RunStage::Cancelled,
        ),
    };
    emit_progress(&mut progress_cb, &def.id, stage, started, None);
    info!(
        system = %def.id,
        ?outcome,
        simulate_time_s,
        "run finished"
    );

    Ok(RunResponse {
        system_id: def.id.clone(),
        outcome,
        outputs,
        timing: RunTimingSummary {
            load_time_s: 0.0,
            build_time_s,
            simulate_time_s,
            total_time_s: started.elapsed().as_secs_f64(),
        },
    })
}

/// Run several systems of a project in parallel, one worker per system.
///
/// Each worker builds its own [`sf_system::System`], so no state is shared.
/// Results come back in the order of `system_ids`; an empty slice runs every
/// system of the project.
pub fn run_systems_parallel(
    project: &Project,
    system_ids: &[String],
    options: &RunOptions,
) -> Vec<(String, AppResult<RunResponse>)> {
    let ids: Vec<&str> = if system_ids.is_empty() {
        project.systems.iter().map(|s| s.id.as_str()).collect()
    } else {
        system_ids.iter().map(String::as_str).collect()
    };

    ids.par_iter()
        .map(|&id| {
            let result = project_service::get_system(project, id)
                .and_then(|def| run_system_def(def, options, None));
            (id.to_string(), result)
        })
        .collect()
}
