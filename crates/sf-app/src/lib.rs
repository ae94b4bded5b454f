//! Shared application service layer for signalflow.
//!
//! This crate provides one interface for command line and future graphical
//! front-ends: loading and inspecting projects, running systems (one at a
//! time or as a parallel batch) and exporting output signals.

pub mod error;
pub mod export;
pub mod progress;
pub mod project_service;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use export::{write_csv, write_outputs_csv};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{
    SystemSummary, get_system, list_systems, load_project, save_project, validate_project,
};
pub use run_service::{
    RunOptions, RunOutcome, RunRequest, RunResponse, RunTimingSummary, run_system,
    run_system_def, run_system_with_progress, run_systems_parallel,
};
