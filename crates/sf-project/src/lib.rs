//! sf-project: canonical project file format, validation and conversion to
//! runnable systems.

pub mod convert;
pub mod migrate;
pub mod schema;
pub mod validate;

pub use convert::{build_system, signal_def, system_def};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_project};

use std::path::Path;

use tracing::debug;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Cannot build system '{system}': {source}")]
    Build {
        system: String,
        source: sf_system::SystemError,
    },

    #[error("Invalid signal in system '{system}': {source}")]
    Signal {
        system: String,
        source: sf_signal::SignalError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse, migrate and validate a YAML project.
pub fn from_yaml_str(content: &str) -> ProjectResult<Project> {
    let project: Project = serde_yaml::from_str(content)?;
    let project = migrate_to_latest(project)?;
    validate_project(&project)?;
    Ok(project)
}

/// Validate and serialize a project to YAML.
pub fn to_yaml_string(project: &Project) -> ProjectResult<String> {
    validate_project(project)?;
    Ok(serde_yaml::to_string(project)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    debug!(path = %path.display(), "loading YAML project");
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    let content = to_yaml_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    debug!(path = %path.display(), "loading JSON project");
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    let project = migrate_to_latest(project)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a project by file extension: `.json` as JSON, anything else as YAML.
pub fn load_project_file(path: &Path) -> ProjectResult<Project> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
