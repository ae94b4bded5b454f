//! Project loading, saving, validation, and introspection.

use std::path::Path;

use sf_project::schema::{ComponentKindDef, Project, SystemDef};

use crate::error::{AppError, AppResult};

/// Summary of a system for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSummary {
    pub id: String,
    pub name: String,
    pub component_count: usize,
    pub connector_count: usize,
    pub input_count: usize,
    pub output_count: usize,
    pub subsystem_count: usize,
}

/// Load a project file (`.json` as JSON, anything else as YAML).
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(sf_project::load_project_file(path)?)
}

/// Save a project file, choosing the format by extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => sf_project::save_json(path, project)?,
        _ => sf_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Validate a project down to runnability: structure, then every system is
/// built and its topology checked.
pub fn validate_project(project: &Project) -> AppResult<()> {
    sf_project::validate_project(project).map_err(|e| AppError::Validation(e.to_string()))?;

    for def in &project.systems {
        let system = sf_project::build_system(def)?;
        system
            .validate()
            .map_err(|e| AppError::Validation(format!("system '{}': {}", def.id, e)))?;
    }

    Ok(())
}

/// List all systems in the project with summaries.
pub fn list_systems(project: &Project) -> Vec<SystemSummary> {
    project
        .systems
        .iter()
        .map(|system| {
            let count = |pred: fn(&ComponentKindDef) -> bool| {
                system.components.iter().filter(|c| pred(&c.kind)).count()
            };
            SystemSummary {
                id: system.id.clone(),
                name: system.name.clone(),
                component_count: system.components.len(),
                connector_count: system.connectors.len(),
                input_count: count(|k| matches!(k, ComponentKindDef::Input { .. })),
                output_count: count(|k| matches!(k, ComponentKindDef::Output { .. })),
                subsystem_count: count(|k| matches!(k, ComponentKindDef::Subsystem { .. })),
            }
        })
        .collect()
}

/// Get a specific system by ID.
pub fn get_system<'a>(project: &'a Project, system_id: &str) -> AppResult<&'a SystemDef> {
    project
        .systems
        .iter()
        .find(|s| s.id == system_id)
        .ok_or_else(|| AppError::SystemNotFound(system_id.to_string()))
}
