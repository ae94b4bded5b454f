use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sf_app::{
    AppResult, RunOptions, RunOutcome, RunProgressEvent, RunRequest, RunResponse, RunStage,
    project_service, run_service, write_outputs_csv,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "SignalFlow CLI - discrete-time block diagram simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax, structure and runnability
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// List systems in a project
    Systems {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Run one system
    Run {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// System ID to simulate
        system_id: String,
        /// Directory for the output CSV files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Stop after this many steps (at least 1)
        #[arg(long)]
        max_steps: Option<NonZeroUsize>,
    },
    /// Run every system of a project in parallel
    RunAll {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Directory for the output CSV files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Systems { project_path } => cmd_systems(&project_path),
        Commands::Run {
            project_path,
            system_id,
            out,
            max_steps,
        } => cmd_run(&project_path, &system_id, &out, max_steps),
        Commands::RunAll { project_path, out } => cmd_run_all(&project_path, &out),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_systems(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let systems = project_service::list_systems(&project);

    if systems.is_empty() {
        println!("No systems found in project");
    } else {
        println!("Systems in project:");
        for sys in systems {
            println!(
                "  {} - {} ({} components, {} connectors, {} inputs, {} outputs, {} subsystems)",
                sys.id,
                sys.name,
                sys.component_count,
                sys.connector_count,
                sys.input_count,
                sys.output_count,
                sys.subsystem_count
            );
        }
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    system_id: &str,
    out: &Path,
    max_steps: Option<NonZeroUsize>,
) -> AppResult<()> {
    println!("Running system: {}", system_id);

    let request = RunRequest {
        project_path,
        system_id,
        options: RunOptions { max_steps },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::run_system_with_progress(
        &request,
        Some(&mut |event| {
            let fraction = event
                .step
                .as_ref()
                .map(|s| s.fraction_complete())
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    report(&response);
    write_outputs(out, &response)
}

fn cmd_run_all(project_path: &Path, out: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    println!(
        "Running {} system(s) of '{}' in parallel",
        project.systems.len(),
        project.name
    );

    let results = run_service::run_systems_parallel(&project, &[], &RunOptions::default());
    let mut failures = 0;
    for (system_id, result) in results {
        match result {
            Ok(response) => {
                report(&response);
                write_outputs(out, &response)?;
            }
            Err(err) => {
                failures += 1;
                warn!(system = %system_id, error = %err, "run failed");
                println!("✗ {}: {}", system_id, err);
            }
        }
    }

    if failures > 0 {
        println!("{} system(s) failed", failures);
    }
    Ok(())
}

fn report(response: &RunResponse) {
    match response.outcome {
        RunOutcome::Completed { steps } => {
            println!("✓ {} completed ({} steps)", response.system_id, steps)
        }
        RunOutcome::Cancelled { completed_steps } => println!(
            "■ {} stopped after {} steps",
            response.system_id, completed_steps
        ),
    }
    let t = &response.timing;
    println!(
        "  Timing: load={:.3}s build={:.3}s simulate={:.3}s total={:.3}s",
        t.load_time_s, t.build_time_s, t.simulate_time_s, t.total_time_s
    );
}

fn write_outputs(out: &Path, response: &RunResponse) -> AppResult<()> {
    let files = write_outputs_csv(out, &response.system_id, &response.outputs)?;
    for file in &files {
        info!(path = %file.display(), "wrote output");
        println!("  Output: {}", file.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.step) {
        (RunStage::Simulating, Some(step)) => {
            let fraction = step.fraction_complete();
            let width = 28usize;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  step={}/{}  x={:.4}  elapsed={:.1}s",
                bar,
                fraction * 100.0,
                step.step + 1,
                step.total_steps,
                step.x,
                event.elapsed_wall_s
            );
        }
        _ => {
            print!(
                "\r{}  elapsed={:.1}s{}",
                event.stage.label(),
                event.elapsed_wall_s,
                event
                    .message
                    .as_deref()
                    .map(|m| format!("  {m}"))
                    .unwrap_or_default()
            );
        }
    }
    let _ = io::stdout().flush();
}
