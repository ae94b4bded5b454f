use std::num::NonZeroUsize;
use std::path::PathBuf;

use sf_app::{
    AppError, RunOptions, RunOutcome, RunProgressEvent, RunRequest, RunStage, get_system,
    list_systems, load_project, run_system, run_system_with_progress, run_systems_parallel,
    validate_project, write_outputs_csv,
};

const PROJECT: &str = r#"
version: 1
name: Smoke
systems:
  - id: ramp
    name: Running total
    components:
      - id: in
        kind:
          type: Input
          signal:
            x_start: 0.0
            x_end: 5.0
            delta_x: 1.0
            channels: 1
            samples: [[1.0], [1.0], [1.0], [1.0], [1.0], [1.0]]
      - id: sum
        kind: { type: Sum }
      - id: out
        kind: { type: Output }
    connectors:
      - { from: in, to: sum }
      - { from: sum, to: out }
  - id: scaled
    name: Scaled
    components:
      - id: in
        kind:
          type: Input
          signal:
            x_start: 0.0
            x_end: 2.0
            delta_x: 1.0
            channels: 1
            samples: [[1.0], [2.0], [3.0]]
      - id: gain
        kind: { type: Gain, coefficient: -3.0 }
      - id: out
        kind: { type: Output }
    connectors:
      - { from: in, to: gain }
      - { from: gain, to: out }
"#;

const LOOP: &str = r#"
version: 1
name: Broken
systems:
  - id: loop
    name: Loop
    components:
      - id: a
        kind: { type: Gain, coefficient: 1.0 }
      - id: b
        kind: { type: Gain, coefficient: 1.0 }
    connectors:
      - { from: a, to: b }
      - { from: b, to: a }
"#;

const MIXED_RATES: &str = r#"
version: 1
name: Mixed
systems:
  - id: mixed
    name: Mixed rates
    components:
      - id: slow
        kind:
          type: Input
          signal: { x_start: 0.0, x_end: 2.0, delta_x: 1.0, channels: 1, samples: [[1.0], [1.0], [1.0]] }
      - id: fast
        kind:
          type: Input
          signal: { x_start: 0.0, x_end: 1.0, delta_x: 0.5, channels: 1, samples: [[1.0], [1.0], [1.0]] }
      - id: add
        kind: { type: Add }
      - id: out
        kind: { type: Output }
    connectors:
      - { from: slow, to: add }
      - { from: fast, to: add, to_port: 1 }
      - { from: add, to: out }
"#;

fn write_project(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_list_and_validate() {
    let path = write_project("sf_app_smoke_list.yaml", PROJECT);
    let project = load_project(&path).unwrap();

    let summaries = list_systems(&project);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, "ramp");
    assert_eq!(summaries[0].input_count, 1);
    assert_eq!(summaries[0].output_count, 1);
    assert_eq!(summaries[1].connector_count, 2);

    validate_project(&project).unwrap();
    assert!(get_system(&project, "scaled").is_ok());
    assert!(matches!(
        get_system(&project, "nope"),
        Err(AppError::SystemNotFound(_))
    ));
}

#[test]
fn unbroken_loop_fails_validation() {
    let path = write_project("sf_app_smoke_loop.yaml", LOOP);
    let project = load_project(&path).unwrap();
    assert!(matches!(
        validate_project(&project),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn mixed_sampling_fails_validation() {
    let path = write_project("sf_app_smoke_mixed.yaml", MIXED_RATES);
    let project = load_project(&path).unwrap();
    let Err(AppError::Validation(message)) = validate_project(&project) else {
        panic!("mixed sampling intervals passed validation");
    };
    assert!(message.contains("system 'mixed'"), "{message}");
    assert!(message.contains("sampled every 0.5"), "{message}");
}

#[test]
fn run_reports_stages_in_order() {
    let path = write_project("sf_app_smoke_run.yaml", PROJECT);
    let request = RunRequest {
        project_path: &path,
        system_id: "ramp",
        options: RunOptions::default(),
    };

    let mut stages = Vec::new();
    let mut steps = 0;
    let mut cb = |event: RunProgressEvent| {
        if event.step.is_some() {
            steps += 1;
        } else {
            stages.push(event.stage);
        }
    };
    let response = run_system_with_progress(&request, Some(&mut cb)).unwrap();

    assert_eq!(response.outcome, RunOutcome::Completed { steps: 6 });
    assert_eq!(
        response.outputs[0].channel(0),
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
    );
    assert_eq!(steps, 6);
    assert_eq!(
        stages,
        vec![
            RunStage::LoadingProject,
            RunStage::Building,
            RunStage::Simulating,
            RunStage::Completed
        ]
    );
}

#[test]
fn max_steps_cancels_with_partial_outputs() {
    let path = write_project("sf_app_smoke_max.yaml", PROJECT);
    let response = run_system(&RunRequest {
        project_path: &path,
        system_id: "ramp",
        options: RunOptions {
            max_steps: NonZeroUsize::new(2),
        },
    })
    .unwrap();

    assert_eq!(
        response.outcome,
        RunOutcome::Cancelled { completed_steps: 2 }
    );
    assert_eq!(
        response.outputs[0].channel(0),
        vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn max_steps_of_one_runs_exactly_one_step() {
    let path = write_project("sf_app_smoke_max_one.yaml", PROJECT);
    let response = run_system(&RunRequest {
        project_path: &path,
        system_id: "ramp",
        options: RunOptions {
            max_steps: NonZeroUsize::new(1),
        },
    })
    .unwrap();
    assert_eq!(
        response.outcome,
        RunOutcome::Cancelled { completed_steps: 1 }
    );
}

#[test]
fn parallel_batch_runs_every_system() {
    let path = write_project("sf_app_smoke_batch.yaml", PROJECT);
    let project = load_project(&path).unwrap();

    let results = run_systems_parallel(&project, &[], &RunOptions::default());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "ramp");
    let scaled = results[1].1.as_ref().unwrap();
    assert_eq!(scaled.outputs[0].channel(0), vec![-3.0, -6.0, -9.0]);

    let missing = run_systems_parallel(&project, &["ghost".to_string()], &RunOptions::default());
    assert!(matches!(missing[0].1, Err(AppError::SystemNotFound(_))));
}

#[test]
fn outputs_are_written_as_csv() {
    let path = write_project("sf_app_smoke_csv.yaml", PROJECT);
    let response = run_system(&RunRequest {
        project_path: &path,
        system_id: "scaled",
        options: RunOptions::default(),
    })
    .unwrap();

    let dir = std::env::temp_dir().join("sf_app_smoke_csv_out");
    let files = write_outputs_csv(&dir, &response.system_id, &response.outputs).unwrap();
    assert_eq!(files.len(), 1);
    let text = std::fs::read_to_string(&files[0]).unwrap();
    assert_eq!(text, "x,ch0\n0,-3\n1,-6\n2,-9\n");
}
