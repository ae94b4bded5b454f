use sf_system::StepProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    Building,
    Simulating,
    Completed,
    Cancelled,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingProject => "loading",
            RunStage::Building => "building",
            RunStage::Simulating => "simulating",
            RunStage::Completed => "completed",
            RunStage::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub system_id: String,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub step: Option<StepProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        system_id: impl Into<String>,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            stage,
            elapsed_wall_s,
            message,
            step: None,
        }
    }
}
