use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Success { count: usize },
    Failed { notice: String },
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Idle
    }
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Success { .. } => "success",
            RunState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Submit,
    Complete(usize),
    Fail(String),
}

impl RunEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RunEvent::Submit => "submit",
            RunEvent::Complete(_) => "complete",
            RunEvent::Fail(_) => "fail",
        }
    }
}
