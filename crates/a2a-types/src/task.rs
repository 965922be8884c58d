use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::kind::TaskKind;
use crate::message::Message;

/// Task lifecycle state
/// Terminal states: Completed, Failed, Canceled, Rejected
/// Interrupt states: InputRequired, AuthRequired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
    AuthRequired,
    /// State could not be determined; never entered by a normal transition
    Unknown,
}

/// Rejected state change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal task state transition {from} -> {to}")]
pub struct TransitionError {
    pub from: TaskState,
    pub to: TaskState,
}

impl TaskState {
    pub const ALL: [TaskState; 9] = [
        TaskState::Submitted,
        TaskState::Working,
        TaskState::InputRequired,
        TaskState::Completed,
        TaskState::Canceled,
        TaskState::Failed,
        TaskState::Rejected,
        TaskState::AuthRequired,
        TaskState::Unknown,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, TaskState::InputRequired | TaskState::AuthRequired)
    }

    /// Whether a stored task in `self` may move to `next`.
    ///
    /// `submitted` is only ever an initial state and `unknown` is never a
    /// target. Every non-terminal state may be canceled; `auth-required` and
    /// `unknown` allow nothing else. Re-publishing `working` while working is
    /// allowed so executors can refresh the status message.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        if self.is_terminal() || matches!(next, Submitted | Unknown) {
            return false;
        }
        match self {
            Submitted => matches!(next, Working | Rejected | Canceled),
            Working => matches!(
                next,
                Working | InputRequired | Completed | Canceled | Failed | Rejected
            ),
            InputRequired => matches!(next, Working | Canceled),
            AuthRequired | Unknown => next == Canceled,
            Completed | Canceled | Failed | Rejected => false,
        }
    }

    pub fn check_transition(&self, next: TaskState) -> Result<(), TransitionError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::AuthRequired => "auth-required",
            TaskState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// RFC 3339 timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: None,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub kind: TaskKind,
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Task {
    pub fn new(id: impl Into<String>, context_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            kind: TaskKind,
            id: id.into(),
            context_id: context_id.into(),
            status,
            artifacts: None,
            history: None,
            metadata: None,
        }
    }

    /// Keeps only the newest `length` history entries. `0` drops history.
    pub fn truncate_history(&mut self, length: usize) {
        if let Some(history) = self.history.as_mut() {
            if history.len() > length {
                history.drain(..history.len() - length);
            }
        }
    }
}
