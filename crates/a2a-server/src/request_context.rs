use a2a_types::{Message, Task, TaskState, TaskStatus, TaskStatusUpdateEvent};

/// RFC 3339 timestamp for status updates.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Everything an [`AgentExecutor`](crate::AgentExecutor) needs for one invocation.
///
/// Built by the handler per inbound message: `task_id` and `context_id` are
/// already resolved and `message` carries them. `history` holds the
/// messages stored for the task before this one.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub task_id: String,
    pub context_id: String,
    /// Inbound message; `None` when the context was built for a cancel.
    pub message: Option<Message>,
    pub history: Vec<Message>,
}

impl RequestContext {
    pub fn new(task_id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            context_id: context_id.into(),
            message: None,
            history: Vec::new(),
        }
    }

    /// Context for an existing task, without an inbound message.
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            context_id: task.context_id.clone(),
            message: None,
            history: task.history.clone().unwrap_or_default(),
        }
    }

    /// Attach the inbound message, stamping it with this context's ids.
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message.with_task(&self.task_id, &self.context_id));
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Text parts of the inbound message joined with `separator`.
    pub fn user_text(&self, separator: &str) -> String {
        self.message
            .as_ref()
            .map(|m| m.text(separator))
            .unwrap_or_default()
    }

    /// An agent-authored message bound to this task.
    pub fn agent_message(&self, text: impl Into<String>) -> Message {
        Message::agent_text(uuid::Uuid::new_v4().to_string(), text)
            .with_task(&self.task_id, &self.context_id)
    }

    /// Task snapshot in `state` with an agent status message.
    ///
    /// History is the prior history followed by the inbound message.
    pub fn task(&self, state: TaskState, text: impl Into<String>) -> Task {
        self.task_with_message(state, self.agent_message(text))
    }

    pub fn task_with_message(&self, state: TaskState, message: Message) -> Task {
        let mut history = self.history.clone();
        if let Some(inbound) = &self.message {
            if !history.iter().any(|m| m.message_id == inbound.message_id) {
                history.push(inbound.clone());
            }
        }

        let mut status = TaskStatus::new(state).with_message(message);
        status.timestamp = Some(timestamp());

        let mut task = Task::new(&self.task_id, &self.context_id, status);
        task.history = Some(history);
        task
    }

    /// Status update event for this task; `final` is set for terminal states.
    pub fn status_update(&self, state: TaskState, text: impl Into<String>) -> TaskStatusUpdateEvent {
        let mut status = TaskStatus::new(state).with_message(self.agent_message(text));
        status.timestamp = Some(timestamp());
        TaskStatusUpdateEvent {
            task_id: self.task_id.clone(),
            context_id: self.context_id.clone(),
            status,
            is_final: state.is_terminal(),
            metadata: None,
        }
    }
}
