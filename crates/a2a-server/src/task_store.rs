use std::collections::HashMap;

use a2a_types::{Artifact, Event, Message, Task, TaskState, TaskStatus, TransitionError};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::request_context::timestamp;

#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("{0}")]
    InvalidTransition(#[from] TransitionError),

    #[error("task {task_id}: {field} is immutable ({current} != {incoming})")]
    ImmutableField {
        task_id: String,
        field: &'static str,
        current: String,
        incoming: String,
    },
}

/// Registry of task snapshots.
///
/// `save` is the only mutation; implementations apply each event as one
/// atomic read-validate-merge.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Apply `event` and return the resulting snapshot, or `None` for a
    /// message that belongs to no stored task.
    async fn save(&self, event: &Event) -> Result<Option<Task>, TaskStoreError>;
    async fn get(&self, task_id: &str) -> Result<Option<Task>, TaskStoreError>;
}

/// In-memory task store backed by `RwLock<HashMap>`.
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, event: &Event) -> Result<Option<Task>, TaskStoreError> {
        let mut tasks = self.tasks.write().await;

        match event {
            Event::Task(incoming) => match tasks.get_mut(&incoming.id) {
                Some(existing) => {
                    // Validate on a copy so a rejected event leaves the store unchanged
                    let mut merged = existing.clone();
                    merge_task(&mut merged, incoming)?;
                    *existing = merged.clone();
                    Ok(Some(merged))
                }
                None => {
                    let mut task = incoming.clone();
                    task.status = stamped(task.status);
                    if let Some(history) = task.history.take() {
                        append_history(&mut task, history);
                    }
                    tasks.insert(task.id.clone(), task.clone());
                    Ok(Some(task))
                }
            },
            Event::TaskStatusUpdate(update) => {
                let task = tasks
                    .get_mut(&update.task_id)
                    .ok_or_else(|| TaskStoreError::TaskNotFound(update.task_id.clone()))?;
                check_context(task, &update.context_id)?;
                check_state(task, update.status.state)?;
                task.status = stamped(update.status.clone());
                Ok(Some(task.clone()))
            }
            Event::TaskArtifactUpdate(update) => {
                let task = tasks
                    .get_mut(&update.task_id)
                    .ok_or_else(|| TaskStoreError::TaskNotFound(update.task_id.clone()))?;
                check_context(task, &update.context_id)?;
                upsert_artifact(task, &update.artifact, update.append);
                Ok(Some(task.clone()))
            }
            Event::Message(message) => {
                let Some(task) = message
                    .task_id
                    .as_deref()
                    .and_then(|id| tasks.get_mut(id))
                else {
                    return Ok(None);
                };
                append_history(task, [message.clone()]);
                Ok(Some(task.clone()))
            }
        }
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, TaskStoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(task_id).cloned())
    }
}

fn merge_task(existing: &mut Task, incoming: &Task) -> Result<(), TaskStoreError> {
    check_context(existing, &incoming.context_id)?;
    check_state(existing, incoming.status.state)?;

    existing.status = stamped(incoming.status.clone());
    if let Some(history) = &incoming.history {
        append_history(existing, history.iter().cloned());
    }
    for artifact in incoming.artifacts.iter().flatten() {
        upsert_artifact(existing, artifact, false);
    }
    if incoming.metadata.is_some() {
        existing.metadata = incoming.metadata.clone();
    }
    Ok(())
}

fn check_context(task: &Task, context_id: &str) -> Result<(), TaskStoreError> {
    if task.context_id == context_id {
        return Ok(());
    }
    Err(TaskStoreError::ImmutableField {
        task_id: task.id.clone(),
        field: "contextId",
        current: task.context_id.clone(),
        incoming: context_id.to_string(),
    })
}

/// Re-publishing the current non-terminal state is accepted as a refresh.
fn check_state(task: &Task, next: TaskState) -> Result<(), TaskStoreError> {
    let current = task.status.state;
    if current == next && !current.is_terminal() {
        return Ok(());
    }
    current.check_transition(next)?;
    Ok(())
}

fn stamped(mut status: TaskStatus) -> TaskStatus {
    if status.timestamp.is_none() {
        status.timestamp = Some(timestamp());
    }
    status
}

/// History is append-only and keyed by `message_id`.
fn append_history(task: &mut Task, messages: impl IntoIterator<Item = Message>) {
    let history = task.history.get_or_insert_with(Vec::new);
    for message in messages {
        if !history.iter().any(|m| m.message_id == message.message_id) {
            history.push(message);
        }
    }
}

fn upsert_artifact(task: &mut Task, artifact: &Artifact, append: bool) {
    let artifacts = task.artifacts.get_or_insert_with(Vec::new);
    match artifacts
        .iter_mut()
        .find(|a| a.artifact_id == artifact.artifact_id)
    {
        Some(existing) if append => existing.parts.extend(artifact.parts.iter().cloned()),
        Some(existing) => *existing = artifact.clone(),
        None => artifacts.push(artifact.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::{Part, TaskArtifactUpdateEvent, TaskStatusUpdateEvent};
    use std::sync::Arc;

    fn make_task(id: &str, ctx: &str, state: TaskState) -> Task {
        Task::new(id, ctx, TaskStatus::new(state))
    }

    fn status_update(id: &str, ctx: &str, state: TaskState) -> Event {
        Event::TaskStatusUpdate(TaskStatusUpdateEvent {
            task_id: id.into(),
            context_id: ctx.into(),
            status: TaskStatus::new(state),
            is_final: state.is_terminal(),
            metadata: None,
        })
    }

    fn artifact_update(id: &str, artifact_id: &str, text: &str, append: bool) -> Event {
        Event::TaskArtifactUpdate(TaskArtifactUpdateEvent {
            task_id: id.into(),
            context_id: "ctx-1".into(),
            artifact: Artifact::new(artifact_id, vec![Part::text(text)]),
            append,
            last_chunk: false,
            metadata: None,
        })
    }

    async fn store_with(task: Task) -> InMemoryTaskStore {
        let store = InMemoryTaskStore::new();
        store.save(&Event::Task(task)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_and_get_task() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Submitted)).await;

        let task = store.get("t-1").await.unwrap().unwrap();
        assert_eq!(task.id, "t-1");
        assert_eq!(task.status.state, TaskState::Submitted);
        assert!(task.status.timestamp.is_some(), "store stamps missing timestamps");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_update_replaces_status() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Submitted)).await;

        let task = store
            .save(&status_update("t-1", "ctx-1", TaskState::Working))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.status.state, TaskState::Working);
        assert_eq!(
            store.get("t-1").await.unwrap().unwrap().status.state,
            TaskState::Working
        );
    }

    #[tokio::test]
    async fn test_status_update_nonexistent_task() {
        let store = InMemoryTaskStore::new();
        let result = store
            .save(&status_update("nope", "ctx-1", TaskState::Working))
            .await;
        assert!(matches!(result, Err(TaskStoreError::TaskNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_illegal_transition_leaves_store_unchanged() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Submitted)).await;

        // submitted -> completed skips working
        let result = store
            .save(&status_update("t-1", "ctx-1", TaskState::Completed))
            .await;
        match result {
            Err(TaskStoreError::InvalidTransition(e)) => {
                assert_eq!(e.from, TaskState::Submitted);
                assert_eq!(e.to, TaskState::Completed);
            }
            other => panic!("Expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(
            store.get("t-1").await.unwrap().unwrap().status.state,
            TaskState::Submitted
        );
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Working)).await;
        store
            .save(&status_update("t-1", "ctx-1", TaskState::Completed))
            .await
            .unwrap();

        for next in TaskState::ALL {
            let result = store.save(&status_update("t-1", "ctx-1", next)).await;
            assert!(
                matches!(result, Err(TaskStoreError::InvalidTransition(_))),
                "completed -> {next} must be rejected"
            );
        }

        // A full Task snapshot is validated the same way
        let revived = make_task("t-1", "ctx-1", TaskState::Working);
        assert!(store.save(&Event::Task(revived)).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_task_only_accepts_cancel() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Unknown)).await;

        for next in [TaskState::Completed, TaskState::Working, TaskState::AuthRequired] {
            let result = store.save(&status_update("t-1", "ctx-1", next)).await;
            assert!(
                matches!(result, Err(TaskStoreError::InvalidTransition(_))),
                "unknown -> {next} must be rejected"
            );
        }
        store
            .save(&status_update("t-1", "ctx-1", TaskState::Canceled))
            .await
            .unwrap();
        assert_eq!(
            store.get("t-1").await.unwrap().unwrap().status.state,
            TaskState::Canceled
        );
    }

    #[tokio::test]
    async fn test_every_transition_matches_state_machine() {
        for from in TaskState::ALL {
            for to in TaskState::ALL {
                let store = store_with(make_task("t-1", "ctx-1", from)).await;
                let result = store.save(&status_update("t-1", "ctx-1", to)).await;
                let refresh = from == to && !from.is_terminal();
                assert_eq!(
                    result.is_ok(),
                    refresh || from.can_transition_to(to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_context_id_is_immutable() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Working)).await;

        let moved = make_task("t-1", "ctx-other", TaskState::Completed);
        let result = store.save(&Event::Task(moved)).await;
        assert!(matches!(
            result,
            Err(TaskStoreError::ImmutableField { field: "contextId", .. })
        ));

        let result = store
            .save(&status_update("t-1", "ctx-other", TaskState::Completed))
            .await;
        assert!(result.is_err());
        assert_eq!(
            store.get("t-1").await.unwrap().unwrap().context_id,
            "ctx-1"
        );
    }

    #[tokio::test]
    async fn test_task_event_merges_into_existing() {
        let mut first = make_task("t-1", "ctx-1", TaskState::Working);
        first.history = Some(vec![Message::user_text("m-1", "hello")]);
        first.artifacts = Some(vec![Artifact::new("a-1", vec![Part::text("draft")])]);
        let store = store_with(first).await;

        let mut second = make_task("t-1", "ctx-1", TaskState::Completed);
        second.history = Some(vec![
            Message::user_text("m-1", "hello"),
            Message::agent_text("m-2", "done"),
        ]);
        second.artifacts = Some(vec![Artifact::new("a-2", vec![Part::text("final")])]);
        second.metadata = Some(serde_json::json!({"k": "v"}));

        let merged = store.save(&Event::Task(second)).await.unwrap().unwrap();
        assert_eq!(merged.status.state, TaskState::Completed);
        let history = merged.history.unwrap();
        assert_eq!(history.len(), 2, "history is deduplicated by messageId");
        assert_eq!(history[1].message_id, "m-2");
        assert_eq!(merged.artifacts.unwrap().len(), 2);
        assert_eq!(merged.metadata.unwrap()["k"], "v");
    }

    #[tokio::test]
    async fn test_new_task_history_deduplicated() {
        let mut task = make_task("t-1", "ctx-1", TaskState::Working);
        task.history = Some(vec![
            Message::user_text("m-1", "a"),
            Message::user_text("m-1", "a"),
        ]);
        let store = store_with(task).await;
        let stored = store.get("t-1").await.unwrap().unwrap();
        assert_eq!(stored.history.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_message_event_appends_history() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Working)).await;

        let reply = Message::agent_text("m-9", "hi").with_task("t-1", "ctx-1");
        let task = store
            .save(&Event::Message(reply.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.history.as_ref().unwrap()[0], reply);

        // Same message again is a no-op
        let task = store.save(&Event::Message(reply)).await.unwrap().unwrap();
        assert_eq!(task.history.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_message_without_stored_task_is_ignored() {
        let store = InMemoryTaskStore::new();
        let loose = Message::agent_text("m-1", "hi");
        assert!(store.save(&Event::Message(loose)).await.unwrap().is_none());

        let orphan = Message::agent_text("m-2", "hi").with_task("ghost", "ctx-1");
        assert!(store.save(&Event::Message(orphan)).await.unwrap().is_none());
        assert!(store.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_artifact_append_and_replace() {
        let store = store_with(make_task("t-1", "ctx-1", TaskState::Working)).await;

        store
            .save(&artifact_update("t-1", "a-1", "one", false))
            .await
            .unwrap();
        let task = store
            .save(&artifact_update("t-1", "a-1", "two", true))
            .await
            .unwrap()
            .unwrap();
        let artifacts = task.artifacts.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].parts.len(), 2);

        let task = store
            .save(&artifact_update("t-1", "a-1", "three", false))
            .await
            .unwrap()
            .unwrap();
        let artifacts = task.artifacts.unwrap();
        assert_eq!(artifacts[0].parts.len(), 1);
        assert_eq!(artifacts[0].parts[0].as_text(), Some("three"));

        // Appending to an unknown artifact id creates it
        let task = store
            .save(&artifact_update("t-1", "a-2", "new", true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.artifacts.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_artifact_update_nonexistent_task() {
        let store = InMemoryTaskStore::new();
        let result = store.save(&artifact_update("nope", "a-1", "x", false)).await;
        assert!(matches!(result, Err(TaskStoreError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_status_update_preserves_artifacts_and_history() {
        let mut task = make_task("t-1", "ctx-1", TaskState::Working);
        task.history = Some(vec![Message::user_text("m-1", "hello")]);
        task.artifacts = Some(vec![Artifact::new("a-1", vec![Part::text("x")])]);
        let store = store_with(task).await;

        let task = store
            .save(&status_update("t-1", "ctx-1", TaskState::InputRequired))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.history.unwrap().len(), 1);
        assert_eq!(task.artifacts.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_saves_are_atomic() {
        let store = Arc::new(store_with(make_task("t-1", "ctx-1", TaskState::Working)).await);

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let message = Message::agent_text(format!("m-{i}"), "x").with_task("t-1", "ctx-1");
                store.save(&Event::Message(message)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let task = store.get("t-1").await.unwrap().unwrap();
        assert_eq!(task.history.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_concurrent_terminal_updates_only_one_wins() {
        let store = Arc::new(store_with(make_task("t-1", "ctx-1", TaskState::Working)).await);

        let mut handles = Vec::new();
        for state in [TaskState::Completed, TaskState::Canceled, TaskState::Failed] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .save(&status_update("t-1", "ctx-1", state))
                    .await
                    .is_ok()
            }));
        }
        let mut wins = 0;
        for h in handles {
            if h.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
