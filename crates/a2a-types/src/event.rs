use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::artifact::Artifact;
use crate::message::Message;
use crate::task::{Task, TaskState, TaskStatus};

/// Task status update event - emitted during streaming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    pub task_id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Task artifact update event - emitted during streaming for chunk delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    pub task_id: String,
    pub context_id: String,
    pub artifact: Artifact,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub last_chunk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Top-level object exchanged between server and client, tagged by `kind`.
///
/// Tasks and messages carry their own `kind` field; the update events get
/// theirs added here.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Task(Task),
    Message(Message),
    TaskStatusUpdate(TaskStatusUpdateEvent),
    TaskArtifactUpdate(TaskArtifactUpdateEvent),
}

const STATUS_UPDATE_KIND: &str = "status-update";
const ARTIFACT_UPDATE_KIND: &str = "artifact-update";
const EVENT_KINDS: &[&str] = &[
    crate::kind::TaskKind::VALUE,
    crate::kind::MessageKind::VALUE,
    STATUS_UPDATE_KIND,
    ARTIFACT_UPDATE_KIND,
];

#[derive(Serialize)]
struct Tagged<'a, T> {
    kind: &'static str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Event::Task(task) => task.serialize(serializer),
            Event::Message(message) => message.serialize(serializer),
            Event::TaskStatusUpdate(update) => Tagged {
                kind: STATUS_UPDATE_KIND,
                inner: update,
            }
            .serialize(serializer),
            Event::TaskArtifactUpdate(update) => Tagged {
                kind: ARTIFACT_UPDATE_KIND,
                inner: update,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = match value.get("kind") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(_) => return Err(D::Error::custom("`kind` must be a string")),
            None => return Err(D::Error::missing_field("kind")),
        };

        let event = match kind.as_str() {
            k if k == crate::kind::TaskKind::VALUE => serde_json::from_value(value).map(Event::Task),
            k if k == crate::kind::MessageKind::VALUE => {
                serde_json::from_value(value).map(Event::Message)
            }
            STATUS_UPDATE_KIND => serde_json::from_value(value).map(Event::TaskStatusUpdate),
            ARTIFACT_UPDATE_KIND => serde_json::from_value(value).map(Event::TaskArtifactUpdate),
            other => return Err(D::Error::unknown_variant(other, EVENT_KINDS)),
        };
        event.map_err(D::Error::custom)
    }
}

impl Event {
    /// Task the event belongs to, if any
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Event::Task(t) => Some(&t.id),
            Event::Message(m) => m.task_id.as_deref(),
            Event::TaskStatusUpdate(u) => Some(&u.task_id),
            Event::TaskArtifactUpdate(u) => Some(&u.task_id),
        }
    }

    /// State carried by task and status-update events
    pub fn state(&self) -> Option<TaskState> {
        match self {
            Event::Task(t) => Some(t.status.state),
            Event::TaskStatusUpdate(u) => Some(u.status.state),
            _ => None,
        }
    }

    /// True once nothing further will be published for the task
    pub fn is_terminal(&self) -> bool {
        match self {
            Event::TaskStatusUpdate(u) => u.is_final || u.status.state.is_terminal(),
            _ => self.state().is_some_and(|s| s.is_terminal()),
        }
    }

    /// True when the task is waiting on the caller
    pub fn is_interrupt(&self) -> bool {
        self.state().is_some_and(|s| s.is_interrupt())
    }
}

impl From<Task> for Event {
    fn from(task: Task) -> Self {
        Event::Task(task)
    }
}

impl From<Message> for Event {
    fn from(message: Message) -> Self {
        Event::Message(message)
    }
}
