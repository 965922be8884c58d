pub mod agent_card;
pub mod artifact;
pub mod error;
pub mod event;
pub mod jsonrpc;
pub mod kind;
pub mod message;
pub mod part;
pub mod task;

// Convenience re-exports
pub use agent_card::{AgentCapabilities, AgentCard, AgentProvider, AgentSkill};
pub use artifact::Artifact;
pub use error::{A2AError, A2AErrorCode};
pub use event::{Event, TaskArtifactUpdateEvent, TaskStatusUpdateEvent};
pub use jsonrpc::{
    methods, A2ARequest, CancelTaskRequest, CancelTaskResponse, GetTaskRequest, GetTaskResponse,
    JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, JsonRpcResult,
    MessageSendConfiguration, MessageSendParams, RequestEnvelope, SendMessageRequest,
    SendMessageResponse, SendStreamingMessageRequest, SendStreamingMessageResponse, TaskIdParams,
    TaskQueryParams, JSONRPC_VERSION,
};
pub use kind::{MessageKind, TaskKind};
pub use message::{Message, Role};
pub use part::{join_text, FileContent, FileSource, Part, PartContent};
pub use task::{Task, TaskState, TaskStatus, TransitionError};
