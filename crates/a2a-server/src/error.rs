use a2a_types::{A2AError, A2AErrorCode, TransitionError};

use crate::task_store::TaskStoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("A2A error: {0}")]
    A2A(A2AError),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid agent response: {0}")]
    InvalidAgentResponse(String),

    #[error("Task store error: {0}")]
    Store(#[from] TaskStoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// True for faults whose detail stays in the server log.
    pub fn is_internal(&self) -> bool {
        match self {
            ServerError::A2A(e) => e.code == A2AErrorCode::InternalError.code(),
            ServerError::Store(TaskStoreError::TaskNotFound(_)) => false,
            ServerError::TaskNotFound(_)
            | ServerError::UnsupportedOperation(_)
            | ServerError::InvalidAgentResponse(_) => false,
            _ => true,
        }
    }
}

impl From<A2AError> for ServerError {
    fn from(err: A2AError) -> Self {
        ServerError::A2A(err)
    }
}

impl From<TransitionError> for ServerError {
    fn from(err: TransitionError) -> Self {
        ServerError::Store(TaskStoreError::InvalidTransition(err))
    }
}

impl From<&ServerError> for A2AError {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::A2A(e) => e.clone(),
            ServerError::TaskNotFound(id) | ServerError::Store(TaskStoreError::TaskNotFound(id)) => {
                A2AError::new(A2AErrorCode::TaskNotFound, format!("Task not found: {id}"))
            }
            ServerError::UnsupportedOperation(detail) => A2AError::new(
                A2AErrorCode::UnsupportedOperation,
                format!("Unsupported operation: {detail}"),
            ),
            ServerError::InvalidAgentResponse(_) => {
                A2AError::from(A2AErrorCode::InvalidAgentResponse)
            }
            ServerError::Store(_)
            | ServerError::Config(_)
            | ServerError::Internal(_)
            | ServerError::Serialization(_)
            | ServerError::QueueClosed
            | ServerError::Io(_) => A2AError::from(A2AErrorCode::InternalError),
        }
    }
}
