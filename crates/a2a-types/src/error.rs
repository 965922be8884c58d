use serde::{Deserialize, Serialize};

/// A2A JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A2AErrorCode {
    // Standard JSON-RPC errors
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,

    // A2A-specific errors
    TaskNotFound,
    TaskNotCancelable,
    PushNotSupported,
    UnsupportedOperation,
    IncompatibleContentTypes,
    InvalidAgentResponse,
}

impl A2AErrorCode {
    pub const ALL: [A2AErrorCode; 11] = [
        A2AErrorCode::ParseError,
        A2AErrorCode::InvalidRequest,
        A2AErrorCode::MethodNotFound,
        A2AErrorCode::InvalidParams,
        A2AErrorCode::InternalError,
        A2AErrorCode::TaskNotFound,
        A2AErrorCode::TaskNotCancelable,
        A2AErrorCode::PushNotSupported,
        A2AErrorCode::UnsupportedOperation,
        A2AErrorCode::IncompatibleContentTypes,
        A2AErrorCode::InvalidAgentResponse,
    ];

    pub fn code(&self) -> i32 {
        match self {
            A2AErrorCode::ParseError => -32700,
            A2AErrorCode::InvalidRequest => -32600,
            A2AErrorCode::MethodNotFound => -32601,
            A2AErrorCode::InvalidParams => -32602,
            A2AErrorCode::InternalError => -32603,
            A2AErrorCode::TaskNotFound => -32001,
            A2AErrorCode::TaskNotCancelable => -32002,
            A2AErrorCode::PushNotSupported => -32003,
            A2AErrorCode::UnsupportedOperation => -32004,
            A2AErrorCode::IncompatibleContentTypes => -32005,
            A2AErrorCode::InvalidAgentResponse => -32006,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            A2AErrorCode::ParseError => "Parse error",
            A2AErrorCode::InvalidRequest => "Invalid request",
            A2AErrorCode::MethodNotFound => "Method not found",
            A2AErrorCode::InvalidParams => "Invalid params",
            A2AErrorCode::InternalError => "Internal error",
            A2AErrorCode::TaskNotFound => "Task not found",
            A2AErrorCode::TaskNotCancelable => "Task not cancelable",
            A2AErrorCode::PushNotSupported => "Push notifications not supported",
            A2AErrorCode::UnsupportedOperation => "Unsupported operation",
            A2AErrorCode::IncompatibleContentTypes => "Incompatible content types",
            A2AErrorCode::InvalidAgentResponse => "Invalid agent response",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// A2A error as transmitted in JSON-RPC error responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2AError {
    /// Peers that omit the code are read as internal errors
    #[serde(default = "internal_error_code")]
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

fn internal_error_code() -> i32 {
    A2AErrorCode::InternalError.code()
}

impl A2AError {
    pub fn new(code: A2AErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn error_code(&self) -> Option<A2AErrorCode> {
        A2AErrorCode::from_code(self.code)
    }
}

impl From<A2AErrorCode> for A2AError {
    fn from(code: A2AErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.default_message().into(),
            data: None,
        }
    }
}

impl std::fmt::Display for A2AError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for A2AError {}
