use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::error::A2AError;
use crate::event::Event;
use crate::message::Message;
use crate::task::Task;

pub const JSONRPC_VERSION: &str = "2.0";

/// Method names served over the single JSON-RPC endpoint
pub mod methods {
    pub const SEND_MESSAGE: &str = "message/send";
    pub const SEND_STREAMING_MESSAGE: &str = "message/stream";
    pub const GET_TASK: &str = "tasks/get";
    pub const CANCEL_TASK: &str = "tasks/cancel";
}

/// JSON-RPC 2.0 request ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

impl From<&str> for JsonRpcId {
    fn from(id: &str) -> Self {
        JsonRpcId::String(id.to_string())
    }
}

impl From<String> for JsonRpcId {
    fn from(id: String) -> Self {
        JsonRpcId::String(id)
    }
}

impl From<i64> for JsonRpcId {
    fn from(id: i64) -> Self {
        JsonRpcId::Number(id)
    }
}

/// JSON-RPC error object
pub type JsonRpcError = A2AError;

/// Untyped JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub id: JsonRpcId,
}

/// Untyped JSON-RPC 2.0 response, as written by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: JsonRpcId,
}

impl JsonRpcResponse {
    pub fn success(id: JsonRpcId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// Typed JSON-RPC response: either a decoded `result` or an error object.
///
/// Decoding checks for an `error` member before looking at `result`, so a
/// well-formed error body never gets validated against the success schema.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcResult<T> {
    Success { id: JsonRpcId, result: T },
    Error { id: JsonRpcId, error: JsonRpcError },
}

pub type SendMessageResponse = JsonRpcResult<Event>;
pub type SendStreamingMessageResponse = JsonRpcResult<Event>;
pub type GetTaskResponse = JsonRpcResult<Task>;
pub type CancelTaskResponse = JsonRpcResult<Task>;

impl<T> JsonRpcResult<T> {
    pub fn id(&self) -> &JsonRpcId {
        match self {
            JsonRpcResult::Success { id, .. } | JsonRpcResult::Error { id, .. } => id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcResult::Error { .. })
    }

    pub fn into_result(self) -> Result<T, JsonRpcError> {
        match self {
            JsonRpcResult::Success { result, .. } => Ok(result),
            JsonRpcResult::Error { error, .. } => Err(error),
        }
    }
}

impl<T: Serialize> Serialize for JsonRpcResult<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("JsonRpcResult", 3)?;
        s.serialize_field("jsonrpc", JSONRPC_VERSION)?;
        match self {
            JsonRpcResult::Success { id, result } => {
                s.serialize_field("id", id)?;
                s.serialize_field("result", result)?;
            }
            JsonRpcResult::Error { id, error } => {
                s.serialize_field("id", id)?;
                s.serialize_field("error", error)?;
            }
        }
        s.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for JsonRpcResult<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let mut value = serde_json::Value::deserialize(deserializer)?;
        let obj = value
            .as_object_mut()
            .ok_or_else(|| D::Error::custom("JSON-RPC response must be a JSON object"))?;

        let id = match obj.remove("id") {
            Some(raw) => serde_json::from_value(raw).map_err(D::Error::custom)?,
            None => JsonRpcId::Null,
        };

        // `"error": null` sits beside some success results
        if let Some(raw) = obj.remove("error").filter(|raw| !raw.is_null()) {
            let error = serde_json::from_value(raw).map_err(D::Error::custom)?;
            return Ok(JsonRpcResult::Error { id, error });
        }

        let raw = obj
            .remove("result")
            .ok_or_else(|| D::Error::missing_field("result"))?;
        let result = serde_json::from_value(raw).map_err(D::Error::custom)?;
        Ok(JsonRpcResult::Success { id, result })
    }
}

// --- A2A Request Parameter Types ---

/// Parameters for message/send and message/stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl MessageSendParams {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            configuration: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,
    /// Wait for a terminal or interrupted state before answering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
}

/// Parameters for tasks/get
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Parameters for tasks/cancel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// --- Typed requests ---

/// A typed JSON-RPC call with a fixed method and result type.
pub trait A2ARequest {
    const METHOD: &'static str;
    type Params: Serialize;
    type Output: DeserializeOwned;

    fn id(&self) -> Option<&JsonRpcId>;
    fn params(&self) -> &Self::Params;
}

/// Wire form of a typed request; borrows its parts
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, P> {
    pub jsonrpc: &'static str,
    pub id: &'a JsonRpcId,
    pub method: &'static str,
    pub params: &'a P,
}

impl<'a, P> RequestEnvelope<'a, P> {
    pub fn new<R>(request: &'a R, id: &'a JsonRpcId) -> Self
    where
        R: A2ARequest<Params = P>,
    {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: R::METHOD,
            params: request.params(),
        }
    }
}

macro_rules! typed_request {
    ($(#[$doc:meta])* $name:ident, $method:expr, $params:ty, $output:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            /// Filled in by the client when absent
            pub id: Option<JsonRpcId>,
            pub params: $params,
        }

        impl $name {
            pub fn new(params: $params) -> Self {
                Self { id: None, params }
            }

            pub fn with_id(mut self, id: impl Into<JsonRpcId>) -> Self {
                self.id = Some(id.into());
                self
            }
        }

        impl A2ARequest for $name {
            const METHOD: &'static str = $method;
            type Params = $params;
            type Output = $output;

            fn id(&self) -> Option<&JsonRpcId> {
                self.id.as_ref()
            }

            fn params(&self) -> &$params {
                &self.params
            }
        }
    };
}

typed_request!(
    /// `message/send`
    SendMessageRequest,
    methods::SEND_MESSAGE,
    MessageSendParams,
    Event
);
typed_request!(
    /// `message/stream`
    SendStreamingMessageRequest,
    methods::SEND_STREAMING_MESSAGE,
    MessageSendParams,
    Event
);
typed_request!(
    /// `tasks/get`
    GetTaskRequest,
    methods::GET_TASK,
    TaskQueryParams,
    Task
);
typed_request!(
    /// `tasks/cancel`
    CancelTaskRequest,
    methods::CANCEL_TASK,
    TaskIdParams,
    Task
);

impl From<SendMessageRequest> for SendStreamingMessageRequest {
    fn from(request: SendMessageRequest) -> Self {
        Self {
            id: request.id,
            params: request.params,
        }
    }
}
