use std::time::Duration;

use a2a_types::{
    A2ARequest, CancelTaskRequest, CancelTaskResponse, GetTaskRequest, GetTaskResponse, JsonRpcId,
    JsonRpcResult, RequestEnvelope, SendMessageRequest, SendMessageResponse,
    SendStreamingMessageRequest,
};

use crate::error::{check_status, ClientError};
use crate::ndjson::decode_stream;
use crate::transport::{EventStream, Transport};

/// Timeouts for [`JsonRpcTransport`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total time allowed for one request/response call.
    pub request_timeout: Duration,
    /// Time allowed to establish a connection, streaming calls included.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// JSON-RPC over HTTP transport for the A2A protocol.
///
/// Uses two `reqwest::Client` instances:
/// - `client`: `request_timeout` for request/response calls.
/// - `streaming_client`: no total timeout for streamed responses.
pub struct JsonRpcTransport {
    client: reqwest::Client,
    streaming_client: reqwest::Client,
    url: String,
}

impl JsonRpcTransport {
    /// Create a new transport targeting the given JSON-RPC endpoint URL.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Self::with_config(url, &ClientConfig::default())
    }

    pub fn with_config(url: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let streaming_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            streaming_client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Keeps a caller-supplied id, otherwise mints a fresh one.
    fn request_id<R: A2ARequest>(request: &R) -> JsonRpcId {
        request
            .id()
            .cloned()
            .unwrap_or_else(|| JsonRpcId::String(uuid::Uuid::new_v4().to_string()))
    }

    /// Send a request/response JSON-RPC call and decode the envelope.
    async fn call<R: A2ARequest>(
        &self,
        request: &R,
    ) -> Result<JsonRpcResult<R::Output>, ClientError> {
        let id = Self::request_id(request);
        tracing::debug!(url = %self.url, method = R::METHOD, ?id, "sending JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&RequestEnvelope::new(request, &id))
            .send()
            .await
            .map_err(|e| ClientError::network(&self.url, e))?;
        let response = check_status(&self.url, response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::network(&self.url, e))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::decode(&self.url, e))
    }
}

#[async_trait::async_trait]
impl Transport for JsonRpcTransport {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, ClientError> {
        self.call(&request).await
    }

    async fn send_message_streaming(
        &self,
        request: SendStreamingMessageRequest,
    ) -> Result<EventStream, ClientError> {
        let id = Self::request_id(&request);
        tracing::debug!(url = %self.url, ?id, "opening message stream");

        let response = self
            .streaming_client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .json(&RequestEnvelope::new(&request, &id))
            .send()
            .await
            .map_err(|e| ClientError::network(&self.url, e))?;
        let response = check_status(&self.url, response).await?;

        Ok(decode_stream(self.url.clone(), response.bytes_stream()))
    }

    async fn get_task(&self, request: GetTaskRequest) -> Result<GetTaskResponse, ClientError> {
        self.call(&request).await
    }

    async fn cancel_task(
        &self,
        request: CancelTaskRequest,
    ) -> Result<CancelTaskResponse, ClientError> {
        self.call(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::{Message, MessageSendParams, TaskQueryParams};

    #[test]
    fn test_request_id_kept_when_present() {
        let request = GetTaskRequest::new(TaskQueryParams {
            id: "t-1".into(),
            history_length: None,
            metadata: None,
        })
        .with_id("custom");
        assert_eq!(
            JsonRpcTransport::request_id(&request),
            JsonRpcId::String("custom".into())
        );
    }

    #[test]
    fn test_request_id_generated_when_absent() {
        let request =
            SendMessageRequest::new(MessageSendParams::new(Message::user_text("m-1", "hi")));
        let a = JsonRpcTransport::request_id(&request);
        let b = JsonRpcTransport::request_id(&request);
        assert!(matches!(a, JsonRpcId::String(_)));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) on localhost is not expected to be listening
        let transport = JsonRpcTransport::new("http://127.0.0.1:9/").unwrap();
        let request = GetTaskRequest::new(TaskQueryParams {
            id: "t-1".into(),
            history_length: None,
            metadata: None,
        });
        match transport.get_task(request).await {
            Err(ClientError::Network { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/"),
            other => panic!("Expected network error, got {other:?}"),
        }
    }
}
