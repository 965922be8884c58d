use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use a2a_types::{
    methods, A2AError, A2AErrorCode, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    MessageSendParams, TaskIdParams, TaskQueryParams, JSONRPC_VERSION,
};

use crate::error::ServerError;
use crate::ndjson_writer::event_stream_to_ndjson;
use crate::router::AppState;

/// Main JSON-RPC handler for A2A protocol requests.
///
/// Every outcome, errors included, is an HTTP 200 carrying a JSON-RPC
/// envelope; `message/stream` answers with NDJSON once the stream opens.
pub async fn jsonrpc_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting unparsable JSON-RPC body");
            return error_response(JsonRpcId::Null, A2AErrorCode::ParseError.into());
        }
    };

    let request = match parse_request(value) {
        Ok(request) => request,
        Err((id, error)) => return error_response(id, error),
    };

    let id = request.id;
    let params = request.params.unwrap_or(Value::Null);
    tracing::debug!(method = %request.method, ?id, "dispatching JSON-RPC request");

    match request.method.as_str() {
        methods::SEND_MESSAGE => {
            let result = match decode_params::<MessageSendParams>(params) {
                Ok(params) => state.handler.on_send_message(params).await,
                Err(e) => Err(e),
            };
            respond(id, result)
        }
        methods::SEND_STREAMING_MESSAGE => handle_stream(&state, id, params).await,
        methods::GET_TASK => {
            let result = match decode_params::<TaskQueryParams>(params) {
                Ok(params) => state.handler.on_get_task(params).await,
                Err(e) => Err(e),
            };
            respond(id, result)
        }
        methods::CANCEL_TASK => {
            let result = match decode_params::<TaskIdParams>(params) {
                Ok(params) => state.handler.on_cancel_task(params).await,
                Err(e) => Err(e),
            };
            respond(id, result)
        }
        other => {
            tracing::debug!(method = other, "unknown JSON-RPC method");
            error_response(id, A2AErrorCode::MethodNotFound.into())
        }
    }
}

async fn handle_stream(state: &AppState, id: JsonRpcId, params: Value) -> Response {
    let params = match decode_params::<MessageSendParams>(params) {
        Ok(params) => params,
        Err(e) => return server_error_response(id, &e),
    };

    match state.handler.on_send_message_stream(params).await {
        Ok(stream) => event_stream_to_ndjson(stream, id),
        Err(e) => server_error_response(id, &e),
    }
}

/// Validate the JSON-RPC envelope, keeping the id whenever it is readable.
fn parse_request(value: Value) -> Result<JsonRpcRequest, (JsonRpcId, A2AError)> {
    let Value::Object(mut object) = value else {
        return Err((JsonRpcId::Null, invalid_request("request must be a JSON object")));
    };

    let id = match object.remove("id") {
        None => JsonRpcId::Null,
        Some(raw) => serde_json::from_value(raw).map_err(|_| {
            (
                JsonRpcId::Null,
                invalid_request("id must be a string, an integer or null"),
            )
        })?,
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err((id, invalid_request("jsonrpc must be \"2.0\"")));
    }
    let Some(method) = object.get("method").and_then(Value::as_str) else {
        return Err((id, invalid_request("method must be a string")));
    };

    Ok(JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.into(),
        method: method.to_string(),
        params: object.remove("params"),
        id,
    })
}

fn invalid_request(detail: &str) -> A2AError {
    A2AError::from(A2AErrorCode::InvalidRequest).with_data(serde_json::json!({ "detail": detail }))
}

fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, ServerError> {
    serde_json::from_value(params).map_err(|e| {
        ServerError::A2A(
            A2AError::from(A2AErrorCode::InvalidParams)
                .with_data(serde_json::json!({ "detail": e.to_string() })),
        )
    })
}

fn respond<T: Serialize>(id: JsonRpcId, result: Result<T, ServerError>) -> Response {
    let value = result.and_then(|r| serde_json::to_value(r).map_err(ServerError::from));
    match value {
        Ok(value) => Json(JsonRpcResponse::success(id, value)).into_response(),
        Err(e) => server_error_response(id, &e),
    }
}

fn server_error_response(id: JsonRpcId, err: &ServerError) -> Response {
    if err.is_internal() {
        tracing::error!(?id, "internal error: {err}");
    } else {
        tracing::debug!(?id, "request failed: {err}");
    }
    error_response(id, err.into())
}

fn error_response(id: JsonRpcId, error: A2AError) -> Response {
    Json(JsonRpcResponse::error(id, error)).into_response()
}
