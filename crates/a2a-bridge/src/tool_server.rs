//! Plain HTTP surface over a [`ToolRegistry`].
//!
//! * `GET /list-tools` lists `{name, description, inputSchema}` per tool.
//! * `POST /tool/:name` takes the keyword arguments as a JSON object and
//!   answers with the tool's content items.
//!
//! Failures come back as `{"error": "..."}`: malformed arguments and tool
//! argument errors are 400, an unknown tool is 404, anything else is 500
//! with the detail kept in the log.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tool::{Tool, ToolError, ToolRegistry};

/// One entry of `GET /list-tools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&Tool> for ToolDescriptor {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

/// Router serving `registry`; the registry is read-only from here on.
pub fn tool_router(registry: Arc<ToolRegistry>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/list-tools", get(list_tools))
        .route("/tool/:name", post(call_tool))
        .with_state(registry)
}

/// Bind `addr` and serve `registry` until the listener fails.
pub async fn serve_tools(registry: ToolRegistry, addr: SocketAddr) -> std::io::Result<()> {
    let tools = registry.len();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, tools, "tool server listening");
    axum::serve(listener, tool_router(Arc::new(registry))).await
}

async fn index() -> Json<Value> {
    Json(json!({
        "endpoints": {
            "list-tools": "/list-tools",
            "tool": "/tool/{tool_name}"
        }
    }))
}

async fn list_tools(State(registry): State<Arc<ToolRegistry>>) -> Json<Vec<ToolDescriptor>> {
    Json(registry.list().into_iter().map(ToolDescriptor::from).collect())
}

async fn call_tool(
    State(registry): State<Arc<ToolRegistry>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let args = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(args)) => args,
        Ok(_) => return error_response(StatusCode::BAD_REQUEST, "arguments must be a JSON object"),
        Err(e) => {
            tracing::debug!(tool = %name, error = %e, "rejected tool call body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    tracing::debug!(tool = %name, "tool call over http");
    match registry.call(&name, args).await {
        Ok(contents) => Json(contents).into_response(),
        Err(err @ ToolError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, &err.to_string())
        }
        Err(err @ ToolError::InvalidArguments(_)) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(err) => {
            tracing::error!(tool = %name, error = %err, "tool call failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
