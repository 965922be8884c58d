use a2a_types::{Event, JsonRpcId, JsonRpcResponse};
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio_stream::StreamExt;

use crate::event_queue::EventStream;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Convert an `EventStream` into a chunked newline-delimited JSON response.
///
/// Each A2A event is wrapped in a `JsonRpcResponse` carrying the request
/// id and written as one line, flushed as soon as it is produced.
pub fn event_stream_to_ndjson(stream: EventStream, request_id: JsonRpcId) -> Response {
    let lines = stream.map(move |event| encode_line(&request_id, &event));
    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

fn encode_line(request_id: &JsonRpcId, event: &Event) -> Result<Bytes, serde_json::Error> {
    let result = serde_json::to_value(event)?;
    let mut line = serde_json::to_vec(&JsonRpcResponse::success(request_id.clone(), result))?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}
