//! Publish a local [`Tool`] as a single-skill A2A agent.

use std::sync::Arc;

use a2a_server::{
    create_router, AgentExecutor, DefaultHandler, EventQueueWriter, RequestContext, ServerConfig,
    ServerError,
};
use a2a_types::{AgentCapabilities, AgentCard, AgentSkill, Event, TaskState};
use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use crate::tool::{join_content, Content, Tool, ToolArgs, ToolError};

const WORKING_TEXT: &str = "Processing request...";
const CANCELED_TEXT: &str = "Task canceled by user.";

/// Executor that answers every message by calling one tool.
pub struct ToolExecutor {
    tool: Tool,
}

impl ToolExecutor {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// Call the tool on its own task so a panic surfaces as an error.
    async fn invoke(&self, args: ToolArgs) -> Result<Vec<Content>, ToolError> {
        let tool = self.tool.clone();
        match tokio::spawn(async move { tool.call(args).await }).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(ToolError::Execution(panic_message(e.into_panic()))),
            Err(e) => Err(ToolError::Execution(e.to_string())),
        }
    }
}

#[async_trait]
impl AgentExecutor for ToolExecutor {
    async fn execute(
        &self,
        context: &RequestContext,
        queue: &dyn EventQueueWriter,
    ) -> Result<(), ServerError> {
        queue
            .write(Event::Task(context.task(TaskState::Working, WORKING_TEXT)))
            .await?;

        let args = tool_arguments(&context.user_text(" "));
        let task = match self.invoke(args).await {
            Ok(contents) => {
                let reply = context.agent_message(join_content(&contents, "\n"));
                let mut task = context.task_with_message(TaskState::Completed, reply.clone());
                task.history.get_or_insert_with(Vec::new).push(reply);
                task
            }
            Err(e) => {
                tracing::warn!(tool = %self.tool.name, task_id = %context.task_id, error = %e, "tool call failed");
                context.task(TaskState::Failed, format!("Error executing tool: {e}"))
            }
        };
        queue.write(Event::Task(task)).await
    }

    async fn cancel(
        &self,
        context: &RequestContext,
        queue: &dyn EventQueueWriter,
    ) -> Result<(), ServerError> {
        queue
            .write(Event::Task(context.task(TaskState::Canceled, CANCELED_TEXT)))
            .await
    }
}

/// A JSON object becomes the argument map; anything else is passed as `text`.
pub fn tool_arguments(text: &str) -> ToolArgs {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(args) = serde_json::from_str::<ToolArgs>(trimmed) {
            return args;
        }
    }
    let mut args = ToolArgs::new();
    args.insert("text".into(), Value::String(text.to_string()));
    args
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}

/// A tool presented as an A2A agent with one skill.
pub struct ToolAgent {
    tool: Tool,
    url: Option<String>,
}

impl ToolAgent {
    pub fn new(tool: Tool) -> Self {
        Self { tool, url: None }
    }

    /// Advertise `url` instead of `/a2a/tools/{name}`.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("/a2a/tools/{}", self.tool.name))
    }

    pub fn agent_card(&self) -> AgentCard {
        AgentCard {
            name: self.tool.name.clone(),
            description: self.tool.description.clone(),
            url: self.url(),
            version: "1.0.0".into(),
            default_input_modes: vec!["text/plain".into()],
            default_output_modes: vec!["text/plain".into()],
            skills: vec![AgentSkill {
                id: self.tool.name.clone(),
                name: self.tool.name.clone(),
                description: self.tool.description.clone(),
                tags: vec!["mcp-tool".into()],
                examples: Some(vec![]),
                input_modes: None,
                output_modes: None,
            }],
            capabilities: AgentCapabilities {
                streaming: Some(true),
                push_notifications: Some(false),
                state_transition_history: Some(true),
            },
            provider: None,
            security_schemes: None,
        }
    }

    pub fn executor(&self) -> ToolExecutor {
        ToolExecutor::new(self.tool.clone())
    }

    /// Router serving the card and JSON-RPC at `/` and at the card url.
    pub fn router(&self) -> Result<Router, ServerError> {
        self.router_with_config(ServerConfig::default())
    }

    pub fn router_with_config(&self, config: ServerConfig) -> Result<Router, ServerError> {
        let handler = DefaultHandler::builder()
            .executor(Arc::new(self.executor()))
            .config(config)
            .build()?;
        Ok(create_router(Arc::new(handler), self.agent_card()))
    }

    pub async fn serve(self, config: ServerConfig) -> Result<(), ServerError> {
        let card = self.agent_card();
        a2a_server::serve(self.executor(), card, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::echo_tool;
    use a2a_server::event_queue;
    use a2a_types::{Message, Task};
    use serde_json::json;

    fn context(text: &str) -> RequestContext {
        RequestContext::new("t-1", "ctx-1").with_message(Message::user_text("m-1", text))
    }

    async fn run(executor: &ToolExecutor, text: &str) -> Vec<Task> {
        let (queue, mut reader) = event_queue();
        executor.execute(&context(text), &queue).await.unwrap();
        drop(queue);

        let mut tasks = Vec::new();
        while let Some(event) = reader.read().await {
            match event {
                Event::Task(task) => tasks.push(task),
                other => panic!("Expected Task, got {other:?}"),
            }
        }
        tasks
    }

    #[test]
    fn test_tool_arguments() {
        assert_eq!(
            Value::Object(tool_arguments(r#" {"message": "hey", "n": 2} "#)),
            json!({"message": "hey", "n": 2})
        );
        assert_eq!(Value::Object(tool_arguments("hi")), json!({"text": "hi"}));
        assert_eq!(
            Value::Object(tool_arguments("{not json}")),
            json!({"text": "{not json}"})
        );
        assert_eq!(Value::Object(tool_arguments("")), json!({"text": ""}));
    }

    #[test]
    fn test_agent_card() {
        let agent = ToolAgent::new(echo_tool());
        let card = agent.agent_card();
        assert_eq!(card.name, "echo");
        assert_eq!(card.url, "/a2a/tools/echo");
        assert_eq!(card.version, "1.0.0");
        assert_eq!(card.default_input_modes, vec!["text/plain"]);
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].id, "echo");
        assert_eq!(card.skills[0].tags, vec!["mcp-tool"]);
        assert_eq!(card.capabilities.streaming, Some(true));
        assert_eq!(card.capabilities.push_notifications, Some(false));
        assert_eq!(card.capabilities.state_transition_history, Some(true));

        let card = ToolAgent::new(echo_tool())
            .with_url("http://tools.local/echo")
            .agent_card();
        assert_eq!(card.url, "http://tools.local/echo");
    }

    #[tokio::test]
    async fn test_execute_publishes_working_then_completed() {
        let executor = ToolExecutor::new(echo_tool());
        let tasks = run(&executor, "hi").await;

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status.state, TaskState::Working);
        assert_eq!(
            tasks[0].status.message.as_ref().unwrap().text(""),
            WORKING_TEXT
        );

        let done = &tasks[1];
        assert_eq!(done.status.state, TaskState::Completed);
        let reply = done.status.message.as_ref().unwrap();
        assert_eq!(reply.text(""), "hi");
        let history = done.history.as_ref().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].message_id, reply.message_id);
    }

    #[tokio::test]
    async fn test_execute_json_arguments() {
        let executor = ToolExecutor::new(echo_tool());
        let tasks = run(&executor, r#"{"message": "from json"}"#).await;
        assert_eq!(
            tasks[1].status.message.as_ref().unwrap().text(""),
            "from json"
        );
    }

    #[tokio::test]
    async fn test_multi_content_joined_with_newline() {
        let tool = Tool::from_fn("lines", "Two lines", json!({}), |_args: ToolArgs| async {
            Ok::<_, ToolError>(vec![
                Content::text("one"),
                Content::Image {
                    url: "u".into(),
                    media_type: "image/png".into(),
                },
                Content::text("two"),
            ])
        });
        let tasks = run(&ToolExecutor::new(tool), "x").await;
        assert_eq!(
            tasks[1].status.message.as_ref().unwrap().text(""),
            "one\ntwo"
        );
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failed_task() {
        let tool = Tool::from_fn("broken", "Always fails", json!({}), |_args: ToolArgs| async {
            Err::<Vec<Content>, _>(ToolError::Execution("disk full".into()))
        });
        let tasks = run(&ToolExecutor::new(tool), "x").await;
        assert_eq!(tasks[1].status.state, TaskState::Failed);
        assert_eq!(
            tasks[1].status.message.as_ref().unwrap().text(""),
            "Error executing tool: disk full"
        );
    }

    #[tokio::test]
    async fn test_tool_panic_becomes_failed_task() {
        let tool = Tool::from_fn("panicky", "Panics", json!({}), |_args: ToolArgs| async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, ToolError>(vec![])
        });
        let tasks = run(&ToolExecutor::new(tool), "x").await;
        assert_eq!(tasks[1].status.state, TaskState::Failed);
        assert_eq!(
            tasks[1].status.message.as_ref().unwrap().text(""),
            "Error executing tool: kaboom"
        );
    }

    #[tokio::test]
    async fn test_cancel_publishes_canceled() {
        let executor = ToolExecutor::new(echo_tool());
        let (queue, mut reader) = event_queue();
        executor.cancel(&context("x"), &queue).await.unwrap();
        drop(queue);

        match reader.read().await.unwrap() {
            Event::Task(task) => {
                assert_eq!(task.status.state, TaskState::Canceled);
                assert_eq!(task.status.message.unwrap().text(""), CANCELED_TEXT);
            }
            other => panic!("Expected Task, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_router_serves_card_and_blocking_send_at_tool_url() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let router = ToolAgent::new(echo_tool()).router().unwrap();

        let req = Request::builder()
            .uri(a2a_server::AGENT_CARD_PATH)
            .body(Body::empty())
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let card: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(card["url"], "/a2a/tools/echo");
        assert_eq!(card["skills"][0]["tags"][0], "mcp-tool");

        let body = json!({
            "jsonrpc": "2.0",
            "id": "req-1",
            "method": "message/send",
            "params": {
                "message": {
                    "kind": "message",
                    "messageId": "m-1",
                    "role": "user",
                    "parts": [{"kind": "text", "text": "hi"}]
                },
                "configuration": {"blocking": true}
            }
        });
        let req = Request::builder()
            .uri("/a2a/tools/echo")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["id"], "req-1");
        assert_eq!(value["result"]["kind"], "task");
        assert_eq!(value["result"]["status"]["state"], "completed");
        assert_eq!(value["result"]["status"]["message"]["parts"][0]["text"], "hi");
    }
}
