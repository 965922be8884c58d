//! Expose each skill of a remote A2A agent as a local [`Tool`].

use std::sync::Arc;

use a2a_client::{A2AClient, ClientError};
use a2a_types::{
    AgentCard, AgentSkill, Event, Message, MessageSendConfiguration, MessageSendParams,
    SendMessageRequest, SendMessageResponse,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::{Content, Tool, ToolArgs, ToolError, ToolHandler, ToolRegistry};

/// Tools derived from one agent's card, all sharing one client.
pub struct AgentToolset {
    card: AgentCard,
    client: Arc<A2AClient>,
    tools: Vec<Tool>,
}

impl AgentToolset {
    /// Build tools for `card`, talking to the endpoint in `card.url`.
    pub fn from_card(card: AgentCard) -> Result<Self, ClientError> {
        let client = A2AClient::from_agent_card(&card)?;
        Ok(Self::with_client(card, client))
    }

    /// Resolve the card at `base_url` and build its tools.
    pub async fn connect(base_url: &str) -> Result<Self, ClientError> {
        let (client, card) = A2AClient::connect(base_url).await?;
        Ok(Self::with_client(card, client))
    }

    pub fn with_client(card: AgentCard, client: A2AClient) -> Self {
        let client = Arc::new(client);
        let tools = card
            .skills
            .iter()
            .map(|skill| skill_tool(skill, client.clone()))
            .collect();
        tracing::debug!(agent = %card.name, skills = card.skills.len(), "derived tools from agent card");
        Self {
            card,
            client,
            tools,
        }
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Register every derived tool; stops at the first name clash.
    pub fn register_into(&self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        for tool in &self.tools {
            registry.register(tool.clone())?;
        }
        Ok(())
    }

    /// Drop the tools and close the client's connection pool.
    ///
    /// Tools copied into a [`ToolRegistry`] keep the client alive, so the
    /// pool is only released when no such copy remains. Returns `true` when
    /// it was released here, `false` when registered tools still hold it;
    /// the pool then goes away with the last of them.
    pub fn close(self) -> bool {
        drop(self.tools);
        match Arc::try_unwrap(self.client) {
            Ok(client) => {
                client.close();
                true
            }
            Err(_) => {
                tracing::debug!(agent = %self.card.name, "client still shared by registered tools");
                false
            }
        }
    }
}

fn skill_tool(skill: &AgentSkill, client: Arc<A2AClient>) -> Tool {
    let schema = json!({
        "type": "object",
        "properties": {
            "text": {
                "type": "string",
                "description": format!("Input for the {} skill", skill.name)
            }
        }
    });
    Tool::new(
        skill.id.clone(),
        skill.description.clone(),
        schema,
        SkillHandler {
            client,
            skill_id: skill.id.clone(),
        },
    )
}

struct SkillHandler {
    client: Arc<A2AClient>,
    skill_id: String,
}

#[async_trait]
impl ToolHandler for SkillHandler {
    /// Never fails: remote and transport errors come back as `Error: ...` text.
    async fn call(&self, args: ToolArgs) -> Result<Vec<Content>, ToolError> {
        let text = match args.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(args).to_string(),
        };

        // Wait for the final answer rather than the first status.
        let mut params = MessageSendParams::new(Message::user_text(
            uuid::Uuid::new_v4().to_string(),
            text,
        ));
        params.configuration = Some(MessageSendConfiguration {
            blocking: Some(true),
            ..Default::default()
        });
        let request = SendMessageRequest::new(params);
        let reply = match self.client.send_message(request).await {
            Ok(response) => response_text(response),
            Err(e) => {
                tracing::warn!(skill = %self.skill_id, error = %e, "agent call failed");
                format!("Error: {e}")
            }
        };
        Ok(vec![Content::text(reply)])
    }
}

/// Flatten a `message/send` response into the text a tool caller sees.
pub fn response_text(response: SendMessageResponse) -> String {
    match response.into_result() {
        Ok(Event::Message(message)) => message.text("\n"),
        Ok(Event::Task(task)) => match task.status.message {
            Some(message) => message.text("\n"),
            None => format!("Task {} is in state {}", task.id, task.status.state),
        },
        Ok(other) => serde_json::to_string(&other).unwrap_or_else(|e| e.to_string()),
        Err(error) => format!("Error: {}", error.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_client::{EventStream, Transport};
    use a2a_types::{
        A2AError, AgentCapabilities, CancelTaskRequest, CancelTaskResponse, GetTaskRequest,
        GetTaskResponse, JsonRpcId, JsonRpcResult, Part, SendStreamingMessageRequest, Task,
        TaskState, TaskStatus, TaskStatusUpdateEvent,
    };
    use std::sync::Mutex;

    /// Answers `message/send` with a completed task echoing the input.
    #[derive(Default, Clone)]
    struct MockTransport {
        seen: Arc<Mutex<Vec<MessageSendParams>>>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send_message(
            &self,
            request: SendMessageRequest,
        ) -> Result<SendMessageResponse, ClientError> {
            let text = request.params.message.text("");
            self.seen.lock().unwrap().push(request.params);
            let status = TaskStatus::new(TaskState::Completed)
                .with_message(Message::agent_text("reply", format!("got {text}")));
            Ok(JsonRpcResult::Success {
                id: request.id.unwrap_or_default(),
                result: Event::Task(Task::new("t-1", "ctx-1", status)),
            })
        }

        async fn send_message_streaming(
            &self,
            _request: SendStreamingMessageRequest,
        ) -> Result<EventStream, ClientError> {
            Err(ClientError::Config("not supported by mock".into()))
        }

        async fn get_task(&self, _request: GetTaskRequest) -> Result<GetTaskResponse, ClientError> {
            Err(ClientError::Config("not supported by mock".into()))
        }

        async fn cancel_task(
            &self,
            _request: CancelTaskRequest,
        ) -> Result<CancelTaskResponse, ClientError> {
            Err(ClientError::Config("not supported by mock".into()))
        }
    }

    fn success(event: Event) -> SendMessageResponse {
        JsonRpcResult::Success {
            id: JsonRpcId::Number(1),
            result: event,
        }
    }

    fn card() -> AgentCard {
        let skill = |id: &str, name: &str| AgentSkill {
            id: id.into(),
            name: name.into(),
            description: format!("{name} things"),
            tags: vec![],
            examples: None,
            input_modes: None,
            output_modes: None,
        };
        AgentCard {
            name: "Multi".into(),
            description: "Two skills".into(),
            url: "http://127.0.0.1:9/".into(),
            version: "1.0.0".into(),
            default_input_modes: vec!["text/plain".into()],
            default_output_modes: vec!["text/plain".into()],
            skills: vec![skill("summarize", "Summarize"), skill("translate", "Translate")],
            capabilities: AgentCapabilities::default(),
            provider: None,
            security_schemes: None,
        }
    }

    #[test]
    fn test_tools_from_card() {
        let toolset = AgentToolset::from_card(card()).unwrap();
        let tools = toolset.tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "summarize");
        assert_eq!(tools[0].description, "Summarize things");
        assert_eq!(
            tools[1].input_schema,
            json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Input for the Translate skill"
                    }
                }
            })
        );
    }

    #[test]
    fn test_register_into() {
        let toolset = AgentToolset::from_card(card()).unwrap();
        let mut registry = ToolRegistry::new();
        toolset.register_into(&mut registry).unwrap();
        assert!(registry.get("translate").is_some());

        let err = toolset.register_into(&mut registry).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(_)));
        assert!(!toolset.close(), "registered tools keep the client");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_close_releases_unshared_client() {
        let toolset = AgentToolset::from_card(card()).unwrap();
        assert!(toolset.close());
    }

    #[test]
    fn test_response_text_message() {
        let mut message = Message::agent_text("m-1", "first");
        message.parts.push(Part::text("second"));
        assert_eq!(response_text(success(Event::Message(message))), "first\nsecond");
    }

    #[test]
    fn test_response_text_task() {
        let status =
            TaskStatus::new(TaskState::Completed).with_message(Message::agent_text("m", "answer"));
        let task = Task::new("t-1", "ctx-1", status);
        assert_eq!(response_text(success(Event::Task(task))), "answer");

        let task = Task::new("t-2", "ctx-1", TaskStatus::new(TaskState::Working));
        assert_eq!(
            response_text(success(Event::Task(task))),
            "Task t-2 is in state working"
        );
    }

    #[test]
    fn test_response_text_other_event_is_json() {
        let update = TaskStatusUpdateEvent {
            task_id: "t-1".into(),
            context_id: "ctx-1".into(),
            status: TaskStatus::new(TaskState::Working),
            is_final: false,
            metadata: None,
        };
        let text = response_text(success(Event::TaskStatusUpdate(update)));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "status-update");
    }

    #[test]
    fn test_response_text_error() {
        let response: SendMessageResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"message": "boom"}
        }))
        .unwrap();
        assert_eq!(response_text(response), "Error: boom");

        let response = JsonRpcResult::Error {
            id: JsonRpcId::Null,
            error: A2AError::new(a2a_types::A2AErrorCode::TaskNotFound, "Task not found: x"),
        };
        assert_eq!(response_text(response), "Error: Task not found: x");
    }

    #[tokio::test]
    async fn test_skill_call_sends_blocking_text_message() {
        let mock = MockTransport::default();
        let toolset = AgentToolset::with_client(card(), A2AClient::with_transport(mock.clone()));
        let mut registry = ToolRegistry::new();
        toolset.register_into(&mut registry).unwrap();

        let mut args = ToolArgs::new();
        args.insert("text".into(), json!("hello"));
        let out = registry.call("summarize", args).await.unwrap();
        assert_eq!(out, vec![Content::text("got hello")]);

        let mut args = ToolArgs::new();
        args.insert("other".into(), json!(1));
        let out = registry.call("translate", args).await.unwrap();
        assert_eq!(out, vec![Content::text(r#"got {"other":1}"#)]);

        let seen = mock.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].message.role, a2a_types::Role::User);
        assert_eq!(
            seen[0].configuration.as_ref().and_then(|c| c.blocking),
            Some(true)
        );
        assert_ne!(seen[0].message.message_id, seen[1].message.message_id);
    }

    #[tokio::test]
    async fn test_unreachable_agent_is_error_text() {
        let toolset = AgentToolset::from_card(card()).unwrap();
        let mut args = ToolArgs::new();
        args.insert("text".into(), json!("hello"));

        let out = toolset.tools()[0].call(args).await.unwrap();
        match &out[..] {
            [Content::Text { text }] => assert!(text.starts_with("Error: "), "{text}"),
            other => panic!("Expected one text item, got {other:?}"),
        }
    }
}
