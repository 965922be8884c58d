//! Tool contract shared by both bridge directions.
//!
//! A tool is a named async function taking keyword arguments (a JSON
//! object) and returning typed content items, described by a JSON schema.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Keyword arguments passed to a tool.
pub type ToolArgs = serde_json::Map<String, Value>;

/// One item of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(rename = "mediaType")]
        media_type: String,
    },
    Resource {
        url: String,
    },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Text items of `contents` joined with `separator`; other items are skipped.
pub fn join_content(contents: &[Content], separator: &str) -> String {
    contents
        .iter()
        .filter_map(Content::as_text)
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("tool already registered: {0}")]
    Duplicate(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Execution(String),
}

#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    async fn call(&self, args: ToolArgs) -> Result<Vec<Content>, ToolError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Content>, ToolError>> + Send + 'static,
{
    async fn call(&self, args: ToolArgs) -> Result<Vec<Content>, ToolError> {
        (self.0)(args).await
    }
}

/// A named, described, schema-typed async function.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Build a tool from an async closure.
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        f: F,
    ) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Content>, ToolError>> + Send + 'static,
    {
        Self::new(name, description, input_schema, FnHandler(f))
    }

    pub async fn call(&self, args: ToolArgs) -> Result<Vec<Content>, ToolError> {
        self.handler.call(args).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Tools by name. Registration is explicit and names are unique.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Tool) -> Result<(), ToolError> {
        if self.tools.contains_key(&tool.name) {
            return Err(ToolError::Duplicate(tool.name));
        }
        tracing::debug!(tool = %tool.name, "registered tool");
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// All tools, ordered by name.
    pub fn list(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    pub async fn call(&self, name: &str, args: ToolArgs) -> Result<Vec<Content>, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(args).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Built-in `echo` tool: returns its `message` argument (or `text`).
pub fn echo_tool() -> Tool {
    Tool::from_fn(
        "echo",
        "Echo a message",
        json!({
            "type": "object",
            "required": ["message"],
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to echo"
                }
            }
        }),
        |args: ToolArgs| async move {
            let Some(message) = args.get("message").or_else(|| args.get("text")) else {
                return Err(ToolError::InvalidArguments("missing `message` argument".into()));
            };
            let text = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Ok(vec![Content::text(text)])
        },
    )
}
