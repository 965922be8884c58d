use serde::{Deserialize, Serialize};

/// Part content, discriminated by the literal `kind` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PartContent {
    /// Plain text
    Text { text: String },
    /// Inline bytes or a URI reference
    File { file: FileContent },
    /// Structured JSON object
    Data {
        data: serde_json::Map<String, serde_json::Value>,
    },
}

/// A2A Part - content unit for messages and artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(flatten)]
    pub content: PartContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Where a file part's payload lives. Exactly one of `bytes` or `uri`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileSource {
    /// Base64-encoded content
    Bytes { bytes: String },
    Uri { uri: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFileContent")]
pub struct FileContent {
    #[serde(flatten)]
    pub source: FileSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileContent {
    bytes: Option<String>,
    uri: Option<String>,
    mime_type: Option<String>,
    name: Option<String>,
}

impl TryFrom<RawFileContent> for FileContent {
    type Error = &'static str;

    fn try_from(raw: RawFileContent) -> Result<Self, Self::Error> {
        let source = match (raw.bytes, raw.uri) {
            (Some(bytes), None) => FileSource::Bytes { bytes },
            (None, Some(uri)) => FileSource::Uri { uri },
            (Some(_), Some(_)) => return Err("file carries both `bytes` and `uri`"),
            (None, None) => return Err("file needs one of `bytes` or `uri`"),
        };
        Ok(FileContent {
            source,
            mime_type: raw.mime_type,
            name: raw.name,
        })
    }
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: PartContent::Text { text: text.into() },
            metadata: None,
        }
    }

    pub fn data(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            content: PartContent::Data { data },
            metadata: None,
        }
    }

    pub fn file_uri(uri: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            content: PartContent::File {
                file: FileContent {
                    source: FileSource::Uri { uri: uri.into() },
                    mime_type,
                    name: None,
                },
            },
            metadata: None,
        }
    }

    /// The text payload, if this is a text part
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            PartContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Joins the text parts of `parts` with `separator`, skipping everything else.
pub fn join_text(parts: &[Part], separator: &str) -> String {
    parts
        .iter()
        .filter_map(Part::as_text)
        .collect::<Vec<_>>()
        .join(separator)
}
