//! Wire types for the line-delimited JSON tool protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// URI of the resource holding the exported index.
pub const INDEX_URI: &str = "wikilinks://index";

/// URI of the resource holding index statistics.
pub const STATS_URI: &str = "wikilinks://stats";

/// One incoming request: either a tool call or a resource read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    Tool(ToolCall),
    Resource(ResourceRead),
}

/// `{"id"?, "name": ..., "arguments"?: {...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// `{"id"?, "uri": ...}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceRead {
    #[serde(default)]
    pub id: Option<Value>,
    pub uri: String,
}

/// A block of text in a tool response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// What a tool returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Text of the first content block.
    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// The body of a resource read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

impl ResourceContents {
    pub fn json(uri: &str, text: String) -> Self {
        Self {
            uri: uri.to_string(),
            mime_type: "application/json",
            text,
        }
    }
}

/// A response line, echoing the request id when there was one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub body: ReplyBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Tool(ToolResponse),
    Resource { contents: Vec<ResourceContents> },
    Error { error: String },
}

impl Reply {
    pub fn to_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
