use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::SchemaNode;

/// One API endpoint as produced by the operation loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpOperation {
    pub id: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub request: HttpRequestShape,
    /// Declaration order matters: the first response is the negotiation default.
    #[serde(default)]
    pub responses: Vec<HttpResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestShape {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<HttpParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<HttpParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HttpParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<HttpRequestBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub contents: Vec<HttpContent>,
}

/// A named parameter: path, query or header on the request side, and a
/// header descriptor on the response side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpParam {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<HttpExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// `"200"`, `"4XX"` or `"default"`.
    pub code: String,
    #[serde(default)]
    pub headers: Vec<HttpParam>,
    #[serde(default)]
    pub contents: Vec<HttpContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpContent {
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(default)]
    pub examples: Vec<HttpExample>,
    #[serde(default)]
    pub encodings: Vec<HttpEncoding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEncoding {
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// A declared example: either an inline literal or a reference to an external
/// resource that is never fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpExample {
    Inline(InlineExample),
    External(ExternalExample),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineExample {
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalExample {
    pub key: String,
    pub external_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl HttpExample {
    pub fn inline(key: impl Into<String>, value: Value) -> Self {
        HttpExample::Inline(InlineExample {
            key: key.into(),
            value,
            summary: None,
        })
    }

    pub fn external(key: impl Into<String>, external_value: impl Into<String>) -> Self {
        HttpExample::External(ExternalExample {
            key: key.into(),
            external_value: external_value.into(),
            summary: None,
        })
    }

    pub fn key(&self) -> &str {
        match self {
            HttpExample::Inline(example) => &example.key,
            HttpExample::External(example) => &example.key,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            HttpExample::Inline(example) => Some(&example.value),
            HttpExample::External(_) => None,
        }
    }
}

impl HttpContent {
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            schema: None,
            examples: Vec::new(),
            encodings: Vec::new(),
        }
    }

    pub fn find_example(&self, key: &str) -> Option<&HttpExample> {
        self.examples.iter().find(|example| example.key() == key)
    }
}

impl HttpResponse {
    /// Numeric status for an exact three-digit code; range codes (`4XX`) and
    /// `default` yield `None`.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.code.len() == 3 {
            self.code.parse().ok()
        } else {
            None
        }
    }
}
