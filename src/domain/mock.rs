use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operation::HttpExample;
use super::schema::SchemaNode;

/// Per-call mocking preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockConfig {
    /// Synthesize from the schema even when literal examples exist.
    #[serde(default)]
    pub dynamic: bool,
    /// Return this named example.
    #[serde(default)]
    pub example_key: Option<String>,
    /// Return the response declared with this code.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub cors: bool,
    #[serde(default = "default_true")]
    pub validate_request: bool,
    #[serde(default = "default_true")]
    pub validate_response: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dynamic: false,
            example_key: None,
            code: None,
            cors: false,
            validate_request: true,
            validate_response: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single request (or response) validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Where the problem was found, e.g. `query.limit` or `body/name`.
    pub path: String,
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    pub fn error(path: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Violations found on the incoming request. Empty means valid.
    #[serde(default)]
    pub input: Vec<Violation>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.input.is_empty()
    }
}

/// The request as handed over by the transport layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Header names are matched case-insensitively.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Request data bundled with the validator's verdict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockInput {
    pub request: IncomingRequest,
    pub validations: ValidationResult,
}

/// A response header chosen by negotiation, still to be materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedHeader {
    pub name: String,
    pub example: Option<HttpExample>,
    pub schema: Option<SchemaNode>,
}

/// The negotiator's decision. When `body_example` is set it is the body
/// source; `schema` then only backs external examples and dynamic mode.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationOutcome {
    pub code: String,
    pub media_type: String,
    pub headers: Vec<NegotiatedHeader>,
    pub body_example: Option<HttpExample>,
    pub schema: Option<SchemaNode>,
}

impl NegotiationOutcome {
    pub fn empty(code: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            media_type: media_type.into(),
            headers: Vec::new(),
            body_example: None,
            schema: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockedResponse {
    pub status_code: u16,
    pub media_type: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl MockedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
