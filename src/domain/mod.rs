use serde_json::Value;
use std::collections::HashMap;

pub mod error;
pub mod mock;
pub mod operation;
pub mod schema;

pub use error::MockError;
pub use mock::{
    IncomingRequest, MockConfig, MockInput, MockedResponse, NegotiatedHeader, NegotiationOutcome,
    Severity, ValidationResult, Violation,
};
pub use operation::{
    ExternalExample, HttpContent, HttpEncoding, HttpExample, HttpOperation, HttpParam,
    HttpRequestBody, HttpRequestShape, HttpResponse, InlineExample,
};
pub use schema::{SchemaKind, SchemaNode, SchemaType, TypeDecl};

/// Chooses which declared response variant answers a request.
pub trait NegotiatorPort: Send + Sync {
    fn negotiate_for_valid_request(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        config: &MockConfig,
    ) -> Result<NegotiationOutcome, MockError>;

    fn negotiate_for_invalid_request(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        violations: &[Violation],
    ) -> Result<NegotiationOutcome, MockError>;
}

/// Turns a schema into a concrete value.
pub trait ExampleGeneratorPort: Send + Sync {
    /// May use randomized leaf values.
    fn generate(&self, schema: &SchemaNode) -> Result<Value, MockError>;

    /// Deterministic: the same schema always yields the same value.
    fn generate_static(&self, schema: &SchemaNode) -> Result<Value, MockError>;
}

/// Checks an incoming request against the operation's declared request shape.
pub trait RequestValidatorPort: Send + Sync {
    fn validate(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        path_params: &HashMap<String, String>,
    ) -> ValidationResult;
}
