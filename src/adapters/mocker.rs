use crate::adapters::example_generator::SchemaExampleGenerator;
use crate::adapters::negotiator::HttpNegotiator;
use crate::domain::{
    ExampleGeneratorPort, HttpExample, HttpOperation, MockConfig, MockError, MockInput,
    MockedResponse, NegotiatorPort, SchemaNode,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds mocked responses: negotiation first, then body and header
/// synthesis.
#[derive(Clone)]
pub struct HttpMocker {
    negotiator: Arc<dyn NegotiatorPort>,
    generator: Arc<dyn ExampleGeneratorPort>,
}

impl Default for HttpMocker {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMocker {
    pub fn new() -> Self {
        Self::with_ports(
            Arc::new(HttpNegotiator::new()),
            Arc::new(SchemaExampleGenerator::new()),
        )
    }

    pub fn with_ports(
        negotiator: Arc<dyn NegotiatorPort>,
        generator: Arc<dyn ExampleGeneratorPort>,
    ) -> Self {
        Self {
            negotiator,
            generator,
        }
    }

    /// Mock `resource` for `input`. A missing `config` means
    /// [`MockConfig::default`].
    pub fn mock(
        &self,
        resource: &HttpOperation,
        input: &MockInput,
        config: Option<&MockConfig>,
    ) -> Result<MockedResponse, MockError> {
        let defaults = MockConfig::default();
        let config = config.unwrap_or(&defaults);
        let valid = input.validations.is_valid();

        let outcome = if valid {
            self.negotiator
                .negotiate_for_valid_request(resource, &input.request, config)?
        } else {
            self.negotiator.negotiate_for_invalid_request(
                resource,
                &input.request,
                &input.validations.input,
            )?
        };

        // Config intent only applies to requests that passed validation.
        let dynamic = valid && config.dynamic;

        let body = self.resolve(outcome.body_example.as_ref(), outcome.schema.as_ref(), dynamic)?;

        let mut headers = Vec::with_capacity(outcome.headers.len());
        for header in &outcome.headers {
            match self.resolve(header.example.as_ref(), header.schema.as_ref(), dynamic)? {
                Some(value) => headers.push((header.name.clone(), header_value(value))),
                None => debug!("Header '{}' resolved to no value, skipping", header.name),
            }
        }

        if config.cors {
            headers.extend(cors_headers(input.request.header("origin")));
        }

        let status_code = status_code(&outcome.code, valid);
        debug!(
            "Mocked operation '{}' with status {} ({})",
            resource.id, status_code, outcome.media_type
        );

        Ok(MockedResponse {
            status_code,
            media_type: outcome.media_type,
            headers,
            body,
        })
    }

    fn resolve(
        &self,
        example: Option<&HttpExample>,
        schema: Option<&SchemaNode>,
        dynamic: bool,
    ) -> Result<Option<Value>, MockError> {
        match (example, schema) {
            (None, None) => Ok(None),
            (Some(HttpExample::Inline(inline)), Some(schema)) if dynamic => {
                debug!("Dynamic mode ignores example '{}'", inline.key);
                self.generator.generate(schema).map(Some)
            }
            (Some(HttpExample::Inline(inline)), _) => Ok(Some(inline.value.clone())),
            (Some(HttpExample::External(external)), Some(schema)) => {
                debug!(
                    "Example '{}' is external ({}), generating from schema",
                    external.key, external.external_value
                );
                self.generator.generate(schema).map(Some)
            }
            (Some(HttpExample::External(external)), None) => {
                warn!(
                    "Example '{}' is external and no schema is declared, body is empty",
                    external.key
                );
                Ok(None)
            }
            (None, Some(schema)) if dynamic => self.generator.generate(schema).map(Some),
            (None, Some(schema)) => self.generator.generate_static(schema).map(Some),
        }
    }
}

/// Fixed CORS header set appended when CORS is enabled.
pub fn cors_headers(origin: Option<&str>) -> Vec<(String, String)> {
    vec![
        (
            "access-control-allow-origin".to_string(),
            origin.unwrap_or("*").to_string(),
        ),
        ("access-control-allow-headers".to_string(), "*".to_string()),
        ("access-control-allow-credentials".to_string(), "true".to_string()),
        ("access-control-expose-headers".to_string(), "*".to_string()),
    ]
}

/// `"404"` → 404, `"4XX"` → 400, `"default"` → 200 for valid requests and 422
/// for invalid ones.
pub fn status_code(code: &str, valid: bool) -> u16 {
    let fallback = if valid { 200 } else { 422 };
    if let Ok(numeric) = code.parse::<u16>() {
        return numeric;
    }

    let mut chars = code.chars();
    match (chars.next(), chars.as_str()) {
        (Some(class @ '1'..='5'), rest) if rest.eq_ignore_ascii_case("xx") => {
            class.to_digit(10).map(|d| d as u16 * 100).unwrap_or(fallback)
        }
        _ => fallback,
    }
}

fn header_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
