use crate::adapters::media_type;
use crate::domain::{
    HttpContent, HttpExample, HttpOperation, HttpResponse, IncomingRequest, MockConfig, MockError,
    NegotiatedHeader, NegotiationOutcome, NegotiatorPort, Violation,
};
use tracing::debug;

/// Media type reported for responses that declare no content.
pub const NO_CONTENT_MEDIA_TYPE: &str = "text/plain";

/// Client-error codes tried, in order, for requests that failed validation.
const INVALID_REQUEST_CODES: [&str; 2] = ["422", "400"];

/// How the body source is picked from the negotiated content.
#[derive(Debug, Clone, Copy)]
enum ExamplePreference<'c> {
    Key(&'c str),
    Dynamic,
    FirstDeclared,
}

/// Default negotiator over declared responses, contents and examples.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpNegotiator;

impl HttpNegotiator {
    pub fn new() -> Self {
        Self
    }

    fn outcome(
        operation: &HttpOperation,
        response: &HttpResponse,
        request: &IncomingRequest,
        preference: ExamplePreference<'_>,
    ) -> Result<NegotiationOutcome, MockError> {
        let headers = negotiate_headers(response);

        let content = if response.contents.is_empty() {
            None
        } else {
            let accept = request.header("accept");
            Some(media_type::find_content(accept, &response.contents).unwrap_or_else(|| {
                debug!(
                    "No content of '{}' response matches Accept {:?}, using the first declared",
                    response.code, accept
                );
                &response.contents[0]
            }))
        };

        let Some(content) = content else {
            debug!(
                "Operation '{}' response '{}' declares no content, body is empty",
                operation.id, response.code
            );
            let mut outcome = NegotiationOutcome::empty(response.code.clone(), NO_CONTENT_MEDIA_TYPE);
            outcome.headers = headers;
            return Ok(outcome);
        };

        let mut outcome = NegotiationOutcome::empty(response.code.clone(), content.media_type.clone());
        outcome.headers = headers;
        outcome.schema = content.schema.clone();
        outcome.body_example = select_example(content, preference)?;
        Ok(outcome)
    }
}

impl NegotiatorPort for HttpNegotiator {
    fn negotiate_for_valid_request(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        config: &MockConfig,
    ) -> Result<NegotiationOutcome, MockError> {
        let response = match config.code.as_deref() {
            Some(code) => operation
                .responses
                .iter()
                .find(|response| response.code.eq_ignore_ascii_case(code))
                .ok_or_else(|| MockError::StatusCodeNotFound {
                    operation: operation.id.clone(),
                    code: code.to_string(),
                })?,
            None => default_response(operation)?,
        };

        let preference = match (config.example_key.as_deref(), config.dynamic) {
            (Some(key), _) => ExamplePreference::Key(key),
            (None, true) => ExamplePreference::Dynamic,
            (None, false) => ExamplePreference::FirstDeclared,
        };

        debug!(
            "Negotiated response '{}' for operation '{}' ({:?})",
            response.code, operation.id, preference
        );
        Self::outcome(operation, response, request, preference)
    }

    fn negotiate_for_invalid_request(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        violations: &[Violation],
    ) -> Result<NegotiationOutcome, MockError> {
        let response = match client_error_response(operation) {
            Some(response) => response,
            None => default_response(operation)?,
        };

        debug!(
            "Request violates {} constraint(s), negotiated response '{}' for operation '{}'",
            violations.len(),
            response.code,
            operation.id
        );
        Self::outcome(operation, response, request, ExamplePreference::FirstDeclared)
    }
}

/// Lowest numeric 2xx, else the first declared response.
fn default_response(operation: &HttpOperation) -> Result<&HttpResponse, MockError> {
    let lowest_success = operation
        .responses
        .iter()
        .filter_map(|response| response.numeric_code().map(|code| (code, response)))
        .filter(|(code, _)| (200..300).contains(code))
        .min_by_key(|(code, _)| *code)
        .map(|(_, response)| response);

    lowest_success
        .or_else(|| operation.responses.first())
        .ok_or_else(|| MockError::NoResponseDefined {
            operation: operation.id.clone(),
        })
}

/// `422`, else `400`, else the lowest numeric 4xx.
fn client_error_response(operation: &HttpOperation) -> Option<&HttpResponse> {
    INVALID_REQUEST_CODES
        .iter()
        .find_map(|code| operation.responses.iter().find(|response| response.code == *code))
        .or_else(|| {
            operation
                .responses
                .iter()
                .filter_map(|response| response.numeric_code().map(|code| (code, response)))
                .filter(|(code, _)| (400..500).contains(code))
                .min_by_key(|(code, _)| *code)
                .map(|(_, response)| response)
        })
}

fn select_example(
    content: &HttpContent,
    preference: ExamplePreference<'_>,
) -> Result<Option<HttpExample>, MockError> {
    match preference {
        ExamplePreference::Key(key) => content
            .find_example(key)
            .cloned()
            .map(Some)
            .ok_or_else(|| MockError::ExampleKeyNotFound { key: key.to_string() }),
        ExamplePreference::Dynamic => Ok(None),
        ExamplePreference::FirstDeclared => Ok(content.examples.first().cloned()),
    }
}

/// Each header resolves to its first example, else its schema. Headers with
/// neither cannot be materialized and are left out.
fn negotiate_headers(response: &HttpResponse) -> Vec<NegotiatedHeader> {
    response
        .headers
        .iter()
        .filter_map(|header| {
            let example = header.examples.first().cloned();
            if example.is_none() && header.schema.is_none() {
                debug!("Header '{}' declares neither example nor schema, skipping", header.name);
                return None;
            }
            Some(NegotiatedHeader {
                name: header.name.clone(),
                example,
                schema: header.schema.clone(),
            })
        })
        .collect()
}
