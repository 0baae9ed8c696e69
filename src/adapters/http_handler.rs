use crate::adapters::media_type::is_json_like;
use crate::adapters::mocker::{cors_headers, HttpMocker};
use crate::adapters::request_validator::{schema_violations, SchemaRequestValidator};
use crate::adapters::router::OperationCatalog;
use crate::config::MockSettings;
use crate::domain::{
    HttpOperation, IncomingRequest, MockConfig, MockInput, MockedResponse, RequestValidatorPort,
    SchemaNode, ValidationResult,
};
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const PROBLEM_JSON: &str = "application/problem+json";
const VIOLATIONS_HEADER: &str = "sl-violations";
const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE,OPTIONS";

/// Shared state of the mock endpoint.
#[derive(Clone)]
pub struct MockServerState {
    pub catalog: Arc<RwLock<OperationCatalog>>,
    pub mocker: Arc<HttpMocker>,
    pub validator: Arc<dyn RequestValidatorPort>,
    pub settings: Arc<MockSettings>,
}

impl MockServerState {
    pub fn new(catalog: Arc<RwLock<OperationCatalog>>, settings: MockSettings) -> Self {
        Self {
            catalog,
            mocker: Arc::new(HttpMocker::new()),
            validator: Arc::new(SchemaRequestValidator::new()),
            settings: Arc::new(settings),
        }
    }
}

/// Fallback handler answering every request that is not a health check.
pub async fn handle_mock_request(
    State(state): State<MockServerState>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = incoming_request(&method, &uri, query, &headers, &body);

    if state.settings.cors && method == Method::OPTIONS && request.header("access-control-request-method").is_some() {
        return preflight(&request);
    }

    let (operation, path_params) = {
        let catalog = state.catalog.read().await;
        match catalog.route(&request.method, &request.path) {
            Ok(matched) => (matched.operation.clone(), matched.path_params),
            Err(e) => {
                info!("{} {} -> {}", method, request.path, e);
                return problem(e.status_code(), "Route not resolved", e.to_string());
            }
        }
    };

    let mut config = state.settings.to_mock_config();
    if let Some(prefer) = request.header("prefer") {
        apply_prefer(&mut config, prefer);
    }

    let validations = if config.validate_request {
        state.validator.validate(&operation, &request, &path_params)
    } else {
        ValidationResult::valid()
    };
    for violation in &validations.input {
        info!(
            "Request violation on '{}' at {}: {}",
            operation.id, violation.path, violation.message
        );
    }

    let input = MockInput {
        request,
        validations,
    };

    match state.mocker.mock(&operation, &input, Some(&config)) {
        Ok(mut mocked) => {
            if config.validate_response {
                report_response_violations(&operation, &mut mocked);
            }
            info!("{} {} -> {}", method, input.request.path, mocked.status_code);
            into_response(mocked)
        }
        Err(e) => {
            warn!("Failed to mock '{}': {}", operation.id, e);
            problem(e.status_code(), e.title(), e.to_string())
        }
    }
}

fn incoming_request(
    method: &Method,
    uri: &Uri,
    query: Vec<(String, String)>,
    headers: &HeaderMap,
    body: &Bytes,
) -> IncomingRequest {
    let headers: Vec<(String, String)> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let mut request = IncomingRequest {
        method: method.as_str().to_ascii_lowercase(),
        path: uri.path().to_string(),
        query,
        headers,
        body: None,
    };

    if !body.is_empty() {
        let json_body = request.header("content-type").is_some_and(is_json_like);
        let parsed = if json_body {
            serde_json::from_slice(body).ok()
        } else {
            None
        };
        request.body = Some(parsed.unwrap_or_else(|| Value::String(String::from_utf8_lossy(body).into_owned())));
    }
    request
}

/// Reads `Prefer: code=404, example=notFound, dynamic=true`.
fn apply_prefer(config: &mut MockConfig, prefer: &str) {
    for preference in prefer.split([',', ';']) {
        let Some((name, value)) = preference.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match name.trim().to_ascii_lowercase().as_str() {
            "code" => config.code = Some(value.to_string()),
            "example" => config.example_key = Some(value.to_string()),
            "dynamic" => config.dynamic = value.eq_ignore_ascii_case("true"),
            other => debug!("Ignoring unknown preference '{}'", other),
        }
    }
}

fn preflight(request: &IncomingRequest) -> Response {
    let mut headers = cors_headers(request.header("origin"));
    headers.push((
        "access-control-allow-methods".to_string(),
        ALLOWED_METHODS.to_string(),
    ));
    build_response(StatusCode::NO_CONTENT, headers, None, Vec::new())
}

/// Schema the mocked body is expected to conform to.
fn response_schema<'a>(operation: &'a HttpOperation, mocked: &MockedResponse) -> Option<&'a SchemaNode> {
    let status = mocked.status_code.to_string();
    let range = format!("{}xx", mocked.status_code / 100);
    let response = operation
        .responses
        .iter()
        .find(|r| r.code == status)
        .or_else(|| operation.responses.iter().find(|r| r.code.eq_ignore_ascii_case(&range)))
        .or_else(|| operation.responses.iter().find(|r| r.code == "default"))?;
    response
        .contents
        .iter()
        .find(|c| c.media_type == mocked.media_type)?
        .schema
        .as_ref()
}

fn report_response_violations(operation: &HttpOperation, mocked: &mut MockedResponse) {
    let (Some(schema), Some(body)) = (response_schema(operation, mocked), mocked.body.as_ref()) else {
        return;
    };

    let violations = schema_violations("body", schema, body);
    if violations.is_empty() {
        return;
    }
    for violation in &violations {
        warn!(
            "Mocked response of '{}' violates its schema at {}: {}",
            operation.id, violation.path, violation.message
        );
    }
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    mocked
        .headers
        .push((VIOLATIONS_HEADER.to_string(), json!(messages).to_string()));
}

fn into_response(mocked: MockedResponse) -> Response {
    let status = StatusCode::from_u16(mocked.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match &mocked.body {
        None => Vec::new(),
        Some(value) if is_json_like(&mocked.media_type) => serde_json::to_vec(value).unwrap_or_default(),
        Some(Value::String(text)) => text.clone().into_bytes(),
        Some(other) => other.to_string().into_bytes(),
    };
    let content_type = mocked.body.as_ref().map(|_| mocked.media_type.as_str());
    build_response(status, mocked.headers.clone(), content_type, body)
}

fn build_response(
    status: StatusCode,
    headers: Vec<(String, String)>,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Response {
    let mut builder = axum::http::Response::builder().status(status);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => builder = builder.header(name, value),
            _ => warn!("Dropping header '{}' with a value that is not valid in HTTP", name),
        }
    }

    builder.body(Body::from(body)).unwrap_or_else(|e| {
        warn!("Failed to build mocked response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn problem(status: u16, title: &str, detail: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "type": "about:blank",
        "title": title,
        "status": status.as_u16(),
        "detail": detail,
    });
    (status, [(header::CONTENT_TYPE, PROBLEM_JSON)], body.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_prefer() {
        let mut config = MockConfig::default();
        apply_prefer(&mut config, "code=404, example=\"not found\"; dynamic=true, wait=5");
        assert_eq!(config.code.as_deref(), Some("404"));
        assert_eq!(config.example_key.as_deref(), Some("not found"));
        assert!(config.dynamic);
    }

    #[test]
    fn test_incoming_request_parses_query_and_json_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let uri: Uri = "/pets?name=fluffy+cat&tag=a%26b&tag=c".parse().unwrap();
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        let body = Bytes::from_static(br#"{"name":"Rex"}"#);

        let request = incoming_request(&Method::POST, &uri, query, &headers, &body);
        assert_eq!(request.method, "post");
        assert_eq!(request.query_param("name"), Some("fluffy cat"));
        assert_eq!(request.query_param("tag"), Some("a&b"));
        assert_eq!(request.query.len(), 3);
        assert_eq!(request.query[2], ("tag".to_string(), "c".to_string()));
        assert_eq!(request.body, Some(json!({ "name": "Rex" })));
    }

    #[test]
    fn test_incoming_request_keeps_text_body() {
        let uri: Uri = "/notes".parse().unwrap();
        let body = Bytes::from_static(b"hello");
        let request = incoming_request(&Method::PUT, &uri, Vec::new(), &HeaderMap::new(), &body);
        assert_eq!(request.body, Some(json!("hello")));
    }
}
