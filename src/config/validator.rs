use std::collections::HashMap;
use thiserror::Error;

use crate::config::{ServerSettings, Settings};
use crate::domain::{HttpExample, HttpOperation};

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_operations(&settings.operations) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Structural checks only. Operations without responses are accepted here
    /// and reported per request instead.
    pub fn validate_operations(operations: &[HttpOperation]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_ids = HashMap::new();
        let mut seen_routes = HashMap::new();

        for (idx, operation) in operations.iter().enumerate() {
            if operation.id.is_empty() {
                errors.push(ValidationError::MissingField(format!("operations[{}].id", idx)));
            } else if let Some(prev_idx) = seen_ids.insert(operation.id.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Operation id '{}' appears at indices {} and {}",
                    operation.id, prev_idx, idx
                )));
            }

            let method = operation.method.to_ascii_lowercase();
            if !METHODS.contains(&method.as_str()) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("operations[{}].method", idx),
                    reason: format!("Unsupported HTTP method '{}'", operation.method),
                });
            }

            if !operation.path.starts_with('/') {
                errors.push(ValidationError::InvalidValue {
                    field: format!("operations[{}].path", idx),
                    reason: "Path must start with '/'".to_string(),
                });
            }

            let route = format!("{} {}", method, route_shape(&operation.path));
            if let Some(prev_idx) = seen_routes.insert(route.clone(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Route '{}' appears at indices {} and {}",
                    route, prev_idx, idx
                )));
            }

            for (r_idx, response) in operation.responses.iter().enumerate() {
                if !is_valid_code(&response.code) {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("operations[{}].responses[{}].code", idx, r_idx),
                        reason: format!("'{}' is not a status code, range or 'default'", response.code),
                    });
                }

                for (c_idx, content) in response.contents.iter().enumerate() {
                    if content.media_type.is_empty() {
                        errors.push(ValidationError::MissingField(format!(
                            "operations[{}].responses[{}].contents[{}].mediaType",
                            idx, r_idx, c_idx
                        )));
                    }
                    for example in &content.examples {
                        if let HttpExample::External(external) = example {
                            if external.external_value.is_empty() {
                                errors.push(ValidationError::MissingField(format!(
                                    "operations[{}].responses[{}].contents[{}] example '{}' externalValue",
                                    idx, r_idx, c_idx, external.key
                                )));
                            }
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// `/pets/{id}` and `/pets/{petId}/` match the same requests, so both become `/pets/{}`.
fn route_shape(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}

fn is_valid_code(code: &str) -> bool {
    if code.eq_ignore_ascii_case("default") {
        return true;
    }
    let bytes = code.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && ((bytes[1].is_ascii_digit() && bytes[2].is_ascii_digit())
            || code[1..].eq_ignore_ascii_case("xx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockSettings;
    use crate::domain::HttpResponse;

    fn operation(id: &str, method: &str, path: &str, codes: &[&str]) -> HttpOperation {
        HttpOperation {
            id: id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            request: Default::default(),
            responses: codes
                .iter()
                .map(|code| HttpResponse {
                    code: code.to_string(),
                    headers: vec![],
                    contents: vec![],
                })
                .collect(),
        }
    }

    fn settings(operations: Vec<HttpOperation>) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 4010,
            },
            mock: MockSettings::default(),
            spec: None,
            operations,
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = settings(vec![
            operation("listPets", "get", "/pets", &["200", "4XX", "default"]),
            operation("createPet", "POST", "/pets", &["201"]),
        ]);
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut settings = settings(vec![]);
        settings.server.port = 0;
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("server.port"));
    }

    #[test]
    fn test_duplicate_operations() {
        let settings = settings(vec![
            operation("listPets", "get", "/pets", &["200"]),
            operation("listPets", "get", "/pets", &["200"]),
        ]);
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_routes_differing_only_in_parameter_names() {
        let settings = settings(vec![
            operation("getPet", "get", "/pets/{id}", &["200"]),
            operation("showPet", "GET", "/pets/{petId}/", &["200"]),
            operation("deletePet", "delete", "/pets/{petId}", &["204"]),
        ]);
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::Duplicate(msg) if msg.contains("/pets/{}")));
    }

    #[test]
    fn test_route_shape() {
        assert_eq!(route_shape("/pets/{petId}/toys/{toyId}"), "/pets/{}/toys/{}");
        assert_eq!(route_shape("/pets/mine/"), "/pets/mine");
        assert_eq!(route_shape("/"), "/");
    }

    #[test]
    fn test_invalid_method_path_and_code() {
        let settings = settings(vec![operation("bad", "fetch", "pets", &["20"])]);
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_code_shapes() {
        assert!(is_valid_code("200"));
        assert!(is_valid_code("5xx"));
        assert!(is_valid_code("default"));
        assert!(!is_valid_code("600"));
        assert!(!is_valid_code("2X0"));
    }
}
