use crate::domain::HttpOperation;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No operation matches path '{0}'")]
    NoPathMatched(String),

    #[error("Path '{path}' does not support method '{method}'")]
    NoMethodMatched { method: String, path: String },
}

impl RouteError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoPathMatched(_) => 404,
            Self::NoMethodMatched { .. } => 405,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    fn parse(path: &str) -> Self {
        let segments = split_path(path)
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { segments }
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Literal(_)))
            .count()
    }

    fn matches(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if self.segments.len() != path.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(expected) if expected.as_str() == *actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if actual.is_empty() => return None,
                Segment::Param(name) => {
                    let decoded = urlencoding::decode(actual)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| actual.to_string());
                    params.insert(name.clone(), decoded);
                }
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

/// A matched operation together with its decoded path parameters.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub operation: &'a HttpOperation,
    pub path_params: HashMap<String, String>,
}

/// The loaded operations, indexed for routing.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    operations: Vec<HttpOperation>,
    templates: Vec<PathTemplate>,
}

impl OperationCatalog {
    pub fn new(operations: Vec<HttpOperation>) -> Self {
        let templates = operations
            .iter()
            .map(|operation| PathTemplate::parse(&operation.path))
            .collect();
        Self {
            operations,
            templates,
        }
    }

    pub fn operations(&self) -> &[HttpOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Finds the operation for `method` and `path`. Among matching templates
    /// the one with the most literal segments wins, then declaration order.
    pub fn route(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let segments: Vec<&str> = split_path(path).collect();

        let mut path_matched = false;
        let mut best: Option<(usize, usize, HashMap<String, String>)> = None;

        for (index, template) in self.templates.iter().enumerate() {
            let Some(params) = template.matches(&segments) else {
                continue;
            };
            path_matched = true;

            if !self.operations[index].method.eq_ignore_ascii_case(method) {
                continue;
            }

            let score = template.literal_count();
            if best.as_ref().map_or(true, |(best_score, _, _)| score > *best_score) {
                best = Some((score, index, params));
            }
        }

        match best {
            Some((_, index, path_params)) => Ok(RouteMatch {
                operation: &self.operations[index],
                path_params,
            }),
            None if path_matched => Err(RouteError::NoMethodMatched {
                method: method.to_string(),
                path: path.to_string(),
            }),
            None => Err(RouteError::NoPathMatched(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(id: &str, method: &str, path: &str) -> HttpOperation {
        HttpOperation {
            id: id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            request: Default::default(),
            responses: vec![],
        }
    }

    fn catalog() -> OperationCatalog {
        OperationCatalog::new(vec![
            operation("getPet", "get", "/pets/{petId}"),
            operation("getMine", "get", "/pets/mine"),
            operation("listPets", "get", "/pets"),
            operation("createPet", "post", "/pets"),
        ])
    }

    #[test]
    fn test_route_extracts_params() {
        let catalog = catalog();
        let matched = catalog.route("GET", "/pets/fluffy%20cat").unwrap();
        assert_eq!(matched.operation.id, "getPet");
        assert_eq!(matched.path_params.get("petId").unwrap(), "fluffy cat");
    }

    #[test]
    fn test_literal_beats_template() {
        let catalog = catalog();
        assert_eq!(catalog.route("get", "/pets/mine").unwrap().operation.id, "getMine");
    }

    #[test]
    fn test_method_dispatch() {
        let catalog = catalog();
        assert_eq!(catalog.route("post", "/pets/").unwrap().operation.id, "createPet");
        assert_eq!(catalog.route("get", "/pets").unwrap().operation.id, "listPets");
    }

    #[test]
    fn test_route_errors() {
        let catalog = catalog();
        let err = catalog.route("delete", "/pets").unwrap_err();
        assert_eq!(err.status_code(), 405);

        let err = catalog.route("get", "/owners").unwrap_err();
        assert_eq!(err, RouteError::NoPathMatched("/owners".to_string()));
    }
}
