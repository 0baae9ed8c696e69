use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;
pub mod watcher;

use crate::cli::Cli;
use crate::domain::{HttpOperation, MockConfig};

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub mock: MockSettings,
    /// Operations document to load, relative to the configuration root
    #[serde(default)]
    pub spec: Option<PathBuf>,
    /// Operations loaded from `spec` and `config/operations/`
    #[serde(skip)]
    pub operations: Vec<HttpOperation>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Server-wide mocking defaults; per-request `Prefer` headers refine them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MockSettings {
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default = "default_true")]
    pub cors: bool,
    #[serde(default = "default_true")]
    pub validate_request: bool,
    #[serde(default = "default_true")]
    pub validate_response: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            dynamic: false,
            cors: true,
            validate_request: true,
            validate_response: true,
        }
    }
}

impl MockSettings {
    pub fn to_mock_config(&self) -> MockConfig {
        MockConfig {
            dynamic: self.dynamic,
            example_key: None,
            code: None,
            cors: self.cors,
            validate_request: self.validate_request,
            validate_response: self.validate_response,
        }
    }
}

/// Either a bare list of operations or a document with an `operations` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OperationsDocument {
    List(Vec<HttpOperation>),
    Wrapped { operations: Vec<HttpOperation> },
    Single(Box<HttpOperation>),
}

impl OperationsDocument {
    fn into_operations(self) -> Vec<HttpOperation> {
        match self {
            OperationsDocument::List(operations) => operations,
            OperationsDocument::Wrapped { operations } => operations,
            OperationsDocument::Single(operation) => vec![*operation],
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(".");

        let mut settings = Self::build(config_path.clone())?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.load_external_configs(root)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("themis");
        let mut settings = Self::build(config_path)?;

        settings.load_external_configs(root)?;
        settings.validate()?;
        Ok(settings)
    }

    fn build(config_path: PathBuf) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4010)?
            .build()?;
        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(spec) = &cli.spec {
            self.spec = Some(spec.clone());
        }
        if let Some(dynamic) = cli.dynamic {
            self.mock.dynamic = dynamic;
        }
        if let Some(cors) = cli.cors {
            self.mock.cors = cors;
        }
        if let Some(validate_request) = cli.validate_request {
            self.mock.validate_request = validate_request;
        }
        if let Some(validate_response) = cli.validate_response {
            self.mock.validate_response = validate_response;
        }
    }

    /// Paths whose changes should trigger a reload of the operations.
    pub fn watched_paths(&self, root: &str) -> Vec<String> {
        let mut paths = vec![format!("{}/config/operations", root)];
        if let Some(spec) = &self.spec {
            paths.push(Self::resolve(root, spec).to_string_lossy().into_owned());
        }
        paths
    }

    fn resolve(root: &str, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(root).join(path)
        }
    }

    fn load_external_configs(&mut self, root: &str) -> Result<(), anyhow::Error> {
        if let Some(spec) = self.spec.clone() {
            let path = Self::resolve(root, &spec);
            let operations = load_operations_file(&path)?;
            tracing::info!("Loaded {} operation(s) from {}", operations.len(), path.display());
            self.operations.extend(operations);
        }
        self.load_operations_from_dir(&format!("{}/config/operations", root))?;
        Ok(())
    }

    fn load_operations_from_dir(&mut self, path: &str) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", path);
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                        if matches!(ext, "json" | "yaml" | "yml" | "toml") {
                            let operations = load_operations_file(&path)?;
                            self.operations.extend(operations);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(())
    }
}

/// Reads an operations document; the format follows the file extension and
/// defaults to YAML (a superset of JSON).
pub fn load_operations_file(path: &Path) -> Result<Vec<HttpOperation>, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let document: OperationsDocument = match ext {
        "json" => serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("JSON parse error in {}: {}", path.display(), e))?,
        "toml" => toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("TOML parse error in {}: {}", path.display(), e))?,
        _ => serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("YAML parse error in {}: {}", path.display(), e))?,
    };
    Ok(document.into_operations())
}
