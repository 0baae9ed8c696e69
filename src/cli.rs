use clap::Parser;
use std::path::PathBuf;

/// HTTP API mock server driven by declared operations, examples and schemas
#[derive(Parser, Debug, Clone)]
#[command(name = "themis", version, about, long_about = None)]
pub struct Cli {
    /// Path to an operations document (JSON, YAML or TOML)
    #[arg(env = "THEMIS_SPEC")]
    pub spec: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, env = "THEMIS_CONFIG", default_value = "themis.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "THEMIS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, env = "THEMIS_PORT")]
    pub port: Option<u16>,

    /// Generate bodies from schemas instead of returning declared examples
    #[arg(short, long, env = "THEMIS_DYNAMIC", num_args = 0..=1, default_missing_value = "true")]
    pub dynamic: Option<bool>,

    /// Add CORS headers to mocked responses and answer preflight requests
    #[arg(long, env = "THEMIS_CORS", num_args = 0..=1, default_missing_value = "true")]
    pub cors: Option<bool>,

    /// Validate incoming requests against the declared request shape
    #[arg(long, env = "THEMIS_VALIDATE_REQUEST", num_args = 0..=1, default_missing_value = "true")]
    pub validate_request: Option<bool>,

    /// Validate mocked bodies against the negotiated schema
    #[arg(long, env = "THEMIS_VALIDATE_RESPONSE", num_args = 0..=1, default_missing_value = "true")]
    pub validate_response: Option<bool>,

    /// Reload operations when the spec file or config/operations changes
    #[arg(short, long, env = "THEMIS_WATCH")]
    pub watch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["themis"]);
        assert_eq!(cli.config, PathBuf::from("themis.toml"));
        assert!(cli.spec.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.dynamic.is_none());
        assert!(!cli.watch);
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "themis",
            "petstore.yaml",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--dynamic",
            "--cors",
            "false",
        ]);
        assert_eq!(cli.spec, Some(PathBuf::from("petstore.yaml")));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.dynamic, Some(true));
        assert_eq!(cli.cors, Some(false));
    }
}
