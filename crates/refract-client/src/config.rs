//! Engine connection and launch configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed defaults for the engine connection.
pub struct NetworkDefaults;

impl NetworkDefaults {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8752;
    pub const DEFAULT_PROGRAM: &'static str = "refract-server";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// How to invoke the engine binary.
///
/// Either a single executable name, or an argv list for engines run
/// through an interpreter (e.g. `["python", "-m", "refract_server"]`).
/// The string form is used as one token, never shell-split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramSpec {
    Exec(String),
    Argv(Vec<String>),
}

impl ProgramSpec {
    /// Split into the program to spawn and its leading arguments.
    ///
    /// Returns `None` for an empty argv list.
    pub fn split(&self) -> Option<(&str, &[String])> {
        match self {
            ProgramSpec::Exec(program) => Some((program, &[])),
            ProgramSpec::Argv(argv) => {
                let (program, rest) = argv.split_first()?;
                Some((program, rest))
            }
        }
    }

    /// Human-readable form for error messages.
    pub fn display(&self) -> String {
        match self {
            ProgramSpec::Exec(program) => program.clone(),
            ProgramSpec::Argv(argv) => argv.join(" "),
        }
    }
}

impl Default for ProgramSpec {
    fn default() -> Self {
        ProgramSpec::Exec(NetworkDefaults::DEFAULT_PROGRAM.to_string())
    }
}

/// Recognized configuration options for one engine binding.
///
/// Deserializable so editors can load this block from their own
/// config files; all fields default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine host; requests target `http://{host}:{port}/`.
    pub host: String,
    pub port: u16,
    /// Command line used to start the engine process.
    pub server_program: ProgramSpec,
    /// Gates buffer reconciliation after mutating commands.
    pub auto_revert: bool,
    /// Per-request transport deadline, in seconds.
    pub request_timeout_secs: u64,
    /// Where to append the engine's stdout/stderr. `None` discards
    /// engine output.
    pub log_file: Option<PathBuf>,
}

impl EngineConfig {
    /// The engine's root URL.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: NetworkDefaults::DEFAULT_HOST.to_string(),
            port: NetworkDefaults::DEFAULT_PORT,
            server_program: ProgramSpec::default(),
            auto_revert: false,
            request_timeout_secs: NetworkDefaults::REQUEST_TIMEOUT.as_secs(),
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, NetworkDefaults::DEFAULT_PORT);
        assert!(!config.auto_revert);
        assert_eq!(config.request_timeout(), NetworkDefaults::REQUEST_TIMEOUT);
        assert_eq!(
            config.server_program,
            ProgramSpec::Exec("refract-server".into())
        );
    }

    #[test]
    fn test_base_url() {
        let config = EngineConfig {
            host: "localhost".into(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://localhost:9000/");
    }

    #[test]
    fn test_program_spec_accepts_string_or_list() {
        let exec: ProgramSpec = serde_json::from_str(r#""refract-server""#).unwrap();
        assert_eq!(exec, ProgramSpec::Exec("refract-server".into()));

        let argv: ProgramSpec =
            serde_json::from_str(r#"["python", "-m", "refract_server"]"#).unwrap();
        assert_eq!(
            argv.split(),
            Some(("python", &["-m".to_string(), "refract_server".to_string()][..]))
        );
    }

    #[test]
    fn test_program_spec_empty_argv_splits_to_none() {
        assert!(ProgramSpec::Argv(vec![]).split().is_none());
    }

    #[test]
    fn test_config_deserializes_partial_block() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"port": 9100, "auto_revert": true}"#).unwrap();
        assert_eq!(config.port, 9100);
        assert!(config.auto_revert);
        assert_eq!(config.host, "127.0.0.1");
    }
}
