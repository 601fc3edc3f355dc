//! Governance runtime configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! environment variables. Directory paths not set explicitly are derived
//! from `workspace_root`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

pub const DEFAULT_WORKSPACE: &str = "/workspace";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 3001;

/// Resolved configuration.
///
/// Custom `Debug` redacts `openai_api_key`.
#[derive(Clone)]
pub struct GovernanceConfig {
    pub workspace_root: PathBuf,
    pub human_input_dir: PathBuf,
    pub decision_pack_dir: PathBuf,
    pub ledger_path: PathBuf,
    /// External generation is only attempted when this is set.
    pub llm_enabled: bool,
    pub openai_model: String,
    pub openai_api_key: Option<Zeroizing<String>>,
    pub openai_base_url: String,
    pub generation_timeout_secs: u64,
    pub port: u16,
}

impl std::fmt::Debug for GovernanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceConfig")
            .field("workspace_root", &self.workspace_root)
            .field("human_input_dir", &self.human_input_dir)
            .field("decision_pack_dir", &self.decision_pack_dir)
            .field("ledger_path", &self.ledger_path)
            .field("llm_enabled", &self.llm_enabled)
            .field("openai_model", &self.openai_model)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("port", &self.port)
            .finish()
    }
}

/// YAML file shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    workspace_root: Option<PathBuf>,
    human_input_dir: Option<PathBuf>,
    decision_pack_dir: Option<PathBuf>,
    ledger_path: Option<PathBuf>,
    llm_enabled: Option<bool>,
    openai_model: Option<String>,
    openai_base_url: Option<String>,
    generation_timeout_secs: Option<u64>,
    port: Option<u16>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("OPENAI_API_KEY is required when LLM ingestion is enabled")]
    MissingApiKey,
}

impl GovernanceConfig {
    /// Defaults rooted at `workspace_root`.
    pub fn with_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        let root = workspace_root.into();
        Self {
            human_input_dir: root.join("artefacts").join("human-input"),
            decision_pack_dir: root.join("artefacts").join("decision-packs"),
            ledger_path: root.join("ledger").join("ledger.jsonl"),
            workspace_root: root,
            llm_enabled: false,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            port: DEFAULT_PORT,
        }
    }

    /// Load from an optional YAML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => read_file(p)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let root = env("DIIAC_WORKSPACE")
            .map(PathBuf::from)
            .or(file.workspace_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));
        let mut cfg = Self::with_workspace(root);

        if let Some(dir) = file.human_input_dir {
            cfg.human_input_dir = dir;
        }
        if let Some(dir) = file.decision_pack_dir {
            cfg.decision_pack_dir = dir;
        }
        if let Some(path) = file.ledger_path {
            cfg.ledger_path = path;
        }
        if let Some(enabled) = file.llm_enabled {
            cfg.llm_enabled = enabled;
        }
        if let Some(model) = file.openai_model {
            cfg.openai_model = model;
        }
        if let Some(url) = file.openai_base_url {
            cfg.openai_base_url = parse_url("openai_base_url", &url)?;
        }
        if let Some(secs) = file.generation_timeout_secs {
            cfg.generation_timeout_secs = secs;
        }
        if let Some(port) = file.port {
            cfg.port = port;
        }

        // Only the literal "true" enables ingestion.
        if let Some(flag) = env("LLM_INGESTION_ENABLED") {
            cfg.llm_enabled = flag == "true";
        }
        if let Some(model) = env("OPENAI_MODEL") {
            cfg.openai_model = model;
        }
        if let Some(key) = env("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            cfg.openai_api_key = Some(Zeroizing::new(key));
        }
        if let Some(url) = env("OPENAI_BASE_URL") {
            cfg.openai_base_url = parse_url("OPENAI_BASE_URL", &url)?;
        }
        if let Some(raw) = env("DIIAC_GENERATION_TIMEOUT") {
            cfg.generation_timeout_secs = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DIIAC_GENERATION_TIMEOUT", raw))?;
        }
        if let Some(raw) = env("PORT") {
            cfg.port = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?;
        }

        if cfg.generation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "generation_timeout_secs",
                "0".to_string(),
            ));
        }
        if cfg.llm_enabled && cfg.openai_api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(cfg)
    }

    pub fn generation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.generation_timeout_secs)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    Url::parse(raw)
        .map(|_| raw.trim_end_matches('/').to_string())
        .map_err(|e| ConfigError::InvalidValue(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_derive_paths_from_workspace() {
        let cfg = GovernanceConfig::resolve(FileConfig::default(), env_of(&[])).unwrap();
        assert_eq!(cfg.workspace_root, PathBuf::from("/workspace"));
        assert_eq!(
            cfg.ledger_path,
            PathBuf::from("/workspace/ledger/ledger.jsonl")
        );
        assert_eq!(
            cfg.human_input_dir,
            PathBuf::from("/workspace/artefacts/human-input")
        );
        assert!(!cfg.llm_enabled);
        assert_eq!(cfg.openai_model, "gpt-4o-mini");
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.generation_timeout_secs, 60);
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig =
            serde_yaml::from_str("workspace_root: /srv/a\nport: 4000\nopenai_model: m1\n").unwrap();
        let cfg = GovernanceConfig::resolve(
            file,
            env_of(&[("DIIAC_WORKSPACE", "/srv/b"), ("OPENAI_MODEL", "m2")]),
        )
        .unwrap();
        assert_eq!(cfg.workspace_root, PathBuf::from("/srv/b"));
        assert_eq!(cfg.decision_pack_dir, PathBuf::from("/srv/b/artefacts/decision-packs"));
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.openai_model, "m2");
    }

    #[test]
    fn only_literal_true_enables_ingestion() {
        let cfg = GovernanceConfig::resolve(
            FileConfig::default(),
            env_of(&[("LLM_INGESTION_ENABLED", "TRUE"), ("OPENAI_API_KEY", "k")]),
        )
        .unwrap();
        assert!(!cfg.llm_enabled);
    }

    #[test]
    fn enabled_ingestion_requires_key() {
        let err = GovernanceConfig::resolve(
            FileConfig::default(),
            env_of(&[("LLM_INGESTION_ENABLED", "true")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn invalid_numbers_rejected() {
        let err = GovernanceConfig::resolve(FileConfig::default(), env_of(&[("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("PORT", _)));
        let err = GovernanceConfig::resolve(
            FileConfig::default(),
            env_of(&[("DIIAC_GENERATION_TIMEOUT", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }

    #[test]
    fn base_url_validated_and_trimmed() {
        let cfg = GovernanceConfig::resolve(
            FileConfig::default(),
            env_of(&[("OPENAI_BASE_URL", "http://127.0.0.1:9000/v1/")]),
        )
        .unwrap();
        assert_eq!(cfg.openai_base_url, "http://127.0.0.1:9000/v1");
        assert!(GovernanceConfig::resolve(
            FileConfig::default(),
            env_of(&[("OPENAI_BASE_URL", "not a url")]),
        )
        .is_err());
    }

    #[test]
    fn unknown_yaml_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diiac.yaml");
        std::fs::write(&path, "ledger_pth: /x\n").unwrap();
        assert!(matches!(
            GovernanceConfig::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut cfg = GovernanceConfig::with_workspace("/w");
        cfg.openai_api_key = Some(Zeroizing::new("sk-secret".to_string()));
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-secret"));
    }
}
