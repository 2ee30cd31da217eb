use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logbook: LogbookConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl CoreConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("config.toml");
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::from_toml_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using CoreConfig::default().",
                path.display()
            );
            CoreConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str::<CoreConfig>(text)?)
    }

    fn resolve_paths(&mut self, root: &Path) {
        self.retrieval.index_path = absolutize(root, &self.retrieval.index_path);
        self.retrieval.docs_dir = absolutize(root, &self.retrieval.docs_dir);
        self.store.db_path = absolutize(root, &self.store.db_path);
        self.logbook.path = absolutize(root, &self.logbook.path);
        if let Some(p) = self.policy.rules_path.take() {
            self.policy.rules_path = Some(absolutize(root, &p));
        }
    }
}

/// Resolve the concierge root. Allow override via CONCIERGE_ROOT (tests/deployments).
pub fn concierge_root() -> PathBuf {
    std::env::var_os("CONCIERGE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".concierge"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "SystemConfig::default_name")]
    pub name: String,
    #[serde(default = "SystemConfig::default_version")]
    pub version: String,
}

impl SystemConfig {
    fn default_name() -> String {
        "Admissions Concierge".to_string()
    }

    fn default_version() -> String {
        "0.1.0".to_string()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "RetrievalConfig::default_top_k")]
    pub top_k: usize,
    #[serde(default = "RetrievalConfig::default_snippet_len")]
    pub snippet_len: usize,
    #[serde(default = "RetrievalConfig::default_max_features")]
    pub max_features: usize,
    #[serde(default = "RetrievalConfig::default_index_path")]
    pub index_path: PathBuf,
    #[serde(default = "RetrievalConfig::default_docs_dir")]
    pub docs_dir: PathBuf,
}

impl RetrievalConfig {
    fn default_top_k() -> usize {
        4
    }

    fn default_snippet_len() -> usize {
        280
    }

    fn default_max_features() -> usize {
        25_000
    }

    fn default_index_path() -> PathBuf {
        PathBuf::from("index/tfidf.json")
    }

    fn default_docs_dir() -> PathBuf {
        PathBuf::from("docs")
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            snippet_len: Self::default_snippet_len(),
            max_features: Self::default_max_features(),
            index_path: Self::default_index_path(),
            docs_dir: Self::default_docs_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "StoreConfig::default_recent_messages")]
    pub recent_messages: usize,
}

impl StoreConfig {
    fn default_db_path() -> PathBuf {
        PathBuf::from("cache/concierge.db")
    }

    fn default_recent_messages() -> usize {
        12
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: Self::default_db_path(),
            recent_messages: Self::default_recent_messages(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogbookConfig {
    #[serde(default = "LogbookConfig::default_path")]
    pub path: PathBuf,
    #[serde(default = "LogbookConfig::default_true")]
    pub enabled: bool,
    #[serde(default = "LogbookConfig::default_preview_len")]
    pub preview_len: usize,
}

impl LogbookConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("logbook")
    }

    fn default_true() -> bool {
        true
    }

    fn default_preview_len() -> usize {
        160
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            enabled: true,
            preview_len: Self::default_preview_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PolicyConfig {
    /// Optional TOML override for the escalation denylist and guardrail phrases.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "PipelineConfig::default_progress_footer")]
    pub append_progress_footer: bool,
}

impl PipelineConfig {
    fn default_progress_footer() -> bool {
        true
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            append_progress_footer: Self::default_progress_footer(),
        }
    }
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
