use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::chunk::ChunkStrategy;
use crate::index::DEFAULT_TOP_K;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the vector index's on-disk state. Created if
    /// absent; must be stable across restarts for previously ingested
    /// entries to remain queryable.
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".docvec"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    pub strategy: ChunkStrategy,
    /// Minimum chunk size in characters (markdown strategy).
    pub min_chunk_size: usize,
    /// Maximum chunk size in characters (markdown strategy).
    pub max_chunk_size: usize,
    /// Window size in characters (window strategy).
    pub window_size: usize,
    /// Window overlap in characters (window strategy).
    pub window_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Markdown,
            min_chunk_size: 100,
            max_chunk_size: 1000,
            window_size: 1000,
            window_overlap: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks returned per query.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `"hash"` (offline, deterministic) or `"openai"` (remote).
    pub provider: String,
    /// Remote model identifier.
    pub model: String,
    /// Vector dimensionality; constant per provider instance.
    pub dims: usize,
    /// HTTP timeout for remote calls, in seconds.
    pub timeout_secs: u64,
    /// Total attempts per remote call (first try included).
    pub max_attempts: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            model: "text-embedding-3-small".to_string(),
            dims: 1536,
            timeout_secs: 30,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    /// `"disabled"` (fallback answer formatting) or `"anthropic"`.
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 1000,
            timeout_secs: 60,
            max_attempts: 3,
        }
    }
}

impl ChatConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

/// Load configuration from a TOML file, or fall back to defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.min_chunk_size == 0 {
        anyhow::bail!("chunking.min_chunk_size must be > 0");
    }
    if config.chunking.max_chunk_size < config.chunking.min_chunk_size {
        anyhow::bail!("chunking.max_chunk_size must be >= min_chunk_size");
    }
    if config.chunking.window_overlap >= config.chunking.window_size {
        anyhow::bail!("chunking.window_overlap must be < window_size");
    }
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }
    match config.embedding.provider.as_str() {
        "hash" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be hash or openai.",
            other
        ),
    }
    match config.chat.provider.as_str() {
        "disabled" | "anthropic" => {}
        other => anyhow::bail!(
            "Unknown chat provider: '{}'. Must be disabled or anthropic.",
            other
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/docvec.toml")).unwrap();
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.retrieval.top_k, 5);
        assert!(!config.chat.is_enabled());
    }

    #[test]
    fn parses_toml_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("docvec.toml");
        std::fs::write(
            &path,
            r#"
[storage]
dir = "/tmp/store"

[chunking]
strategy = "window"
window_size = 800
window_overlap = 100

[retrieval]
top_k = 3
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.chunking.strategy, ChunkStrategy::Window);
        assert_eq!(config.chunking.window_size, 800);
        assert_eq!(config.retrieval.top_k, 3);
        // Unspecified sections keep defaults.
        assert_eq!(config.embedding.dims, 1536);
    }

    #[test]
    fn rejects_invalid_sizes() {
        let mut config = Config::default();
        config.chunking.max_chunk_size = 10;
        config.chunking.min_chunk_size = 100;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.chunking.window_overlap = 1000;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_providers() {
        let mut config = Config::default();
        config.embedding.provider = "mystery".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.chat.provider = "mystery".to_string();
        assert!(validate(&config).is_err());
    }
}
