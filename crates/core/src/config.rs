//! Configuration management for Guardiane.
//!
//! Configuration is assembled from several layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.guardiane/config.yaml` in the workspace, or `GUARDIANE_CONFIG`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! Relative paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers understood by the knowledge crate.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "mock"];

/// Generation providers understood by the LLM crate.
pub const KNOWN_LLM_PROVIDERS: [&str; 1] = ["ollama"];

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .guardiane/ and the data files)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Knowledge-base source files
    pub data: DataConfig,

    /// Persisted index location
    pub index: IndexConfig,

    /// Generative model settings
    pub llm: LlmSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Chunk splitting parameters
    pub chunking: ChunkingConfig,

    /// Retrieval parameters
    pub rag: RagSettings,
}

/// Knowledge-base source files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DataConfig {
    /// FAQ records (`[{question, answer}]`)
    pub faq_path: PathBuf,

    /// Hotline records (`[{organization, topic, phone, website}]`)
    pub hotline_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            faq_path: PathBuf::from("data/faq.json"),
            hotline_path: PathBuf::from("data/hotlines.json"),
        }
    }
}

/// Where the vector index and its fingerprint live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".guardiane/index"),
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: "tinyllama".to_string(),
            temperature: Some(0.3),
            max_tokens: Some(512),
            timeout_secs: 120,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// "ollama" or "mock"
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    /// Maximum number of texts sent per embedding batch
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            batch_size: 32,
            timeout_secs: 30,
        }
    }
}

/// Chunk splitting parameters (in characters).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

/// Retrieval parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RagSettings {
    /// Chunks retrieved per query
    pub top_k: usize,

    /// Number of queries searched, the original question included.
    /// 1 disables query expansion.
    pub query_variants: usize,

    /// Upper bound on chunks handed to the model after merging
    pub max_context_chunks: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: 6,
            query_variants: 3,
            max_context_chunks: 10,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    data: Option<DataConfig>,
    index: Option<IndexConfig>,
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    chunking: Option<ChunkingConfig>,
    rag: Option<RagSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            data: DataConfig::default(),
            index: IndexConfig::default(),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingConfig::default(),
            rag: RagSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `GUARDIANE_WORKSPACE`: Override workspace path
    /// - `GUARDIANE_CONFIG`: Path to config file
    /// - `GUARDIANE_DATA_DIR`: Directory holding `faq.json` and `hotlines.json`
    /// - `GUARDIANE_MODEL`: Generative model identifier
    /// - `GUARDIANE_EMBEDDING_PROVIDER`: Embedding provider ("ollama", "mock")
    /// - `OLLAMA_URL`: Ollama endpoint for both generation and embeddings
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use guardiane_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Same as [`AppConfig::load`], with explicit workspace/config-file paths
    /// taking precedence over the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("GUARDIANE_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("GUARDIANE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.guardiane_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(dir) = std::env::var("GUARDIANE_DATA_DIR") {
            let dir = PathBuf::from(dir);
            config.data.faq_path = dir.join("faq.json");
            config.data.hotline_path = dir.join("hotlines.json");
        }

        if let Ok(model) = std::env::var("GUARDIANE_MODEL") {
            config.llm.model = model;
        }

        if let Ok(provider) = std::env::var("GUARDIANE_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.llm.endpoint = url.clone();
            config.embedding.endpoint = url;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(data) = config_file.data {
            result.data = data;
        }
        if let Some(index) = config_file.index {
            result.index = index;
        }
        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(chunking) = config_file.chunking {
            result.chunking = chunking;
        }
        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        embedding_provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .guardiane directory.
    pub fn guardiane_dir(&self) -> PathBuf {
        self.workspace.join(".guardiane")
    }

    /// Resolved path of the FAQ source file.
    pub fn faq_path(&self) -> PathBuf {
        self.resolve(&self.data.faq_path)
    }

    /// Resolved path of the hotline source file.
    pub fn hotline_path(&self) -> PathBuf {
        self.resolve(&self.data.hotline_path)
    }

    /// Resolved directory of the persisted index.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.index.dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate provider names and numeric parameters.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding dimensions and batch size must be greater than zero".to_string(),
            ));
        }

        if self.chunking.chunk_size == 0 || self.chunking.chunk_overlap >= self.chunking.chunk_size
        {
            return Err(AppError::Config(format!(
                "Invalid chunking: size {} overlap {} (overlap must be smaller than size)",
                self.chunking.chunk_size, self.chunking.chunk_overlap
            )));
        }

        if self.rag.top_k == 0 || self.rag.query_variants == 0 || self.rag.max_context_chunks == 0
        {
            return Err(AppError::Config(
                "Retrieval parameters must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
