use std::num::NonZeroUsize;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::Comparator;
use crate::diff::differ::DiffTolerances;
use crate::matching::matcher::MatchConfig;
use crate::report::aggregate::ReadinessThresholds;
use crate::text::embedding::{
    DEFAULT_CONCURRENCY, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL, EmbeddingCache,
    EmbeddingProvider, HashedEmbedder, OllamaEmbedder, SemanticScorer,
};

pub const DEFAULT_CONFIG_PATH: &str = "design-qa.yaml";
pub const DEFAULT_TIMEOUT_SECS: u64 = crate::COMPARISON_TIMEOUT.as_secs();
pub const DEFAULT_EXTRACT_SCRIPT: &str = "node/dom-extraction/extract.js";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "design-qa",
    version,
    about = "Compare a design frame against the live page that implements it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama embeddings endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama embedding model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: design-qa.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Html,
    Junit,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    Hashed,
    Ollama,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a design frame with a rendered page
    Compare {
        /// Design document JSON (design API node response)
        #[arg(long)]
        design: String,

        /// Saved DOM snapshot JSON; conflicts with --url
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        rendered: Option<String>,

        /// Live page to capture with the extraction script
        #[arg(long)]
        url: Option<String>,

        /// Node extraction script used with --url
        #[arg(long, default_value = DEFAULT_EXTRACT_SCRIPT)]
        script: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Embedding provider (overrides config)
        #[arg(long, value_enum)]
        embedder: Option<EmbedderKind>,

        /// Wall-clock limit in seconds (overrides config)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Pixel-diff a design export against a page screenshot
    Raster {
        /// Design export image
        #[arg(long)]
        design: String,

        /// Live page screenshot
        #[arg(long)]
        live: String,

        /// Per-pixel colour distance threshold (0..1)
        #[arg(long, default_value_t = crate::raster::pixel_diff::DEFAULT_PIXEL_THRESHOLD)]
        threshold: f64,

        /// Write a diff visualisation PNG here
        #[arg(long)]
        diff_output: Option<String>,
    },

    /// Print the design tokens (colours, fonts, sizes, weights) of a frame
    Tokens {
        /// Design document JSON
        #[arg(long)]
        design: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `design-qa.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub tolerances: DiffTolerances,
    #[serde(default)]
    pub readiness: ReadinessThresholds,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            tolerances: DiffTolerances::default(),
            readiness: ReadinessThresholds::default(),
            embedding: EmbeddingSettings::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_provider")]
    pub provider: EmbedderKind,

    pub endpoint: Option<String>,

    pub model: Option<String>,

    /// LRU bound on cached embeddings; absent means unbounded.
    pub cache_capacity: Option<usize>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbedderKind::Hashed,
            endpoint: None,
            model: None,
            cache_capacity: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

// Serde default helpers
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_provider() -> EmbedderKind { EmbedderKind::Hashed }
fn default_concurrency() -> usize { DEFAULT_CONCURRENCY }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = config_path, error = %e, "malformed config; using defaults");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Embedding overrides taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct EmbeddingOverrides<'a> {
    pub provider: Option<EmbedderKind>,
    pub endpoint: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Build the comparator from resolved settings: CLI > config > defaults.
pub fn build_comparator(config: &AppConfig, overrides: &EmbeddingOverrides) -> Comparator {
    let settings = &config.embedding;

    let provider: Arc<dyn EmbeddingProvider> =
        match overrides.provider.unwrap_or(settings.provider) {
            EmbedderKind::Hashed => Arc::new(HashedEmbedder::default()),
            EmbedderKind::Ollama => {
                let endpoint = overrides
                    .endpoint
                    .or(settings.endpoint.as_deref())
                    .unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
                let model = overrides
                    .model
                    .or(settings.model.as_deref())
                    .unwrap_or(DEFAULT_OLLAMA_MODEL);
                Arc::new(OllamaEmbedder::new(endpoint, model))
            }
        };

    let cache = match settings.cache_capacity.and_then(NonZeroUsize::new) {
        Some(capacity) => EmbeddingCache::with_capacity(capacity),
        None => EmbeddingCache::unbounded(),
    };

    Comparator {
        scorer: SemanticScorer::new(provider, Arc::new(cache))
            .with_concurrency(settings.concurrency),
        matching: config.matching,
        tolerances: config.tolerances,
        readiness: config.readiness,
    }
}
