// ⚙️ Build Configuration - sources, precedence, tunables as data
// Loaded from a JSON file so a rebuild with different sources or a
// different threshold needs no recompilation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregator::DEFAULT_THRESHOLD;

// ============================================================================
// SOURCE CONFIG
// ============================================================================

/// One contributing source dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source tag used throughout the database ("CW", "MD", ...)
    pub tag: String,

    /// Path to the source's converted records (NDJSON), for the CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Whether this source overwrites identity fields (head, lemma,
    /// category) on the entries it matches
    #[serde(default)]
    pub authoritative: bool,
}

impl SourceConfig {
    pub fn new(tag: &str) -> Self {
        SourceConfig {
            tag: tag.to_string(),
            path: None,
            authoritative: false,
        }
    }

    pub fn authoritative(mut self) -> Self {
        self.authoritative = true;
        self
    }
}

// ============================================================================
// BUILD CONFIG
// ============================================================================

/// Full build configuration. The order of `sources` is the pipeline order
/// and the aggregation precedence: the identity/base source comes first,
/// later merges rely on earlier ones being finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Contributing sources, in precedence order
    pub sources: Vec<SourceConfig>,

    /// Similarity threshold τ for definition aggregation (default: 0.8)
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    /// Compare normalized definitions during aggregation (default: true;
    /// raw-token comparison is mainly useful for debugging)
    #[serde(default = "default_true")]
    pub normalize_definitions: bool,

    /// Lemmas classified into the demonstrative-pronoun paradigm
    #[serde(default)]
    pub demonstrative_pronouns: Vec<String>,

    /// Lemmas classified into the personal-pronoun paradigm
    #[serde(default)]
    pub personal_pronouns: Vec<String>,

    /// Path to the precomputed analyzer table (NDJSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_table: Option<PathBuf>,

    /// Path of the canonical database snapshot (read at start when present,
    /// written at the end)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl BuildConfig {
    /// Creates a configuration over the given source tags with default
    /// tunables.
    pub fn with_sources(sources: Vec<SourceConfig>) -> Self {
        BuildConfig {
            sources,
            similarity_threshold: DEFAULT_THRESHOLD,
            normalize_definitions: true,
            demonstrative_pronouns: Vec::new(),
            personal_pronouns: Vec::new(),
            analyzer_table: None,
            database_path: None,
        }
    }

    /// Loads the configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: BuildConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.sources.is_empty() {
            anyhow::bail!("Config must list at least one source");
        }

        Ok(config)
    }

    /// The source tags in precedence order.
    pub fn precedence(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.tag.clone()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
