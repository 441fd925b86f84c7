//! Known-alias table for the reconciliation fallback pass
//!
//! The alias table is configuration data, not code: an embedded default is
//! compiled into the binary from `config/aliases.toml` and can be replaced
//! wholesale by a user copy under the platform data directory
//! (e.g. `~/.local/share/tuna/aliases.toml`), so new aliases ship without a
//! redeploy.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::normalize;

/// Embedded default table (compiled into binary)
const DEFAULT_ALIASES: &str = include_str!("../../../config/aliases.toml");

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(rename = "alias", default)]
    aliases: Vec<AliasEntry>,
}

#[derive(Debug, Deserialize)]
struct AliasEntry {
    pattern: String,
    concept: String,
}

/// Normalized-substring alias lookup
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// (normalized pattern, target concept), in file order
    entries: Vec<(String, String)>,
}

impl AliasTable {
    /// Load the alias table: user override if present, embedded default
    /// otherwise. A malformed override is a configuration error, not a
    /// silent fallback.
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::override_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                debug!(path = %path.display(), "Loading alias table override");
                return Self::parse(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)));
            }
        }
        Self::parse(DEFAULT_ALIASES).map_err(|e| Error::Config(format!("embedded aliases: {}", e)))
    }

    /// Load the embedded default table only (used by tests and as a safe
    /// fallback when the data dir is unavailable)
    pub fn embedded() -> Self {
        match Self::parse(DEFAULT_ALIASES) {
            Ok(table) => table,
            Err(e) => {
                warn!("Embedded alias table failed to parse: {}", e);
                Self { entries: Vec::new() }
            }
        }
    }

    /// Build a table from explicit entries (tests, callers with their own
    /// configuration source)
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(p, c)| (normalize(p.as_ref()), c.as_ref().to_string()))
                .collect(),
        }
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let file: AliasFile = toml::from_str(content)?;
        Ok(Self {
            entries: file
                .aliases
                .into_iter()
                .map(|a| (normalize(&a.pattern), a.concept))
                .collect(),
        })
    }

    /// Path of the user override file
    pub fn override_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("tuna").join("aliases.toml"))
    }

    /// Look up the aliased concept for a category name. The category is
    /// normalized and matched by substring against each pattern in order.
    pub fn lookup(&self, category: &str) -> Option<&str> {
        let normalized = normalize(category);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(pattern, _)| normalized.contains(pattern.as_str()))
            .map(|(_, concept)| concept.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
