//! AI configuration service
//!
//! Credential lookup is an explicit service handed to the reconciliation
//! engine, with an injected TTL cache and an invalidation hook, instead of a
//! module-level singleton. Callers construct one `AiSettings` and share it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Environment variables consulted by `AiSettings`
pub const AI_HOST_ENV: &str = "TUNA_AI_HOST";
pub const AI_MODEL_ENV: &str = "TUNA_AI_MODEL";
pub const AI_API_KEY_ENV: &str = "TUNA_AI_API_KEY";
pub const AI_TIMEOUT_ENV: &str = "TUNA_AI_TIMEOUT_SECS";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved AI connection parameters
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub host: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Bound on the single semantic-match call
    pub timeout: Duration,
}

/// Configuration service with TTL-cached environment lookup
pub struct AiSettings {
    ttl: Duration,
    cache: Mutex<Option<CacheSlot>>,
}

struct CacheSlot {
    loaded_at: Instant,
    config: Option<AiConfig>,
}

impl AiSettings {
    /// Create a settings service with the given cache TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Settings that re-read the environment on every call (tests, CLI)
    pub fn uncached() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Current AI configuration, or None when no host is configured.
    /// Reads the environment at most once per TTL window.
    pub fn current(&self) -> Option<AiConfig> {
        let mut cache = self.cache.lock().expect("settings cache poisoned");

        if let Some(slot) = cache.as_ref() {
            if slot.loaded_at.elapsed() < self.ttl {
                return slot.config.clone();
            }
        }

        let config = Self::read_env();
        debug!(configured = config.is_some(), "Refreshed AI settings");
        *cache = Some(CacheSlot {
            loaded_at: Instant::now(),
            config: config.clone(),
        });
        config
    }

    /// Drop the cached configuration; the next `current` re-reads the env
    pub fn invalidate(&self) {
        *self.cache.lock().expect("settings cache poisoned") = None;
    }

    fn read_env() -> Option<AiConfig> {
        let host = std::env::var(AI_HOST_ENV).ok()?;
        let model = std::env::var(AI_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var(AI_API_KEY_ENV).ok();
        let timeout = std::env::var(AI_TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(AiConfig {
            host,
            model,
            api_key,
            timeout: Duration::from_secs(timeout),
        })
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        // One-minute TTL keeps repeated reconciliations from hammering the
        // environment while still picking up credential changes quickly
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_returns_none() {
        // Env mutation is process-global; only assert when the variable is
        // genuinely absent in this test environment
        if std::env::var(AI_HOST_ENV).is_err() {
            let settings = AiSettings::uncached();
            assert!(settings.current().is_none());
        }
    }

    #[test]
    fn test_invalidate_clears_cache() {
        let settings = AiSettings::new(Duration::from_secs(3600));
        let _ = settings.current();
        assert!(settings.cache.lock().unwrap().is_some());
        settings.invalidate();
        assert!(settings.cache.lock().unwrap().is_none());
    }
}
