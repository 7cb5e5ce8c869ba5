//! Application settings management

use crate::PathManager;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default number of turns kept per provider history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Application settings stored in settings.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API keys (provider name -> key)
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
    /// Default model per provider (e.g., "openai" -> "gpt-4o")
    #[serde(default)]
    pub models: HashMap<String, String>,
    /// Base URL overrides per provider, for proxies and compatible services
    #[serde(default)]
    pub base_urls: HashMap<String, String>,
    /// Turns retained per provider conversation
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Providers selected when nothing else is specified. Empty means all.
    #[serde(default)]
    pub selected_providers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            models: HashMap::new(),
            base_urls: HashMap::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            selected_providers: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the settings file, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = PathManager::settings_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from an explicit path. Missing or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        toml::from_str(&content).unwrap_or_default()
    }

    /// Save settings to the settings file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = PathManager::settings_path().context("Could not determine settings path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Get the API key for a provider, falling back to the given environment variables.
    pub fn api_key(&self, provider: &str, env_vars: &[&str]) -> Option<String> {
        lookup(&self.api_keys, provider, env_vars)
    }

    /// Set an API key for a provider.
    pub fn set_api_key(&mut self, provider: &str, api_key: &str) {
        self.api_keys.insert(provider.to_string(), api_key.to_string());
    }

    /// Base URL override for a provider, falling back to the given environment variable.
    pub fn base_url(&self, provider: &str, env_var: &str) -> Option<String> {
        lookup(&self.base_urls, provider, &[env_var])
    }

    /// Model id for a provider, or `fallback` when none is configured.
    pub fn model_or<'a>(&'a self, provider: &str, fallback: &'a str) -> &'a str {
        self.models.get(provider).map(String::as_str).unwrap_or(fallback)
    }

    pub fn set_model(&mut self, provider: &str, model_id: &str) {
        self.models.insert(provider.to_string(), model_id.to_string());
    }
}

fn lookup(map: &HashMap<String, String>, provider: &str, env_vars: &[&str]) -> Option<String> {
    map.get(provider)
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .or_else(|| {
            env_vars
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|value| !value.trim().is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml"));
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(settings.api_keys.is_empty());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "history_limit = [not toml").unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.set_api_key("openai", "sk-test");
        settings.set_model("gemini", "gemini-2.0-flash");
        settings.history_limit = 8;
        settings.selected_providers = vec!["claude".to_string(), "gemini".to_string()];
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.api_keys.get("openai").map(String::as_str), Some("sk-test"));
        assert_eq!(loaded.selected_providers, ["claude", "gemini"]);
        assert_eq!(loaded.model_or("gemini", "x"), "gemini-2.0-flash");
        assert_eq!(loaded.model_or("claude", "fallback"), "fallback");
        assert_eq!(loaded.history_limit, 8);
    }

    #[test]
    fn test_settings_key_wins_over_environment() {
        let mut settings = Settings::default();
        settings.set_api_key("deepseek", "from-file");
        // PATH is always set, so it doubles as a fallback that must not be used here
        assert_eq!(
            settings.api_key("deepseek", &["PATH"]).as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_blank_key_falls_back_to_environment() {
        let mut settings = Settings::default();
        settings.set_api_key("claude", "   ");
        let from_env = settings.api_key("claude", &["FANOUT_TEST_UNSET_VAR", "PATH"]);
        assert_eq!(from_env, std::env::var("PATH").ok());
    }
}
