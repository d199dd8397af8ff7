use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::store::rest::DEFAULT_TABLE;

pub const URL_ENV: &str = "PRISM_STORE_URL";
pub const KEY_ENV: &str = "PRISM_STORE_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub table: Option<String>,
}

/// Everything needed to reach the remote table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub key: String,
    pub table: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Resolve store settings from the process environment, then this config
    pub fn store_settings(&self) -> Result<StoreSettings> {
        self.store_settings_with(|name| std::env::var(name).ok())
    }

    /// Environment values win over the file; empty values count as unset
    pub fn store_settings_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<StoreSettings> {
        let set = |value: &String| !value.trim().is_empty();
        let pick = |var: &str, configured: &Option<String>| {
            env(var)
                .filter(set)
                .or_else(|| configured.clone().filter(set))
        };

        let url = pick(URL_ENV, &self.store_url).ok_or_else(|| {
            anyhow!("No store URL configured. Set {URL_ENV} or run: prism configure --url <URL>")
        })?;
        let key = pick(KEY_ENV, &self.store_key).ok_or_else(|| {
            anyhow!("No store key configured. Set {KEY_ENV} or run: prism configure --key <KEY>")
        })?;
        let table = self
            .table
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        Ok(StoreSettings { url, key, table })
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(app_dir(dirs::config_dir())?.join("config.json"))
    }
}

/// Log file location (`<data_dir>/prism-chat/logs/prism.log`)
pub fn log_file_path() -> Result<PathBuf> {
    Ok(app_dir(dirs::data_local_dir())?.join("logs").join("prism.log"))
}

fn app_dir(base: Option<PathBuf>) -> Result<PathBuf> {
    let base = base.ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(base.join("prism-chat"))
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
        move |name| map.get(name).cloned()
    }

    fn configured() -> Config {
        Config {
            store_url: Some("https://file.supabase.co".to_string()),
            store_key: Some("file-key".to_string()),
            table: None,
        }
    }

    #[test]
    fn test_settings_from_file() {
        let settings = configured().store_settings_with(env_of(&[])).unwrap();
        assert_eq!(settings.url, "https://file.supabase.co");
        assert_eq!(settings.key, "file-key");
        assert_eq!(settings.table, "messages");
    }

    #[test]
    fn test_env_overrides_file() {
        let env = env_of(&[(URL_ENV, "https://env.supabase.co"), (KEY_ENV, "env-key")]);
        let settings = configured().store_settings_with(env).unwrap();
        assert_eq!(settings.url, "https://env.supabase.co");
        assert_eq!(settings.key, "env-key");
    }

    #[test]
    fn test_empty_env_falls_back_to_file() {
        let env = env_of(&[(URL_ENV, ""), (KEY_ENV, "   ")]);
        let settings = configured().store_settings_with(env).unwrap();
        assert_eq!(settings.url, "https://file.supabase.co");
        assert_eq!(settings.key, "file-key");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = Config {
            store_url: Some("https://file.supabase.co".to_string()),
            store_key: Some("  ".to_string()),
            table: None,
        };
        let err = config.store_settings_with(env_of(&[])).unwrap_err();
        assert!(err.to_string().contains(KEY_ENV));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = configured();
        config.table = Some("chat_log".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::new());
    }
}
