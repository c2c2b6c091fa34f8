// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration: an optional `config.toml` in the platform config
//! dir, overridden by `MONEYFLOW_*` environment variables.
//!
//! ```toml
//! [storage]
//! backend = "rest"
//!
//! [remote]
//! url = "https://project.example.co"
//! api_key = "..."
//! user_id = "..."
//!
//! [sync]
//! policy = "queue"
//! ```

use crate::repository::RestConfig;
use crate::store::SyncPolicy;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Rest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Local database file; defaults to the platform data dir.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    15
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            access_token: None,
            user_id: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub policy: SyncPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "moneyflow=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("MONEYFLOW_CONFIG") {
            Some(p) => Some(PathBuf::from(p)),
            None => crate::db::project_dirs()
                .ok()
                .map(|d| d.config_dir().join("config.toml")),
        };
        let mut cfg = match path.filter(|p| p.exists()) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Parse config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies `MONEYFLOW_*` overrides looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = var("MONEYFLOW_DB") {
            self.storage.db_path = Some(PathBuf::from(p));
        }
        if let Some(b) = var("MONEYFLOW_BACKEND") {
            self.storage.backend = match b.trim().to_lowercase().as_str() {
                "sqlite" => Backend::Sqlite,
                "rest" => Backend::Rest,
                other => return Err(anyhow!("Unknown backend '{}', expected sqlite|rest", other)),
            };
        }
        if let Some(u) = var("MONEYFLOW_REMOTE_URL") {
            self.remote.url = Some(u);
        }
        if let Some(k) = var("MONEYFLOW_REMOTE_KEY") {
            self.remote.api_key = Some(k);
        }
        if let Some(t) = var("MONEYFLOW_ACCESS_TOKEN") {
            self.remote.access_token = Some(t);
        }
        if let Some(u) = var("MONEYFLOW_USER_ID") {
            self.remote.user_id = Some(u);
        }
        if let Some(p) = var("MONEYFLOW_SYNC_POLICY") {
            self.sync.policy = p.parse()?;
        }
        if let Some(f) = var("RUST_LOG") {
            self.logging.filter = f;
        }
        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(p) => Ok(p.clone()),
            None => crate::db::default_db_path(),
        }
    }

    pub fn rest_config(&self) -> Result<RestConfig> {
        let base_url = self
            .remote
            .url
            .clone()
            .context("Remote backend selected but no remote url configured (MONEYFLOW_REMOTE_URL)")?;
        let api_key = self
            .remote
            .api_key
            .clone()
            .context("Remote backend selected but no api key configured (MONEYFLOW_REMOTE_KEY)")?;
        Ok(RestConfig {
            base_url,
            api_key,
            access_token: self.remote.access_token.clone(),
            user_id: self.remote.user_id.clone(),
            timeout_secs: self.remote.timeout_secs,
        })
    }
}
