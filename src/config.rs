use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::info;

use crate::domain::entities::filter::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};

pub const API_BASE_URL_ENV: &str = "SALESDASH_API_BASE_URL";
pub const SESSION_ENV: &str = "SALESDASH_SESSION";
pub const LOGIN_URL_ENV: &str = "SALESDASH_LOGIN_URL";

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_cookie: Option<String>,
    pub default_page_size: u32,
    pub search_debounce_ms: u64,
    pub login_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            session_cookie: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            login_url: "http://localhost:3000/login".to_string(),
        }
    }
}

impl AppConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Reads `path` if it exists, then applies environment overrides through
    /// `env`. A missing file is not an error.
    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            serde_json::from_str::<AppConfig>(&raw)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            AppConfig::default()
        };

        if let Some(url) = env(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url;
        }
        if let Some(session) = env(SESSION_ENV).filter(|v| !v.trim().is_empty()) {
            config.session_cookie = Some(session);
        }
        if let Some(login) = env(LOGIN_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.login_url = login;
        }
        if !PAGE_SIZE_OPTIONS.contains(&config.default_page_size) {
            config.default_page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(config)
    }

    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        let config = Self::load_from(&path, |key| std::env::var(key).ok())?;
        info!(path = %path.display(), api = %config.api_base_url, "configuration loaded");
        Ok(config)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "salesdash", "salesdash")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}
