use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, LocalStore, RestBackend};
use crate::i18n::{I18n, Locale};
use crate::notification::Toaster;
use crate::preferences::{PreferenceStore, Preferences};
use crate::query_cache::QueryClient;

/// Configuration stored in ~/.aitech-daily/config.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Hosted backend project URL. When unset the local store is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    /// Override for the local store location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_db_path: Option<String>,
    /// Point the local store at `local-dev.db`.
    #[serde(default)]
    pub dev_mode: bool,
}

pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".aitech-daily").join("config.json"))
}

/// Load configuration from ~/.aitech-daily/config.json. A missing file means
/// "all defaults" (local store, no hosted backend).
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    let config: AppConfig =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    if config.backend_url.is_some() && config.anon_key.is_none() {
        return Err(format!(
            "Config at {} sets backendUrl but no anonKey",
            path.display()
        ));
    }

    Ok(config)
}

/// Build the backend a config asks for.
pub fn open_backend(config: &AppConfig) -> Result<Arc<dyn Backend>, String> {
    match (&config.backend_url, &config.anon_key) {
        (Some(url), Some(key)) => {
            let backend = RestBackend::new(url, key).map_err(|e| e.to_string())?;
            Ok(Arc::new(backend))
        }
        _ => {
            let path = match &config.local_db_path {
                Some(p) => PathBuf::from(p),
                None => LocalStore::default_path(config.dev_mode).map_err(|e| e.to_string())?,
            };
            log::info!("Using local store at {}", path.display());
            let store = LocalStore::open_at(&path).map_err(|e| e.to_string())?;
            Ok(Arc::new(store))
        }
    }
}

/// Root context handed to every hook and page.
///
/// Owns the backend handle, the query cache, the toast queue, the locale,
/// and the persisted settings. Hooks take `&AppContext`; nothing reaches for
/// globals.
pub struct AppContext {
    pub backend: Arc<dyn Backend>,
    pub queries: QueryClient,
    pub toaster: Toaster,
    pub i18n: I18n,
    pub prefs: Preferences,
    user_id: Option<String>,
    entry_animation_played: AtomicBool,
}

impl AppContext {
    pub fn new(backend: Arc<dyn Backend>, prefs: Preferences) -> Self {
        let i18n = I18n::new(prefs.locale());
        Self {
            backend,
            queries: QueryClient::new(),
            toaster: Toaster::new(),
            i18n,
            prefs,
            user_id: None,
            entry_animation_played: AtomicBool::new(false),
        }
    }

    /// Build a context from on-disk config and preferences.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let backend = open_backend(config)?;
        let prefs = Preferences::load(PreferenceStore::new(PreferenceStore::default_path()?));
        Ok(Self::new(backend, prefs))
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Forget the signed-in user and everything fetched on their behalf.
    /// Settings and locale stay; they belong to the device.
    pub fn sign_out(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            log::info!("Signed out {}", user_id);
        }
        self.queries.clear();
    }

    /// Switch display language and persist the choice. The switch itself
    /// always happens; a failed write is logged.
    pub fn set_locale(&self, locale: Locale) {
        self.i18n.set_locale(locale);
        if let Err(e) = self.prefs.set_locale(locale) {
            log::warn!("Failed to persist locale {}: {}", locale.as_str(), e);
        }
    }

    /// Translate with the active locale.
    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key)
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        self.i18n.t_with(key, vars)
    }

    /// True exactly once per context: whether the entry overlay should play.
    pub fn claim_entry_animation(&self) -> bool {
        !self.entry_animation_played.swap(true, Ordering::SeqCst)
    }
}
