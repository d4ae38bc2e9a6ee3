//! Persisted user settings: display locale and dashboard tab visibility.
//!
//! Settings live under a single key in `~/.aitech-daily/preferences.json`.
//! Other keys in that file are preserved on write. A file that no longer
//! parses is moved aside to `preferences.json.corrupt` before the fresh one
//! is written, so nothing is silently dropped. `Preferences` is the
//! scoped handle the rest of the app reads and writes through; nothing here is
//! process-global.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

pub const SETTINGS_KEY: &str = "aitech-daily-settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    Market,
    Deals,
    Contacts,
    Research,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 4] = [
        DashboardTab::Market,
        DashboardTab::Deals,
        DashboardTab::Contacts,
        DashboardTab::Research,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            DashboardTab::Market => "tab.market",
            DashboardTab::Deals => "tab.deals",
            DashboardTab::Contacts => "tab.contacts",
            DashboardTab::Research => "tab.research",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabVisibility {
    #[serde(default = "default_true")]
    pub market: bool,
    #[serde(default = "default_true")]
    pub deals: bool,
    #[serde(default = "default_true")]
    pub contacts: bool,
    #[serde(default = "default_true")]
    pub research: bool,
}

impl Default for TabVisibility {
    fn default() -> Self {
        Self {
            market: true,
            deals: true,
            contacts: true,
            research: true,
        }
    }
}

impl TabVisibility {
    pub fn is_visible(&self, tab: DashboardTab) -> bool {
        match tab {
            DashboardTab::Market => self.market,
            DashboardTab::Deals => self.deals,
            DashboardTab::Contacts => self.contacts,
            DashboardTab::Research => self.research,
        }
    }

    pub fn set_visible(&mut self, tab: DashboardTab, visible: bool) {
        let slot = match tab {
            DashboardTab::Market => &mut self.market,
            DashboardTab::Deals => &mut self.deals,
            DashboardTab::Contacts => &mut self.contacts,
            DashboardTab::Research => &mut self.research,
        };
        *slot = visible;
    }

    pub fn visible_tabs(&self) -> Vec<DashboardTab> {
        DashboardTab::ALL
            .into_iter()
            .filter(|t| self.is_visible(*t))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub tabs: TabVisibility,
}

/// File-backed key/value store holding the settings blob.
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Could not find home directory")?;
        Ok(home.join(".aitech-daily").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, String> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read preferences: {}", e))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse preferences: {}", e))
    }

    /// Load settings. A missing file or key yields defaults; an unreadable
    /// file is logged and also yields defaults.
    pub fn load(&self) -> Settings {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                log::warn!("{}. Using default settings.", e);
                return Settings::default();
            }
        };
        match map.get(SETTINGS_KEY) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {}", SETTINGS_KEY, e);
                Settings::default()
            }),
            None => Settings::default(),
        }
    }

    /// Where an unparseable preferences file is kept.
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Write settings atomically (temp file + rename).
    pub fn save(&self, settings: &Settings) -> Result<(), String> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                let backup = self.corrupt_path();
                log::warn!("{}. Moving it to {} and starting fresh.", e, backup.display());
                fs::rename(&self.path, &backup)
                    .map_err(|e| format!("Failed to move aside corrupt preferences: {}", e))?;
                serde_json::Map::new()
            }
        };
        let value = serde_json::to_value(settings)
            .map_err(|e| format!("Serialize error: {}", e))?;
        map.insert(SETTINGS_KEY.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create preferences dir: {}", e))?;
            }
        }

        let content = serde_json::to_string_pretty(&map)
            .map_err(|e| format!("Serialize error: {}", e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| format!("Write error: {}", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| format!("Rename error: {}", e))?;
        Ok(())
    }
}

/// Settings handle passed down from the app root.
pub struct Preferences {
    store: Option<PreferenceStore>,
    settings: RwLock<Settings>,
}

impl Preferences {
    pub fn load(store: PreferenceStore) -> Self {
        let settings = store.load();
        Self {
            store: Some(store),
            settings: RwLock::new(settings),
        }
    }

    /// Settings that are never written to disk.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            store: None,
            settings: RwLock::new(settings),
        }
    }

    pub fn get(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn locale(&self) -> Locale {
        self.settings.read().locale
    }

    pub fn tabs(&self) -> TabVisibility {
        self.settings.read().tabs
    }

    /// Apply `mutator` and persist. In-memory state is updated even when the
    /// write fails; the error is returned so the caller can surface it.
    pub fn update(&self, mutator: impl FnOnce(&mut Settings)) -> Result<Settings, String> {
        let snapshot = {
            let mut guard = self.settings.write();
            mutator(&mut *guard);
            guard.clone()
        };
        if let Some(store) = &self.store {
            store.save(&snapshot)?;
        }
        Ok(snapshot)
    }

    pub fn set_locale(&self, locale: Locale) -> Result<Settings, String> {
        self.update(|s| s.locale = locale)
    }

    pub fn set_tab_visible(&self, tab: DashboardTab, visible: bool) -> Result<Settings, String> {
        self.update(|s| s.tabs.set_visible(tab, visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::new(dir.path().join("prefs").join("preferences.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let (_dir, store) = temp_store();
        let settings = store.load();
        assert_eq!(settings.locale, Locale::En);
        assert_eq!(settings.tabs.visible_tabs().len(), 4);
    }

    #[test]
    fn test_update_persists_under_single_key() {
        let (_dir, store) = temp_store();
        let path = store.path().to_path_buf();
        let prefs = Preferences::load(store);
        prefs.set_locale(Locale::Zh).expect("save");
        prefs
            .set_tab_visible(DashboardTab::Research, false)
            .expect("save");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(raw[SETTINGS_KEY]["locale"], "zh");
        assert_eq!(raw[SETTINGS_KEY]["tabs"]["research"], false);

        let reloaded = PreferenceStore::new(path).load();
        assert_eq!(reloaded.locale, Locale::Zh);
        assert!(!reloaded.tabs.is_visible(DashboardTab::Research));
        assert!(reloaded.tabs.is_visible(DashboardTab::Deals));
    }

    #[test]
    fn test_save_preserves_unrelated_keys() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), r#"{"sidebar-collapsed": true}"#).expect("seed");
        store.save(&Settings::default()).expect("save");
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).expect("read")).expect("json");
        assert_eq!(raw["sidebar-collapsed"], true);
        assert!(raw.get(SETTINGS_KEY).is_some());
    }

    #[test]
    fn test_save_over_corrupt_file_keeps_a_copy() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), r#"{"sidebar-collapsed": tru"#).expect("seed");

        let settings = Settings {
            locale: Locale::Zh,
            ..Settings::default()
        };
        store.save(&settings).expect("save");

        assert_eq!(
            fs::read_to_string(store.corrupt_path()).expect("backup"),
            r#"{"sidebar-collapsed": tru"#
        );
        assert_eq!(store.load().locale, Locale::Zh);
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), r#"{"aitech-daily-settings": {"locale": "fr"}}"#).expect("seed");
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_partial_tabs_default_to_visible() {
        let settings: Settings =
            serde_json::from_str(r#"{"locale":"en","tabs":{"market":false}}"#).expect("parse");
        assert!(!settings.tabs.market);
        assert!(settings.tabs.deals && settings.tabs.contacts && settings.tabs.research);
    }
}
