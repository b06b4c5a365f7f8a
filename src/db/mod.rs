use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

#[cfg(target_arch = "wasm32")]
const SETTINGS_KEY: &str = "rustyplayer.settings";
#[cfg(not(target_arch = "wasm32"))]
const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Settings could not be encoded: {0}")]
    Encode(String),
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Player settings, persisted between visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Origin the endpoints are resolved against; the page origin when unset.
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default = "default_like_endpoint")]
    pub like_endpoint: String,
    #[serde(default = "default_add_to_playlist_endpoint")]
    pub add_to_playlist_endpoint: String,
    #[serde(default = "default_csrf_cookie_name")]
    pub csrf_cookie_name: String,
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
    #[serde(default = "default_skip_on_error")]
    pub skip_on_error: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_volume() -> f64 {
    0.8
}

fn default_like_endpoint() -> String {
    "/like-song/".to_string()
}

fn default_add_to_playlist_endpoint() -> String {
    "/song/{song_id}/add-to-playlist/".to_string()
}

fn default_csrf_cookie_name() -> String {
    "csrftoken".to_string()
}

fn default_csrf_header() -> String {
    "X-CSRFToken".to_string()
}

fn default_skip_on_error() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            server_url: None,
            like_endpoint: default_like_endpoint(),
            add_to_playlist_endpoint: default_add_to_playlist_endpoint(),
            csrf_cookie_name: default_csrf_cookie_name(),
            csrf_header: default_csrf_header(),
            skip_on_error: default_skip_on_error(),
            log_level: default_log_level(),
        }
    }
}

impl PlayerSettings {
    pub fn log_level(&self) -> tracing::Level {
        self.log_level
            .trim()
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }

    fn normalized(mut self) -> Self {
        self.volume = normalize_volume(self.volume);
        self
    }
}

/// Bring a stored volume back into `[0, 1]`. Older values may have been
/// stored as a 0-100 percentage.
pub fn normalize_volume(mut value: f64) -> f64 {
    if !value.is_finite() {
        return default_volume();
    }
    let mut passes = 0;
    while value > 1.0 && passes < 4 {
        value /= 100.0;
        passes += 1;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(target_arch = "wasm32")]
pub fn load_settings() -> PlayerSettings {
    LocalStorage::get::<PlayerSettings>(SETTINGS_KEY)
        .map(PlayerSettings::normalized)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
pub fn save_settings(settings: &PlayerSettings) -> Result<(), SettingsError> {
    LocalStorage::set(SETTINGS_KEY, settings).map_err(|e| SettingsError::Storage(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn settings_path() -> Result<std::path::PathBuf, SettingsError> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Directory holding host-side settings and bootstrap files.
#[cfg(not(target_arch = "wasm32"))]
pub fn config_dir() -> Result<std::path::PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join("rustyplayer"))
        .ok_or(SettingsError::NoConfigDir)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_settings() -> PlayerSettings {
    let Ok(path) = settings_path() else {
        return PlayerSettings::default();
    };
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|raw| parse_settings(&raw))
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_settings(settings: &PlayerSettings) -> Result<(), SettingsError> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SettingsError::Storage(e.to_string()))?;
    }
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| SettingsError::Encode(e.to_string()))?;
    std::fs::write(&path, raw).map_err(|e| SettingsError::Storage(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_settings(raw: &str) -> Option<PlayerSettings> {
    serde_json::from_str::<PlayerSettings>(raw)
        .ok()
        .map(PlayerSettings::normalized)
}
