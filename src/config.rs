use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use log::{debug, info, warn};
use thiserror::Error;
use tiny_skia::Color;
use crate::state::ListParams;

pub const CONFIG_DIR_ENV: &str = "LAUNCHBOX_CONFIG_DIR";
pub const SETTINGS_FILE: &str = "config.toml";
pub const ENTRIES_FILE: &str = "entries.toml";
pub const STYLE_FILE: &str = "style.toml";

/// Files copied into a fresh config directory.
const DEFAULT_FILES: [(&str, &str); 3] = [
    (SETTINGS_FILE, include_str!("../config/config.toml")),
    (ENTRIES_FILE, include_str!("../config/entries.toml")),
    (STYLE_FILE, include_str!("../config/style.toml")),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("i/o error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid setting: {0}")]
    Invalid(String),
    #[error("could not determine a config directory")]
    NoConfigDir,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub path: PathConfig,
    #[serde(default)]
    pub entries: EntriesConfig,
    #[serde(default)]
    pub fuzzy: FuzzyConfig,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WindowConfig {
    // The window is recentred on the active output, so x/y only matter to
    // compositors that ignore the anchor.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub top_offset: i32,
    pub margin_left: i32,
    pub margin_top: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 400,
            height: 200,
            top_offset: 200,
            margin_left: 0,
            margin_top: 0,
            margin_right: 0,
            margin_bottom: 0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PathConfig {
    pub entries: PathBuf,
    pub style: PathBuf,
    pub config: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            entries: PathBuf::from(ENTRIES_FILE),
            style: PathBuf::from(STYLE_FILE),
            config: PathBuf::from(SETTINGS_FILE),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EntriesConfig {
    pub visible_entries: usize,
    pub start_index: usize,
    pub window_start: usize,
    pub delta: i32,
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            visible_entries: 5,
            start_index: 0,
            window_start: 0,
            delta: 1,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FuzzyConfig {
    pub fuzzy_limit: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self { fuzzy_limit: 30 }
    }
}

impl Settings {
    pub fn list_params(&self) -> ListParams {
        ListParams {
            visible_count: self.entries.visible_entries,
            delta: self.entries.delta,
            fuzzy_limit: self.fuzzy.fuzzy_limit,
        }
    }

    /// Resolves a `[path]` value against the config directory.
    pub fn resolve(config_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.visible_entries == 0 {
            return Err(ConfigError::Invalid("entries.visible_entries must be at least 1".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window.width and window.height must be non-zero".into()));
        }
        Ok(())
    }
}

/// Picks the per-user config directory, or `user_path` when given.
pub fn resolve_config_dir(user_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = user_path {
        return Ok(path);
    }
    ProjectDirs::from("org", "launchbox", "launchbox")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}

/// Resolves and creates the config directory, then seeds any missing default
/// files. Called once at startup.
pub fn init_config_dir(user_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = resolve_config_dir(user_path)?;
    fs::create_dir_all(&dir).map_err(|source| ConfigError::Io { path: dir.clone(), source })?;
    let seeded = seed_defaults(&dir)?;
    if !seeded.is_empty() {
        info!("Seeded {} default file(s) into {:?}", seeded.len(), dir);
    }
    Ok(dir)
}

/// Writes the bundled defaults that do not exist yet. Returns what was written.
pub fn seed_defaults(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut written = Vec::new();
    for (name, content) in DEFAULT_FILES {
        let dest = dir.join(name);
        if dest.exists() {
            continue;
        }
        fs::write(&dest, content).map_err(|source| ConfigError::Io { path: dest.clone(), source })?;
        debug!("Wrote default {:?}", dest);
        written.push(dest);
    }
    Ok(written)
}

/// Loads `config.toml` from the config directory. A missing file is fatal;
/// missing keys take their defaults.
pub fn load_settings(config_dir: &Path) -> Result<Settings, ConfigError> {
    let path = config_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path: path.clone(), source })?;
    let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
    settings.validate()?;
    Ok(settings)
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ThemeConfig {
    pub border_radius: f32,
    pub spacing: f32,
    pub font_size: f32,
    pub input_font_size: f32,
    pub background: String,
    pub border_color: String,
    pub text: String,
    pub placeholder: String,
    pub input_background: String,
    pub selection_background: String,
    pub selection_text: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            border_radius: 12.0,
            spacing: 6.0,
            font_size: 16.0,
            input_font_size: 20.0,
            background: "1e1e1eff".to_string(),
            border_color: "3c3c50ff".to_string(),
            text: "c8c8c8ff".to_string(),
            placeholder: "646464ff".to_string(),
            input_background: "2a2a2aff".to_string(),
            selection_background: "3c3c50ff".to_string(),
            selection_text: "ffffffff".to_string(),
        }
    }
}

impl ThemeConfig {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 8 || !hex.is_ascii() {
            return Color::BLACK;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);

        Color::from_rgba8(r, g, b, a)
    }
}

/// Loads the style file. A missing file is skipped silently and a broken one
/// falls back to defaults.
pub fn load_style(path: &Path) -> ThemeConfig {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No style file at {:?}", path);
            return ThemeConfig::default();
        }
        Err(e) => {
            warn!("Could not read style {:?}: {}", path, e);
            return ThemeConfig::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring style {:?}: {}", path, e);
        ThemeConfig::default()
    })
}
