use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::editor::DEFAULT_CASCADE_STEP;
use crate::geometry::CanvasSize;
use crate::render::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "certkit";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_VERIFY_BASE_URL: &str = "http://localhost:3000";

/// Editor and renderer settings from `config.json`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub verify_base_url: String,
    pub locale: Locale,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cascade_step: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            verify_base_url: DEFAULT_VERIFY_BASE_URL.to_string(),
            locale: Locale::default(),
            canvas_width: CanvasSize::LANDSCAPE_A4.width,
            canvas_height: CanvasSize::LANDSCAPE_A4.height,
            cascade_step: DEFAULT_CASCADE_STEP,
        }
    }
}

impl EditorConfig {
    /// Configured canvas, or landscape A4 when either side is zero.
    pub fn canvas_size(&self) -> CanvasSize {
        let size = CanvasSize::new(self.canvas_width, self.canvas_height);
        if size.is_empty() {
            tracing::warn!(?size, "configured canvas is empty; using A4 landscape");
            return CanvasSize::LANDSCAPE_A4;
        }
        size
    }
}

pub fn load_editor_config() -> EditorConfig {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match config_file_path(xdg_config_home, home) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(?err, "no config directory; using defaults");
            return EditorConfig::default();
        }
    };
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return EditorConfig::default(),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            return EditorConfig::default();
        }
    };
    parse_editor_config(&contents).unwrap_or_else(|err| {
        tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
        EditorConfig::default()
    })
}

pub fn parse_editor_config(contents: &str) -> serde_json::Result<EditorConfig> {
    serde_json::from_str(contents)
}

/// `$XDG_CONFIG_HOME/certkit/config.json`, falling back to `~/.config` when
/// the XDG variable is unset or empty.
pub(crate) fn config_file_path(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let root = match xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home
            .ok_or(ConfigPathError::MissingHomeDirectory)?
            .join(".config"),
    };
    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}
