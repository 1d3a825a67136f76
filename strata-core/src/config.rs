use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use strata_types::{Color, ProjectMeta};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    editor: EditorConfig,
    #[serde(default)]
    preview: PreviewConfig,
    #[serde(default)]
    project: ProjectConfig,
}

#[derive(Deserialize, Default)]
struct EditorConfig {
    undo_depth: Option<usize>,
    save_debounce_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct PreviewConfig {
    max_frame_delta_ms: Option<u64>,
    reduced_motion: Option<bool>,
}

#[derive(Deserialize, Default)]
struct ProjectConfig {
    width: Option<f64>,
    height: Option<f64>,
    background_color: Option<String>,
}

/// Settings consumed by the document controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub undo_depth: usize,
    pub save_debounce: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            undo_depth: 100,
            save_debounce: Duration::from_millis(500),
        }
    }
}

/// Settings consumed by the emitter preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    pub max_frame_delta: Duration,
    pub reduced_motion: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_frame_delta: Duration::from_millis(100),
            reduced_motion: false,
        }
    }
}

pub struct Config {
    editor: EditorConfig,
    preview: PreviewConfig,
    project: ProjectConfig,
}

impl Config {
    /// Embedded defaults merged with `~/.config/strata/config.toml`.
    pub fn load() -> Self {
        let user = user_config_path()
            .filter(|path| path.exists())
            .and_then(|path| match std::fs::read_to_string(&path) {
                Ok(contents) => Some((path, contents)),
                Err(e) => {
                    log::warn!(target: "config", "could not read config {}: {}", path.display(), e);
                    None
                }
            });
        match user {
            Some((path, contents)) => Self::from_user_toml(&contents, &path.display().to_string()),
            None => Self::embedded(),
        }
    }

    /// Embedded defaults only.
    pub fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Config {
            editor: base.editor,
            preview: base.preview,
            project: base.project,
        }
    }

    /// Embedded defaults overridden field-by-field by `contents`. Malformed
    /// input is logged and ignored.
    pub fn from_user_toml(contents: &str, origin: &str) -> Self {
        let mut config = Self::embedded();
        match toml::from_str::<ConfigFile>(contents) {
            Ok(user) => {
                merge_editor(&mut config.editor, user.editor);
                merge_preview(&mut config.preview, user.preview);
                merge_project(&mut config.project, user.project);
            }
            Err(e) => {
                log::warn!(target: "config", "ignoring malformed config {}: {}", origin, e)
            }
        }
        config
    }

    pub fn editor_settings(&self) -> EditorSettings {
        let fallback = EditorSettings::default();
        EditorSettings {
            undo_depth: self.editor.undo_depth.unwrap_or(fallback.undo_depth).max(1),
            save_debounce: self
                .editor
                .save_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.save_debounce),
        }
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        let fallback = PreviewSettings::default();
        PreviewSettings {
            max_frame_delta: self
                .preview
                .max_frame_delta_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.max_frame_delta),
            reduced_motion: self.preview.reduced_motion.unwrap_or(fallback.reduced_motion),
        }
    }

    /// Metadata for a new project using the configured canvas defaults.
    pub fn new_project_meta(&self, id: impl Into<String>, name: impl Into<String>) -> ProjectMeta {
        let mut meta = ProjectMeta::new(
            id,
            name,
            self.project.width.unwrap_or(390.0),
            self.project.height.unwrap_or(844.0),
        );
        if let Some(color) = self
            .project
            .background_color
            .as_deref()
            .and_then(Color::from_hex)
        {
            meta.background_color = color;
        }
        meta
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("strata").join("config.toml"))
}

fn merge_editor(base: &mut EditorConfig, user: EditorConfig) {
    if user.undo_depth.is_some() {
        base.undo_depth = user.undo_depth;
    }
    if user.save_debounce_ms.is_some() {
        base.save_debounce_ms = user.save_debounce_ms;
    }
}

fn merge_preview(base: &mut PreviewConfig, user: PreviewConfig) {
    if user.max_frame_delta_ms.is_some() {
        base.max_frame_delta_ms = user.max_frame_delta_ms;
    }
    if user.reduced_motion.is_some() {
        base.reduced_motion = user.reduced_motion;
    }
}

fn merge_project(base: &mut ProjectConfig, user: ProjectConfig) {
    if user.width.is_some() {
        base.width = user.width;
    }
    if user.height.is_some() {
        base.height = user.height;
    }
    if user.background_color.is_some() {
        base.background_color = user.background_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults() {
        let config = Config::embedded();
        let editor = config.editor_settings();
        assert_eq!(editor.undo_depth, 100);
        assert_eq!(editor.save_debounce, Duration::from_millis(500));
        let preview = config.preview_settings();
        assert_eq!(preview.max_frame_delta, Duration::from_millis(100));
        assert!(!preview.reduced_motion);
        let meta = config.new_project_meta("p1", "Demo");
        assert_eq!((meta.width, meta.height), (390.0, 844.0));
        assert_eq!(meta.background_color, Color::BLACK);
    }

    #[test]
    fn user_values_override_field_by_field() {
        let config = Config::from_user_toml(
            "[editor]\nundo_depth = 5\n[preview]\nreduced_motion = true\n",
            "test",
        );
        assert_eq!(config.editor_settings().undo_depth, 5);
        assert_eq!(config.editor_settings().save_debounce, Duration::from_millis(500));
        assert!(config.preview_settings().reduced_motion);
    }

    #[test]
    fn malformed_user_config_is_ignored() {
        let config = Config::from_user_toml("[editor\nundo_depth = ", "test");
        assert_eq!(config.editor_settings().undo_depth, 100);
    }

    #[test]
    fn integer_canvas_size_parses_as_float() {
        let config = Config::from_user_toml("[project]\nwidth = 1179\nheight = 2556\n", "test");
        let meta = config.new_project_meta("p", "n");
        assert_eq!((meta.width, meta.height), (1179.0, 2556.0));
    }
}
