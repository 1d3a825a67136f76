//! CA view documents: one independent layer forest plus its states.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::keypath::PropertyOverride;
use crate::tree::LayerTree;
use crate::LayerId;

/// The implicit default state. Never stored in the override map.
pub const BASE_STATE: &str = "Base State";

/// The fixed named states every view starts with.
pub const FIXED_STATES: [&str; 3] = ["Locked", "Unlock", "Sleep"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Background,
    Floating,
    Wallpaper,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Background, ViewKind::Floating, ViewKind::Wallpaper];

    /// Folder name inside the project bundle.
    pub fn folder(self) -> &'static str {
        match self {
            ViewKind::Background => "Background.ca",
            ViewKind::Floating => "Floating.ca",
            ViewKind::Wallpaper => "Wallpaper.ca",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Background => "background",
            ViewKind::Floating => "floating",
            ViewKind::Wallpaper => "wallpaper",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Views that are live for a project with the given gyro flag.
    pub fn active_for(gyro_enabled: bool) -> &'static [ViewKind] {
        if gyro_enabled {
            &[ViewKind::Wallpaper]
        } else {
            &[ViewKind::Background, ViewKind::Floating]
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    pub fn suffix(self) -> &'static str {
        match self {
            Appearance::Light => "Light",
            Appearance::Dark => "Dark",
        }
    }
}

/// Parallax mapping for gyro wallpapers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallpaperParallax {
    pub groups: Vec<ParallaxGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxGroup {
    pub title: String,
    pub layer_name: String,
    pub key_path: String,
    pub axis: ParallaxAxis,
    pub map_min_to: f64,
    pub map_max_to: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParallaxAxis {
    X,
    Y,
}

impl ParallaxAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            ParallaxAxis::X => "x",
            ParallaxAxis::Y => "y",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x" | "X" => Some(ParallaxAxis::X),
            "y" | "Y" => Some(ParallaxAxis::Y),
            _ => None,
        }
    }
}

/// One layer forest with its named states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaView {
    pub kind: ViewKind,
    pub tree: LayerTree,
    /// UI cursor; not serialized to CAML.
    #[serde(skip)]
    pub selected: Option<LayerId>,
    pub state_names: Vec<String>,
    pub state_overrides: BTreeMap<String, Vec<PropertyOverride>>,
    pub active_state: String,
    pub appearance_split: bool,
    pub appearance: Appearance,
    /// Comments found before the first layer, in order, written back verbatim.
    pub header_comments: Vec<String>,
    pub parallax: Option<WallpaperParallax>,
}

impl CaView {
    /// An empty view with the three fixed states and no layers.
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            tree: LayerTree::new(),
            selected: None,
            state_names: FIXED_STATES.iter().map(|s| s.to_string()).collect(),
            state_overrides: FIXED_STATES
                .iter()
                .map(|s| (s.to_string(), Vec::new()))
                .collect(),
            active_state: BASE_STATE.to_string(),
            appearance_split: false,
            appearance: Appearance::Light,
            header_comments: Vec::new(),
            parallax: None,
        }
    }

    pub fn is_base_active(&self) -> bool {
        self.active_state == BASE_STATE
    }

    pub fn overrides(&self, state: &str) -> &[PropertyOverride] {
        self.state_overrides
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every asset filename referenced by this view's layers.
    pub fn asset_refs(&self) -> Vec<String> {
        self.tree.iter().flat_map(|l| l.kind.asset_refs()).collect()
    }
}

/// `"<name> Light"` / `"<name> Dark"`.
pub fn variant_name(bare: &str, appearance: Appearance) -> String {
    format!("{bare} {}", appearance.suffix())
}

/// Strip a trailing ` Light`/` Dark` suffix, returning the bare name and
/// the variant when present.
pub fn split_variant(name: &str) -> (&str, Option<Appearance>) {
    if let Some(bare) = name.strip_suffix(" Light") {
        (bare, Some(Appearance::Light))
    } else if let Some(bare) = name.strip_suffix(" Dark") {
        (bare, Some(Appearance::Dark))
    } else {
        (name, None)
    }
}
