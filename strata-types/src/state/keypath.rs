//! Redirectable property key paths and per-state overrides.

use serde::{Deserialize, Serialize};

use crate::LayerId;

/// The fixed set of numeric key paths a state may override. The string
/// forms are a contract with the rendering runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyPath {
    #[serde(rename = "position.x")]
    PositionX,
    #[serde(rename = "position.y")]
    PositionY,
    #[serde(rename = "zPosition")]
    ZPosition,
    #[serde(rename = "bounds.size.width")]
    BoundsWidth,
    #[serde(rename = "bounds.size.height")]
    BoundsHeight,
    #[serde(rename = "transform.rotation.x")]
    RotationX,
    #[serde(rename = "transform.rotation.y")]
    RotationY,
    #[serde(rename = "transform.rotation.z")]
    RotationZ,
    #[serde(rename = "opacity")]
    Opacity,
    #[serde(rename = "cornerRadius")]
    CornerRadius,
}

impl KeyPath {
    pub const ALL: [KeyPath; 10] = [
        KeyPath::PositionX,
        KeyPath::PositionY,
        KeyPath::ZPosition,
        KeyPath::BoundsWidth,
        KeyPath::BoundsHeight,
        KeyPath::RotationX,
        KeyPath::RotationY,
        KeyPath::RotationZ,
        KeyPath::Opacity,
        KeyPath::CornerRadius,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyPath::PositionX => "position.x",
            KeyPath::PositionY => "position.y",
            KeyPath::ZPosition => "zPosition",
            KeyPath::BoundsWidth => "bounds.size.width",
            KeyPath::BoundsHeight => "bounds.size.height",
            KeyPath::RotationX => "transform.rotation.x",
            KeyPath::RotationY => "transform.rotation.y",
            KeyPath::RotationZ => "transform.rotation.z",
            KeyPath::Opacity => "opacity",
            KeyPath::CornerRadius => "cornerRadius",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Key paths that get animated transitions between states.
    pub fn is_transitioned(self) -> bool {
        matches!(self, KeyPath::Opacity | KeyPath::CornerRadius | KeyPath::ZPosition)
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, KeyPath::RotationX | KeyPath::RotationY | KeyPath::RotationZ)
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(target, key path, value)` setter scoped to a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyOverride {
    pub target_id: LayerId,
    pub key_path: KeyPath,
    pub value: f64,
}

impl PropertyOverride {
    pub fn new(target_id: LayerId, key_path: KeyPath, value: f64) -> Self {
        Self {
            target_id,
            key_path,
            value,
        }
    }
}
