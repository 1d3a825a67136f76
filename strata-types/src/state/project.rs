//! Project metadata and the full project document.

use serde::{Deserialize, Serialize};

use super::view::{CaView, ViewKind};
use crate::color::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub background_color: Color,
    /// Project-wide coordinate convention: y grows downward when set.
    #[serde(default)]
    pub geometry_flipped: bool,
    /// Selects the wallpaper view over the background/floating pair.
    #[serde(default)]
    pub gyro_enabled: bool,
}

impl ProjectMeta {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            background_color: Color::BLACK,
            geometry_flipped: false,
            gyro_enabled: false,
        }
    }

    /// Bundle folder name, `<name>.ca`.
    pub fn bundle_folder(&self) -> String {
        format!("{}.ca", self.name)
    }
}

/// Metadata plus the three CA views. Views not selected by the gyro flag
/// are kept but not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub meta: ProjectMeta,
    pub background: CaView,
    pub floating: CaView,
    pub wallpaper: CaView,
}

impl ProjectDocument {
    pub fn new(meta: ProjectMeta) -> Self {
        Self {
            meta,
            background: CaView::new(ViewKind::Background),
            floating: CaView::new(ViewKind::Floating),
            wallpaper: CaView::new(ViewKind::Wallpaper),
        }
    }

    pub fn view(&self, kind: ViewKind) -> &CaView {
        match kind {
            ViewKind::Background => &self.background,
            ViewKind::Floating => &self.floating,
            ViewKind::Wallpaper => &self.wallpaper,
        }
    }

    pub fn view_mut(&mut self, kind: ViewKind) -> &mut CaView {
        match kind {
            ViewKind::Background => &mut self.background,
            ViewKind::Floating => &mut self.floating,
            ViewKind::Wallpaper => &mut self.wallpaper,
        }
    }

    pub fn active_views(&self) -> impl Iterator<Item = &CaView> {
        ViewKind::active_for(self.meta.gyro_enabled)
            .iter()
            .map(|kind| self.view(*kind))
    }
}
