//! Bundle path convention: `<ProjectName>.ca/<ViewFolder>/...`.

use strata_types::{ProjectMeta, ViewKind};

pub const MAIN_CAML: &str = "main.caml";
pub const INDEX_XML: &str = "index.xml";
pub const ASSET_MANIFEST: &str = "assetManifest.caml";
pub const ASSETS_DIR: &str = "assets";

/// `<Name>.ca/`, the prefix of every file in the project's bundle.
pub fn bundle_prefix(meta: &ProjectMeta) -> String {
    format!("{}/", meta.bundle_folder())
}

/// `<Name>.ca/<ViewFolder>/`
pub fn view_prefix(meta: &ProjectMeta, kind: ViewKind) -> String {
    format!("{}/{}/", meta.bundle_folder(), kind.folder())
}

pub fn main_caml(meta: &ProjectMeta, kind: ViewKind) -> String {
    format!("{}{MAIN_CAML}", view_prefix(meta, kind))
}

pub fn index_xml(meta: &ProjectMeta, kind: ViewKind) -> String {
    format!("{}{INDEX_XML}", view_prefix(meta, kind))
}

pub fn asset_manifest(meta: &ProjectMeta, kind: ViewKind) -> String {
    format!("{}{ASSET_MANIFEST}", view_prefix(meta, kind))
}

/// `<Name>.ca/<ViewFolder>/assets/`
pub fn assets_prefix(meta: &ProjectMeta, kind: ViewKind) -> String {
    format!("{}{ASSETS_DIR}/", view_prefix(meta, kind))
}

pub fn asset(meta: &ProjectMeta, kind: ViewKind, filename: &str) -> String {
    format!("{}{filename}", assets_prefix(meta, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_bundle_layout() {
        let meta = ProjectMeta::new("p", "Sunset", 390.0, 844.0);
        assert_eq!(bundle_prefix(&meta), "Sunset.ca/");
        assert_eq!(main_caml(&meta, ViewKind::Floating), "Sunset.ca/Floating.ca/main.caml");
        assert_eq!(index_xml(&meta, ViewKind::Background), "Sunset.ca/Background.ca/index.xml");
        assert_eq!(
            asset(&meta, ViewKind::Wallpaper, "sun.png"),
            "Sunset.ca/Wallpaper.ca/assets/sun.png"
        );
    }
}
