//! CAML codec: CA views to and from the XML interchange format read by the
//! rendering runtime.
//!
//! Serialization wraps the view's layers in a synthetic `Root Layer` sized
//! to the project canvas, then appends one `LKState` per named state and the
//! transitions derived from the override map. Parsing reverses this; a file
//! that fails to parse degrades to an empty view through
//! [`parse_view_or_empty`] so one bad file never sinks a whole project.

mod read;
pub mod transform;
mod write;
pub mod xml;

use strata_types::{CaView, Color, ProjectMeta, Size, ViewKind};

use crate::error::Result;

pub const CAML_NS: &str = "http://www.apple.com/CoreAnimation/1.0";
pub const ROOT_LAYER_NAME: &str = "Root Layer";
pub const ROOT_LAYER_ID: &str = "__root";

/// Fixed `index.xml` pointing the bundle at `main.caml`.
pub const INDEX_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>rootDocument</key>
	<string>main.caml</string>
</dict>
</plist>
"#;

/// Fixed asset manifest stub.
pub const ASSET_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<caml xmlns="http://www.apple.com/CoreAnimation/1.0">
  <MicaAssetManifest>
    <modules type="NSArray"/>
  </MicaAssetManifest>
</caml>
"#;

/// Geometry of the synthetic root layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub size: Size,
    pub background_color: Color,
    pub geometry_flipped: bool,
}

impl Canvas {
    pub fn from_meta(meta: &ProjectMeta) -> Self {
        Self {
            size: Size::new(meta.width, meta.height),
            background_color: meta.background_color,
            geometry_flipped: meta.geometry_flipped,
        }
    }
}

/// A parsed view plus the canvas its root layer described, when it had one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCaml {
    pub view: CaView,
    pub canvas: Option<Canvas>,
}

pub fn serialize_view(view: &CaView, canvas: &Canvas) -> Result<String> {
    let doc = xml::Document {
        header_comments: view.header_comments.clone(),
        root: write::view_to_element(view, canvas),
    };
    xml::write_document(&doc)
}

pub fn parse_view(text: &str, kind: ViewKind) -> Result<ParsedCaml> {
    let doc = xml::read_document(text)?;
    read::document_to_view(&doc, kind)
}

/// Parse, degrading to an empty view on failure.
pub fn parse_view_or_empty(text: &str, kind: ViewKind) -> CaView {
    match parse_view(text, kind) {
        Ok(parsed) => parsed.view,
        Err(e) => {
            log::warn!(target: "codec", "{} view failed to parse, loading empty: {}", kind, e);
            CaView::new(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{Layer, LayerKind, LayerSubtree, TextContent};

    fn canvas() -> Canvas {
        Canvas {
            size: Size::new(390.0, 844.0),
            background_color: Color::rgb(10, 20, 30),
            geometry_flipped: true,
        }
    }

    #[test]
    fn empty_view_round_trips_with_default_states() {
        let view = CaView::new(ViewKind::Floating);
        let text = serialize_view(&view, &canvas()).unwrap();
        let parsed = parse_view(&text, ViewKind::Floating).unwrap();
        assert_eq!(parsed.view, view);
        assert_eq!(parsed.canvas, Some(canvas()));
    }

    #[test]
    fn header_comment_follows_declaration() {
        let mut view = CaView::new(ViewKind::Background);
        view.header_comments = vec![" exported by hand ".into(), " second ".into()];
        let text = serialize_view(&view, &canvas()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("<?xml"));
        assert_eq!(lines.next().unwrap().trim(), "<!-- exported by hand -->");
        assert_eq!(lines.next().unwrap().trim(), "<!-- second -->");

        let parsed = parse_view(&text, ViewKind::Background).unwrap();
        assert_eq!(parsed.view.header_comments, view.header_comments);
    }

    #[test]
    fn bare_layer_root_is_kept() {
        let text = r#"<caml xmlns="http://www.apple.com/CoreAnimation/1.0"><CATextLayer id="t" name="Title" string="Hi"/></caml>"#;
        let parsed = parse_view(text, ViewKind::Floating).unwrap();
        assert_eq!(parsed.canvas, None);
        let layer = parsed.view.tree.get(&"t".into()).unwrap();
        assert_eq!(layer.name, "Title");
        match &layer.kind {
            LayerKind::Text(text) => assert_eq!(text.string, "Hi"),
            other => panic!("expected text layer, got {other:?}"),
        }
    }

    #[test]
    fn garbage_degrades_to_empty_view() {
        let view = parse_view_or_empty("<caml><CALayer>", ViewKind::Wallpaper);
        assert_eq!(view, CaView::new(ViewKind::Wallpaper));
        let view = parse_view_or_empty("<notcaml/>", ViewKind::Floating);
        assert!(view.tree.is_empty());
    }

    #[test]
    fn layer_classes_match_kinds() {
        let mut view = CaView::new(ViewKind::Floating);
        view.tree.append_child(
            None,
            LayerSubtree::leaf(Layer::new(LayerKind::Text(TextContent::default())).with_id("a")),
        );
        let text = serialize_view(&view, &canvas()).unwrap();
        assert!(text.contains("<CATextLayer"));
        assert!(text.contains(r#"name="Root Layer""#));
        assert!(text.contains(r#"geometryFlipped="1""#));
    }
}
