//! Clipboard types for copy/paste of layers between and within views.

use std::collections::BTreeMap;

use super::keypath::PropertyOverride;
use super::view::ViewKind;
use crate::tree::LayerSubtree;

/// Copied layers with everything needed to paste them elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardContents {
    pub layers: Vec<LayerSubtree>,
    pub source_view: ViewKind,
    /// Asset filenames referenced by `layers`.
    pub assets: Vec<String>,
    /// Overrides targeting copied layers, keyed by state name.
    pub overrides: BTreeMap<String, Vec<PropertyOverride>>,
}

/// App-wide clipboard (lives on the document controller)
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    pub contents: Option<ClipboardContents>,
}
