pub mod clipboard;
pub mod keypath;
pub mod project;
pub mod view;

pub use clipboard::{Clipboard, ClipboardContents};
pub use keypath::{KeyPath, PropertyOverride};
pub use project::{ProjectDocument, ProjectMeta};
pub use view::*;
