use strata_types::{CaView, ProjectDocument, ProjectMeta, ViewKind};

use super::{DocumentController, SaveStatus};
use crate::codec::{self, Canvas};
use crate::config::EditorSettings;
use crate::error::{Result, StrataError};
use crate::store::{paths, ProjectStore};

impl<S: ProjectStore> DocumentController<S> {
    /// Load a stored project. A view whose `main.caml` is missing or fails
    /// to parse comes up empty.
    pub fn open(store: S, project_id: &str, settings: EditorSettings) -> Result<Self> {
        let meta = store
            .get(project_id)?
            .ok_or_else(|| StrataError::NotFound(format!("project {project_id}")))?;
        let mut document = ProjectDocument::new(meta);
        for kind in ViewKind::ALL {
            let path = paths::main_caml(&document.meta, kind);
            *document.view_mut(kind) = match store.read_text(project_id, &path)? {
                Some(text) => codec::parse_view_or_empty(&text, kind),
                None => CaView::new(kind),
            };
        }
        log::info!(
            target: "editor",
            "opened project {} ({})",
            document.meta.name,
            document.meta.id
        );
        Ok(Self::with_document(store, document, settings))
    }

    /// Create a project with empty views and write its bundle immediately.
    pub fn create(store: S, meta: ProjectMeta, settings: EditorSettings) -> Self {
        let mut controller = Self::with_document(store, ProjectDocument::new(meta), settings);
        controller.flush();
        controller
    }

    /// Cancel any pending debounce and write now.
    pub fn flush(&mut self) -> bool {
        self.scheduler.cancel();
        self.status = SaveStatus::Saving;
        match self.write_bundle() {
            Ok(()) => {
                log::info!(target: "editor", "saved project {}", self.document.meta.id);
                self.status = SaveStatus::Saved;
                true
            }
            Err(e) => {
                log::warn!(target: "editor", "save failed for {}: {}", self.document.meta.id, e);
                self.status = SaveStatus::Failed(e.to_string());
                false
            }
        }
    }

    /// Write `main.caml`, `index.xml` and the asset manifest for each active
    /// view, then the metadata.
    fn write_bundle(&mut self) -> Result<()> {
        let meta = &self.document.meta;
        let canvas = Canvas::from_meta(meta);
        for kind in ViewKind::active_for(meta.gyro_enabled) {
            let text = codec::serialize_view(self.document.view(*kind), &canvas)?;
            self.store
                .put_text_file(&meta.id, &paths::main_caml(meta, *kind), &text)?;
            self.store
                .put_text_file(&meta.id, &paths::index_xml(meta, *kind), codec::INDEX_XML)?;
            self.store.put_text_file(
                &meta.id,
                &paths::asset_manifest(meta, *kind),
                codec::ASSET_MANIFEST,
            )?;
        }
        self.store.put_meta(meta)
    }

    /// Move every stored file from `from`'s bundle folder into `to`'s and
    /// record the new metadata. On failure the files already moved go back
    /// and the error is returned.
    pub(super) fn relocate_bundle(&mut self, from: &ProjectMeta, to: &ProjectMeta) -> Result<()> {
        let old_prefix = paths::bundle_prefix(from);
        let new_prefix = paths::bundle_prefix(to);
        if old_prefix == new_prefix {
            return Ok(());
        }

        let id = from.id.as_str();
        let mut moved: Vec<(String, String)> = Vec::new();
        let result = self.store.list_files(id, &old_prefix).and_then(|files| {
            for path in files {
                let rest = path.strip_prefix(old_prefix.as_str()).unwrap_or(&path);
                let target = format!("{new_prefix}{rest}");
                self.store.move_file(id, &path, &target)?;
                moved.push((path, target));
            }
            self.store.put_meta(to)
        });

        match result {
            Ok(()) => {
                log::info!(
                    target: "editor",
                    "moved {} file(s) from {} to {}",
                    moved.len(),
                    old_prefix,
                    new_prefix
                );
                Ok(())
            }
            Err(e) => {
                log::warn!(target: "editor", "bundle move {} -> {} failed: {}", old_prefix, new_prefix, e);
                for (src, dst) in moved.iter().rev() {
                    if let Err(back) = self.store.move_file(id, dst, src) {
                        log::warn!(target: "editor", "could not restore {}: {}", src, back);
                    }
                }
                Err(e)
            }
        }
    }
}
