use std::collections::HashSet;

use strata_types::ViewKind;

use super::DocumentController;
use crate::error::Result;
use crate::store::{paths, ProjectStore};

impl<S: ProjectStore> DocumentController<S> {
    /// Store an asset blob for `kind`. Write it before dispatching the edit
    /// that references it.
    pub fn import_asset(&mut self, kind: ViewKind, filename: &str, blob: &[u8]) -> Result<String> {
        let meta = &self.document.meta;
        self.store
            .put_blob_file(&meta.id, &paths::asset(meta, kind, filename), blob)?;
        Ok(paths::asset(meta, kind, filename))
    }

    /// Delete every stored asset no layer references. When anything is
    /// deleted the undo history is cleared, since older snapshots may point
    /// at the removed blobs. Returns the deleted paths.
    pub fn sweep_assets(&mut self) -> Result<Vec<String>> {
        let meta = self.document.meta.clone();
        let mut deleted = Vec::new();
        for kind in ViewKind::ALL {
            let referenced: HashSet<String> =
                self.document.view(kind).asset_refs().into_iter().collect();
            let prefix = paths::assets_prefix(&meta, kind);
            for path in self.store.list_files(&meta.id, &prefix)? {
                let filename = path.strip_prefix(prefix.as_str()).unwrap_or(&path);
                if !referenced.contains(filename) {
                    self.store.delete_file(&meta.id, &path)?;
                    deleted.push(path);
                }
            }
        }
        if !deleted.is_empty() {
            self.history.clear();
            log::info!(
                target: "editor",
                "asset sweep removed {} file(s) from {}",
                deleted.len(),
                meta.id
            );
        }
        Ok(deleted)
    }
}
