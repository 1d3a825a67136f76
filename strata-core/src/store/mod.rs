//! Persistence collaborator: project metadata plus a flat file namespace per
//! project, addressed by bundle-relative paths (see [`paths`]).

mod memory;
pub mod paths;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use strata_types::ProjectMeta;

use crate::error::Result;

pub trait ProjectStore {
    /// Project metadata, or `None` when the id is unknown.
    fn get(&self, project_id: &str) -> Result<Option<ProjectMeta>>;

    fn put_meta(&mut self, meta: &ProjectMeta) -> Result<()>;

    fn list_projects(&self) -> Result<Vec<ProjectMeta>>;

    /// Paths of every stored file under `path_prefix`, sorted.
    fn list_files(&self, project_id: &str, path_prefix: &str) -> Result<Vec<String>>;

    fn read_text(&self, project_id: &str, path: &str) -> Result<Option<String>>;

    fn read_blob(&self, project_id: &str, path: &str) -> Result<Option<Vec<u8>>>;

    fn put_text_file(&mut self, project_id: &str, path: &str, text: &str) -> Result<()>;

    fn put_blob_file(&mut self, project_id: &str, path: &str, blob: &[u8]) -> Result<()>;

    fn delete_file(&mut self, project_id: &str, path: &str) -> Result<()>;

    /// Rename a stored file, keeping its text/blob form. Replaces anything
    /// already at `to`.
    fn move_file(&mut self, project_id: &str, from: &str, to: &str) -> Result<()>;
}
