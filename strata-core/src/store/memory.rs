use std::collections::{BTreeMap, HashMap};

use strata_types::ProjectMeta;

use super::ProjectStore;
use crate::error::{Result, StrataError};

#[derive(Debug, Clone, PartialEq)]
enum StoredFile {
    Text(String),
    Blob(Vec<u8>),
}

/// In-process store. Optionally fails every write, for exercising the
/// controller's failure path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: HashMap<String, ProjectMeta>,
    files: HashMap<String, BTreeMap<String, StoredFile>>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful file writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(StrataError::Store("writes disabled".to_string()));
        }
        Ok(())
    }

    fn file(&self, project_id: &str, path: &str) -> Option<&StoredFile> {
        self.files.get(project_id).and_then(|f| f.get(path))
    }

    fn put(&mut self, project_id: &str, path: &str, file: StoredFile) -> Result<()> {
        self.check_writable()?;
        self.files
            .entry(project_id.to_string())
            .or_default()
            .insert(path.to_string(), file);
        self.writes += 1;
        Ok(())
    }
}

impl ProjectStore for MemoryStore {
    fn get(&self, project_id: &str) -> Result<Option<ProjectMeta>> {
        Ok(self.projects.get(project_id).cloned())
    }

    fn put_meta(&mut self, meta: &ProjectMeta) -> Result<()> {
        self.check_writable()?;
        self.projects.insert(meta.id.clone(), meta.clone());
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<ProjectMeta>> {
        let mut all: Vec<ProjectMeta> = self.projects.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn list_files(&self, project_id: &str, path_prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .files
            .get(project_id)
            .map(|files| {
                files
                    .keys()
                    .filter(|p| p.starts_with(path_prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_text(&self, project_id: &str, path: &str) -> Result<Option<String>> {
        Ok(match self.file(project_id, path) {
            Some(StoredFile::Text(text)) => Some(text.clone()),
            Some(StoredFile::Blob(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            None => None,
        })
    }

    fn read_blob(&self, project_id: &str, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(match self.file(project_id, path) {
            Some(StoredFile::Blob(bytes)) => Some(bytes.clone()),
            Some(StoredFile::Text(text)) => Some(text.as_bytes().to_vec()),
            None => None,
        })
    }

    fn put_text_file(&mut self, project_id: &str, path: &str, text: &str) -> Result<()> {
        self.put(project_id, path, StoredFile::Text(text.to_string()))
    }

    fn put_blob_file(&mut self, project_id: &str, path: &str, blob: &[u8]) -> Result<()> {
        self.put(project_id, path, StoredFile::Blob(blob.to_vec()))
    }

    fn delete_file(&mut self, project_id: &str, path: &str) -> Result<()> {
        self.check_writable()?;
        if let Some(files) = self.files.get_mut(project_id) {
            files.remove(path);
        }
        Ok(())
    }

    fn move_file(&mut self, project_id: &str, from: &str, to: &str) -> Result<()> {
        self.check_writable()?;
        let files = self
            .files
            .get_mut(project_id)
            .ok_or_else(|| StrataError::NotFound(format!("{project_id}/{from}")))?;
        let file = files
            .remove(from)
            .ok_or_else(|| StrataError::NotFound(format!("{project_id}/{from}")))?;
        files.insert(to.to_string(), file);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_files_filters_by_prefix() {
        let mut store = MemoryStore::new();
        store.put_text_file("p", "A.ca/Floating.ca/main.caml", "<caml/>").unwrap();
        store.put_blob_file("p", "A.ca/Floating.ca/assets/x.png", &[1, 2]).unwrap();
        store.put_blob_file("p", "A.ca/Background.ca/assets/y.png", &[3]).unwrap();

        let assets = store.list_files("p", "A.ca/Floating.ca/assets/").unwrap();
        assert_eq!(assets, vec!["A.ca/Floating.ca/assets/x.png"]);
        assert!(store.list_files("other", "").unwrap().is_empty());
    }

    #[test]
    fn move_keeps_the_file_form() {
        let mut store = MemoryStore::new();
        store.put_text_file("p", "A.ca/Floating.ca/main.caml", "<caml/>").unwrap();
        store.put_blob_file("p", "A.ca/Floating.ca/assets/x.png", &[1, 2]).unwrap();

        store.move_file("p", "A.ca/Floating.ca/main.caml", "B.ca/Floating.ca/main.caml").unwrap();
        store.move_file("p", "A.ca/Floating.ca/assets/x.png", "B.ca/Floating.ca/assets/x.png").unwrap();

        assert!(store.list_files("p", "A.ca/").unwrap().is_empty());
        assert_eq!(
            store.file("p", "B.ca/Floating.ca/main.caml"),
            Some(&StoredFile::Text("<caml/>".to_string()))
        );
        assert_eq!(
            store.file("p", "B.ca/Floating.ca/assets/x.png"),
            Some(&StoredFile::Blob(vec![1, 2]))
        );
        assert!(store.move_file("p", "missing", "elsewhere").is_err());
    }

    #[test]
    fn failing_store_rejects_writes() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.put_text_file("p", "f", "x").is_err());
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.read_text("p", "f").unwrap(), None);
    }
}
