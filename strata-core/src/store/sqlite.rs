use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use strata_types::ProjectMeta;

use super::schema::{self, SCHEMA_VERSION};
use super::ProjectStore;
use crate::error::{Result, StrataError};

/// SQLite-backed store. One database holds every project.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        schema::create_tables(&conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            params![SCHEMA_VERSION],
        )?;
        log::debug!(target: "store", "sqlite store ready (schema v{})", SCHEMA_VERSION);
        Ok(Self { conn })
    }

    /// Default database location under the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("strata").join("projects.sqlite"))
            .unwrap_or_else(|| PathBuf::from("strata.sqlite"))
    }
}

impl ProjectStore for SqliteStore {
    fn get(&self, project_id: &str) -> Result<Option<ProjectMeta>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT meta_json FROM projects WHERE id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        })
    }

    fn put_meta(&mut self, meta: &ProjectMeta) -> Result<()> {
        let json = serde_json::to_string(meta)?;
        self.conn.execute(
            "INSERT INTO projects (id, meta_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET meta_json = excluded.meta_json",
            params![meta.id, json],
        )?;
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<ProjectMeta>> {
        let mut stmt = self.conn.prepare("SELECT meta_json FROM projects")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for json in rows {
            out.push(serde_json::from_str::<ProjectMeta>(&json?)?);
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn list_files(&self, project_id: &str, path_prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT path FROM files WHERE project_id = ?1 AND substr(path, 1, length(?2)) = ?2
             ORDER BY path",
        )?;
        let rows = stmt.query_map(params![project_id, path_prefix], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    fn read_text(&self, project_id: &str, path: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>, Option<Vec<u8>>)> = self
            .conn
            .query_row(
                "SELECT text, blob FROM files WHERE project_id = ?1 AND path = ?2",
                params![project_id, path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(text, blob)| {
            text.or_else(|| blob.map(|b| String::from_utf8_lossy(&b).into_owned()))
        }))
    }

    fn read_blob(&self, project_id: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Option<String>, Option<Vec<u8>>)> = self
            .conn
            .query_row(
                "SELECT text, blob FROM files WHERE project_id = ?1 AND path = ?2",
                params![project_id, path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(text, blob)| blob.or_else(|| text.map(String::into_bytes))))
    }

    fn put_text_file(&mut self, project_id: &str, path: &str, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO files (project_id, path, text, blob) VALUES (?1, ?2, ?3, NULL)",
            params![project_id, path, text],
        )?;
        Ok(())
    }

    fn put_blob_file(&mut self, project_id: &str, path: &str, blob: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO files (project_id, path, text, blob) VALUES (?1, ?2, NULL, ?3)",
            params![project_id, path, blob],
        )?;
        Ok(())
    }

    fn delete_file(&mut self, project_id: &str, path: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM files WHERE project_id = ?1 AND path = ?2",
            params![project_id, path],
        )?;
        Ok(())
    }

    fn move_file(&mut self, project_id: &str, from: &str, to: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM files WHERE project_id = ?1 AND path = ?2",
            params![project_id, to],
        )?;
        let moved = tx.execute(
            "UPDATE files SET path = ?3 WHERE project_id = ?1 AND path = ?2",
            params![project_id, from, to],
        )?;
        if moved == 0 {
            return Err(StrataError::NotFound(format!("{project_id}/{from}")));
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.sqlite");
        let meta = ProjectMeta::new("p1", "Aurora", 390.0, 844.0);
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.put_meta(&meta).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("p1").unwrap(), Some(meta));
        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(store.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn files_text_blob_and_prefix_listing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put_text_file("p", "A.ca/Floating.ca/main.caml", "<caml/>").unwrap();
        store.put_blob_file("p", "A.ca/Floating.ca/assets/a.png", &[0, 159, 146, 150]).unwrap();
        store.put_blob_file("p", "A.ca/Floating.ca/assets/b.png", &[1]).unwrap();

        assert_eq!(
            store.read_text("p", "A.ca/Floating.ca/main.caml").unwrap().as_deref(),
            Some("<caml/>")
        );
        assert_eq!(
            store.read_blob("p", "A.ca/Floating.ca/assets/a.png").unwrap(),
            Some(vec![0, 159, 146, 150])
        );
        assert_eq!(store.list_files("p", "A.ca/Floating.ca/assets/").unwrap().len(), 2);

        store.delete_file("p", "A.ca/Floating.ca/assets/a.png").unwrap();
        assert_eq!(
            store.list_files("p", "A.ca/Floating.ca/assets/").unwrap(),
            vec!["A.ca/Floating.ca/assets/b.png"]
        );
    }

    #[test]
    fn rewriting_a_file_replaces_it() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put_text_file("p", "f", "one").unwrap();
        store.put_text_file("p", "f", "two").unwrap();
        assert_eq!(store.read_text("p", "f").unwrap().as_deref(), Some("two"));
        assert_eq!(store.list_files("p", "").unwrap().len(), 1);
    }

    #[test]
    fn move_file_replaces_target_and_keeps_blob() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put_blob_file("p", "A.ca/Floating.ca/assets/a.png", &[7, 8]).unwrap();
        store.put_text_file("p", "B.ca/Floating.ca/assets/a.png", "stale").unwrap();

        store
            .move_file("p", "A.ca/Floating.ca/assets/a.png", "B.ca/Floating.ca/assets/a.png")
            .unwrap();
        assert!(store.list_files("p", "A.ca/").unwrap().is_empty());
        assert_eq!(
            store.read_blob("p", "B.ca/Floating.ca/assets/a.png").unwrap(),
            Some(vec![7, 8])
        );
        assert!(store.move_file("p", "nope", "elsewhere").is_err());
    }
}
