use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, info, warn};

use super::data::{QuickFileRecord, ResourceRecord, SearchTerm, UnifiedRow};
use crate::error::LookupError;

/// The Catalog reads the disk catalog database.
///
/// Every operation opens its own connection and closes it when done,
/// so a `Catalog` is just a path and can be cloned into background tasks.
#[derive(Debug, Clone)]
pub struct Catalog {
    db_path: PathBuf,
}

impl Catalog {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Catalog {
            db_path: db_path.into(),
        }
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the database file is present on disk
    pub fn exists(&self) -> bool {
        self.db_path.is_file()
    }

    /// Open a connection to an existing database.
    /// The file is never created, so a wrong path shows up as an error
    /// instead of an empty catalog.
    fn open(&self) -> Result<Connection, LookupError> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Find every record whose file name contains the term.
    ///
    /// Resource rows come first, then quick-file rows, each in the order
    /// SQLite returns them.
    pub fn search(&self, term: &SearchTerm) -> Result<Vec<UnifiedRow>, LookupError> {
        let conn = self.open()?;
        let pattern = term.like_pattern();

        let mut stmt = conn.prepare(
            "SELECT disk_no, category2, file_path, file_name, file_size, file_created_time, is_deleted
             FROM resource_data
             WHERE file_name LIKE ?1",
        )?;
        let resources = stmt
            .query_map([&pattern], |row| {
                Ok(ResourceRecord {
                    disk_no: text_at(row, 0)?,
                    category2: text_at(row, 1)?,
                    file_path: text_at(row, 2)?,
                    file_name: text_at(row, 3)?,
                    file_size: text_at(row, 4)?,
                    file_created_time: text_at(row, 5)?,
                    is_deleted: text_at(row, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT file_name, file_size, file_link FROM rg_4k_files WHERE file_name LIKE ?1",
        )?;
        let quick_files = stmt
            .query_map([&pattern], |row| {
                Ok(QuickFileRecord {
                    file_name: text_at(row, 0)?,
                    file_size: text_at(row, 1)?,
                    file_link: text_at(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "🔍 '{}': {} resource rows, {} quick-file rows",
            term,
            resources.len(),
            quick_files.len()
        );

        let mut rows: Vec<UnifiedRow> = resources.into_iter().map(UnifiedRow::from).collect();
        rows.extend(quick_files.into_iter().map(UnifiedRow::from));
        Ok(rows)
    }

    /// Like `search`, but a failure becomes the single error row the table shows
    pub fn lookup(&self, term: &SearchTerm) -> Vec<UnifiedRow> {
        match self.search(term) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("⚠️  Query for '{}' failed: {}", term, e);
                vec![UnifiedRow::error(format!("Query failed: {}", e))]
            }
        }
    }

    /// Set `is_deleted` on every resource row matching (disk_no, file_name).
    /// Returns the number of rows changed.
    pub fn set_deleted(
        &self,
        disk_no: &str,
        file_name: &str,
        is_deleted: &str,
    ) -> Result<usize, LookupError> {
        let conn = self.open()?;
        let changed = conn.execute(
            "UPDATE resource_data SET is_deleted = ?1 WHERE disk_no = ?2 AND file_name = ?3",
            rusqlite::params![is_deleted, disk_no, file_name],
        )?;

        if changed == 0 {
            warn!("⚠️  No resource row matched disk {} / {}", disk_no, file_name);
        } else {
            info!("🗑️  is_deleted={} for disk {} / {} ({} rows)", is_deleted, disk_no, file_name, changed);
        }

        Ok(changed)
    }
}

/// Render any SQLite value as display text. NULL becomes the empty string.
fn text_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    let text = match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(text)
}

/// Run a lookup on a blocking worker thread
pub async fn lookup_async(catalog: Catalog, term: SearchTerm) -> Vec<UnifiedRow> {
    task::spawn_blocking(move || catalog.lookup(&term))
        .await
        .unwrap_or_else(|e| {
            let e = LookupError::from(e);
            warn!("⚠️  Lookup task failed: {}", e);
            vec![UnifiedRow::error(format!("Query failed: {}", e))]
        })
}

/// Write a deletion flag on a blocking worker thread
pub async fn set_deleted_async(
    catalog: Catalog,
    disk_no: String,
    file_name: String,
    is_deleted: String,
) -> Result<(), String> {
    task::spawn_blocking(move || catalog.set_deleted(&disk_no, &file_name, &is_deleted))
        .await
        .map_err(LookupError::from)
        .and_then(|result| result)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
