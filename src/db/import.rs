use std::path::Path;

use rusqlite::OpenFlags;

use crate::error::{AppError, Result};
use crate::models::{ImportReport, ImportedNotebook};

use super::repository::Repository;

const REQUIRED_COLUMNS: [&str; 4] = ["title", "video_url", "notes", "progress_time_seconds"];

/// Validates an external database file and appends its notebook rows to the
/// local store. Existing local rows are never mutated or replaced; the
/// destination assigns fresh ids. Validation failures abort before any write,
/// and the batch insert itself is transactional.
pub async fn import_notebooks(repo: &Repository, path: &Path) -> Result<ImportReport> {
    let rows = read_source_rows(path)?;

    if rows.is_empty() {
        tracing::info!("no notebook rows to import from {}", path.display());
        return Ok(ImportReport { imported: 0 });
    }

    let imported = repo.append_imported(rows).await?;
    tracing::info!("imported {} notebooks from {}", imported, path.display());
    Ok(ImportReport { imported })
}

fn read_source_rows(path: &Path) -> Result<Vec<ImportedNotebook>> {
    let conn = open_source(path)?;

    let table_count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'notebooks'",
        [],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(AppError::Schema("missing notebooks table".to_string()));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(notebooks)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|col| col == *required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Schema(format!(
            "notebooks table is missing required columns: {}",
            missing.join(", ")
        )));
    }

    // Only recognized columns are read. The source's own ids and any extra
    // columns are ignored; a source timestamp is carried over verbatim.
    let has_created_at = columns.iter().any(|col| col == "created_at");
    let select = if has_created_at {
        "SELECT title, video_url, notes, progress_time_seconds, created_at FROM notebooks"
    } else {
        "SELECT title, video_url, notes, progress_time_seconds FROM notebooks"
    };

    let mut stmt = conn.prepare(select)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ImportedNotebook {
                title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                video_url: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                notes: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                progress_time_seconds: row.get::<_, Option<i64>>(3)?.unwrap_or(0).max(0) as u32,
                created_at: if has_created_at {
                    row.get::<_, Option<String>>(4)?
                } else {
                    None
                },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn open_source(path: &Path) -> Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::InvalidFile(format!("{}: {}", path.display(), e)))?;

    // SQLite opens lazily; probe the header so a non-database file is
    // rejected here instead of surfacing as a schema error later.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| AppError::InvalidFile(format!("{}: {}", path.display(), e)))?;

    Ok(conn)
}
