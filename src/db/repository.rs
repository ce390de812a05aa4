use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{ImportedNotebook, Notebook};

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Opens (or creates) the database and applies the schema. Safe to call
    /// on every start; the schema statements are all IF NOT EXISTS.
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    pub async fn list_all(&self) -> Result<Vec<Notebook>> {
        let notebooks = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, video_url, notes, progress_time_seconds, created_at
                     FROM notebooks ORDER BY created_at DESC, id DESC",
                )?;
                let notebooks = stmt
                    .query_map([], |row| Ok(notebook_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notebooks)
            })
            .await?;
        Ok(notebooks)
    }

    pub async fn create(&self, title: &str, video_url: &str) -> Result<i64> {
        if title.trim().is_empty() {
            return Err(AppError::validation("notebook title must not be empty"));
        }
        if video_url.trim().is_empty() {
            return Err(AppError::validation("video URL must not be empty"));
        }

        let title = title.to_string();
        let video_url = video_url.to_string();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO notebooks (title, video_url, notes, progress_time_seconds)
                     VALUES (?1, ?2, '', 0)",
                    params![title, video_url],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Notebook> {
        let notebook = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, video_url, notes, progress_time_seconds, created_at
                     FROM notebooks WHERE id = ?1",
                )?;
                let notebook = stmt
                    .query_row(params![id], |row| Ok(notebook_from_row(row)))
                    .optional()?;
                Ok(notebook)
            })
            .await?;
        notebook.ok_or(AppError::NotFound(id))
    }

    pub async fn update_title(&self, id: i64, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(AppError::validation("notebook title must not be empty"));
        }

        let title = title.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let rows = conn.execute(
                    "UPDATE notebooks SET title = ?1 WHERE id = ?2",
                    params![title, id],
                )?;
                Ok(rows)
            })
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }

    /// Overwrites notes and progress unconditionally in a single statement.
    /// There is no partial-field update; callers always supply both.
    pub async fn update_notes(&self, id: i64, notes: &str, progress_seconds: u32) -> Result<()> {
        let notes = notes.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let rows = conn.execute(
                    "UPDATE notebooks SET notes = ?1, progress_time_seconds = ?2 WHERE id = ?3",
                    params![notes, progress_seconds, id],
                )?;
                Ok(rows)
            })
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }

    /// Idempotent: deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM notebooks WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Appends imported rows in one transaction. Either every row lands or
    /// none do; existing rows are never touched and all ids are fresh.
    pub async fn append_imported(&self, rows: Vec<ImportedNotebook>) -> Result<usize> {
        let count = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut with_ts = tx.prepare(
                        "INSERT INTO notebooks (title, video_url, notes, progress_time_seconds, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    let mut without_ts = tx.prepare(
                        "INSERT INTO notebooks (title, video_url, notes, progress_time_seconds)
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for row in &rows {
                        match &row.created_at {
                            Some(ts) => {
                                with_ts.execute(params![
                                    row.title,
                                    row.video_url,
                                    row.notes,
                                    row.progress_time_seconds,
                                    ts,
                                ])?;
                            }
                            None => {
                                without_ts.execute(params![
                                    row.title,
                                    row.video_url,
                                    row.notes,
                                    row.progress_time_seconds,
                                ])?;
                            }
                        }
                    }
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await?;
        Ok(count)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn notebook_from_row(row: &Row) -> Notebook {
    Notebook {
        id: row.get(0).unwrap(),
        title: row.get(1).unwrap(),
        video_url: row.get(2).unwrap(),
        notes: row.get(3).unwrap(),
        progress_time_seconds: row.get::<_, i64>(4).unwrap().max(0) as u32,
        created_at: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("notebooks.db");
        let repo = Repository::open(db_path.to_str().unwrap()).await.unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("notebooks.db");
        let path = db_path.to_str().unwrap();

        let repo = Repository::open(path).await.unwrap();
        repo.create("First", "https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();
        drop(repo);

        // Reopening applies the schema again without clobbering data
        let repo = Repository::open(path).await.unwrap();
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, repo) = test_repo().await;
        let id = repo
            .create("Rust Lecture", "https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();

        let notebook = repo.get(id).await.unwrap();
        assert_eq!(notebook.id, id);
        assert_eq!(notebook.title, "Rust Lecture");
        assert_eq!(notebook.video_url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(notebook.notes, "");
        assert_eq!(notebook.progress_time_seconds, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_inputs() {
        let (_dir, repo) = test_repo().await;
        let err = repo.create("", "https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = repo.create("Title", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let (_dir, repo) = test_repo().await;
        let first = repo.create("a", "u1").await.unwrap();
        let second = repo.create("b", "u2").await.unwrap();
        let third = repo.create("c", "u3").await.unwrap();

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_update_notes_overwrites_both_fields() {
        let (_dir, repo) = test_repo().await;
        let id = repo.create("t", "u").await.unwrap();

        repo.update_notes(id, "<p>old</p>", 10).await.unwrap();
        repo.update_notes(id, "x", 42).await.unwrap();

        let notebook = repo.get(id).await.unwrap();
        assert_eq!(notebook.notes, "x");
        assert_eq!(notebook.progress_time_seconds, 42);
    }

    #[tokio::test]
    async fn test_update_notes_missing_id() {
        let (_dir, repo) = test_repo().await;
        let err = repo.update_notes(999, "x", 0).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_update_title() {
        let (_dir, repo) = test_repo().await;
        let id = repo.create("old", "u").await.unwrap();

        repo.update_title(id, "new").await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().title, "new");

        // Unchanged title is a valid no-op call
        repo.update_title(id, "new").await.unwrap();

        let err = repo.update_title(id, "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = repo.update_title(999, "x").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, repo) = test_repo().await;
        let id = repo.create("t", "u").await.unwrap();

        repo.delete(id).await.unwrap();
        let err = repo.get(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Second delete of the same id is not an error
        repo.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_append_imported() {
        let (_dir, repo) = test_repo().await;
        let existing = repo.create("kept", "u").await.unwrap();

        let rows = vec![
            ImportedNotebook {
                title: "a".into(),
                video_url: "u1".into(),
                notes: "<p>n</p>".into(),
                progress_time_seconds: 5,
                created_at: Some("2024-03-01 10:00:00".into()),
            },
            ImportedNotebook {
                title: "b".into(),
                video_url: "u2".into(),
                notes: "".into(),
                progress_time_seconds: 0,
                created_at: None,
            },
        ];
        let count = repo.append_imported(rows).await.unwrap();
        assert_eq!(count, 2);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|n| n.id == existing && n.title == "kept"));

        let a = all.iter().find(|n| n.title == "a").unwrap();
        assert_eq!(a.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(a.progress_time_seconds, 5);
    }
}
