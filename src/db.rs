use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::player::PlaybackStore;

const PREFERRED_QUALITY_KEY: &str = "preferred_quality";

/// One video the database knows anything about.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub position_secs: Option<f64>,
    pub position_updated_at: Option<String>,
    pub last_viewed_ms: Option<i64>,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS resume_positions (
                video_id TEXT PRIMARY KEY,
                position_secs REAL NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS view_marks (
                video_id TEXT PRIMARY KEY,
                last_viewed_ms INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_resume_positions_updated_at ON resume_positions(updated_at DESC);
            "#,
        )?;
        Ok(())
    }

    pub fn upsert_resume(&self, video_id: &str, position_secs: f64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO resume_positions (video_id, position_secs, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(video_id) DO UPDATE SET
                position_secs = excluded.position_secs,
                updated_at = excluded.updated_at
            "#,
            params![video_id, position_secs, now],
        )?;
        Ok(())
    }

    pub fn resume(&self, video_id: &str) -> Result<Option<f64>> {
        let position = self
            .conn
            .query_row(
                "SELECT position_secs FROM resume_positions WHERE video_id = ?1",
                params![video_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(position)
    }

    pub fn upsert_view_mark(&self, video_id: &str, viewed_ms: i64) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO view_marks (video_id, last_viewed_ms)
            VALUES (?1, ?2)
            ON CONFLICT(video_id) DO UPDATE SET last_viewed_ms = excluded.last_viewed_ms
            "#,
            params![video_id, viewed_ms],
        )?;
        Ok(())
    }

    pub fn view_mark(&self, video_id: &str) -> Result<Option<i64>> {
        let viewed = self
            .conn
            .query_row(
                "SELECT last_viewed_ms FROM view_marks WHERE video_id = ?1",
                params![video_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(viewed)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO preferences (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Every video with a resume position or a view mark, most recently
    /// touched first.
    pub fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ids.video_id, r.position_secs, r.updated_at, v.last_viewed_ms
            FROM (
                SELECT video_id FROM resume_positions
                UNION
                SELECT video_id FROM view_marks
            ) AS ids
            LEFT JOIN resume_positions r ON r.video_id = ids.video_id
            LEFT JOIN view_marks v ON v.video_id = ids.video_id
            ORDER BY r.updated_at IS NULL, r.updated_at DESC, v.last_viewed_ms DESC, ids.video_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VideoRecord {
                video_id: row.get(0)?,
                position_secs: row.get(1)?,
                position_updated_at: row.get(2)?,
                last_viewed_ms: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Deletes everything stored for `video_id`. Returns whether anything existed.
    pub fn forget(&self, video_id: &str) -> Result<bool> {
        let resume = self.conn.execute(
            "DELETE FROM resume_positions WHERE video_id = ?1",
            params![video_id],
        )?;
        let views = self
            .conn
            .execute("DELETE FROM view_marks WHERE video_id = ?1", params![video_id])?;
        Ok(resume + views > 0)
    }
}

impl PlaybackStore for Database {
    fn resume_position(&self, video_id: &str) -> Result<Option<f64>> {
        self.resume(video_id)
            .with_context(|| format!("failed to read resume position for {video_id}"))
    }

    fn set_resume_position(&mut self, video_id: &str, secs: f64) -> Result<()> {
        self.upsert_resume(video_id, secs)
            .with_context(|| format!("failed to store resume position for {video_id}"))
    }

    fn last_viewed_ms(&self, video_id: &str) -> Result<Option<i64>> {
        self.view_mark(video_id)
            .with_context(|| format!("failed to read view mark for {video_id}"))
    }

    fn set_last_viewed_ms(&mut self, video_id: &str, at_ms: i64) -> Result<()> {
        self.upsert_view_mark(video_id, at_ms)
            .with_context(|| format!("failed to store view mark for {video_id}"))
    }

    fn preferred_quality(&self) -> Result<Option<u32>> {
        let Some(raw) = self.preference(PREFERRED_QUALITY_KEY)? else {
            return Ok(None);
        };
        Ok(raw.trim().parse::<u32>().ok())
    }

    fn set_preferred_quality(&mut self, quality: u32) -> Result<()> {
        self.set_preference(PREFERRED_QUALITY_KEY, &quality.to_string())
            .context("failed to store preferred quality")
    }
}
