//! SQLite-backed summary store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{CatalogError, MediaKind, MovieSummary, Page, SortField, SummarySearchQuery, SummaryStore};

const SUMMARY_COLUMNS: &str = "external_id, title, year, kind, poster, rating, last_fetched_at";

/// SQLite-backed summary store.
///
/// `external_id` is the primary key; creation goes through
/// `INSERT .. ON CONFLICT DO NOTHING` so concurrent writers (even on other
/// connections to the same file) can never produce a second row.
pub struct SqliteSummaryStore {
    conn: Mutex<Connection>,
}

impl SqliteSummaryStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per provider id
            CREATE TABLE IF NOT EXISTS movie_summaries (
                external_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                year TEXT NOT NULL DEFAULT '',
                kind TEXT NOT NULL,
                poster TEXT,
                rating INTEGER NOT NULL DEFAULT 0,
                last_fetched_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_movie_summaries_year ON movie_summaries(year);
            CREATE INDEX IF NOT EXISTS idx_movie_summaries_rating ON movie_summaries(rating);
            CREATE INDEX IF NOT EXISTS idx_movie_summaries_title ON movie_summaries(title);

            -- Ordered genre list per summary
            CREATE TABLE IF NOT EXISTS movie_summary_genres (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL REFERENCES movie_summaries(external_id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                genre TEXT NOT NULL,
                UNIQUE(external_id, genre)
            );

            CREATE INDEX IF NOT EXISTS idx_movie_summary_genres_id ON movie_summary_genres(external_id);
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Database("summary store lock poisoned".to_string()))
    }

    /// Load the genre list for a summary.
    fn load_genres(conn: &Connection, external_id: &str) -> Result<Vec<String>, CatalogError> {
        let mut stmt = conn.prepare(
            "SELECT genre FROM movie_summary_genres WHERE external_id = ? ORDER BY position",
        )?;

        let rows = stmt.query_map(params![external_id], |row| row.get(0))?;

        let mut genres = Vec::new();
        for row in rows {
            genres.push(row?);
        }
        Ok(genres)
    }

    fn insert_genres(
        conn: &Connection,
        external_id: &str,
        genres: &[String],
    ) -> Result<(), CatalogError> {
        for (position, genre) in genres.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO movie_summary_genres (external_id, position, genre)
                 VALUES (?, ?, ?)",
                params![external_id, position as i64, genre],
            )?;
        }
        Ok(())
    }

    /// Convert a row to MovieSummary (without genres).
    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<MovieSummary> {
        let kind: String = row.get(3)?;
        Ok(MovieSummary {
            external_id: row.get(0)?,
            title: row.get(1)?,
            year: row.get(2)?,
            kind: kind.parse().unwrap_or(MediaKind::Other),
            poster: row.get(4)?,
            genres: Vec::new(), // Loaded separately
            rating: row.get(5)?,
            last_fetched_at: row.get(6)?,
        })
    }

    fn load(conn: &Connection, external_id: &str) -> Result<Option<MovieSummary>, CatalogError> {
        let summary = conn
            .query_row(
                &format!("SELECT {SUMMARY_COLUMNS} FROM movie_summaries WHERE external_id = ?"),
                params![external_id],
                Self::row_to_summary,
            )
            .optional()?;

        match summary {
            Some(mut summary) => {
                summary.genres = Self::load_genres(conn, external_id)?;
                Ok(Some(summary))
            }
            None => Ok(None),
        }
    }

    /// Run a page query and attach genres to every row.
    fn collect_page(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<MovieSummary>, CatalogError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_summary)?;

        let mut results = Vec::new();
        for row in rows {
            let mut summary = row?;
            summary.genres = Self::load_genres(conn, &summary.external_id)?;
            results.push(summary);
        }
        Ok(results)
    }
}

/// Build a LIKE pattern matching `text` anywhere, with wildcards escaped.
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn offset(page: u32, size: u32) -> i64 {
    page as i64 * size as i64
}

impl SummaryStore for SqliteSummaryStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MovieSummary>, CatalogError> {
        let conn = self.lock()?;
        Self::load(&conn, external_id)
    }

    fn upsert_if_absent(&self, summary: &MovieSummary) -> Result<MovieSummary, CatalogError> {
        if summary.external_id.trim().is_empty() {
            return Err(CatalogError::Invalid("summary has an empty external id".to_string()));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT INTO movie_summaries (external_id, title, year, kind, poster, rating, last_fetched_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(external_id) DO NOTHING",
            params![
                &summary.external_id,
                &summary.title,
                &summary.year,
                summary.kind.as_str(),
                &summary.poster,
                summary.rating,
                summary.last_fetched_at,
            ],
        )?;

        if inserted == 1 {
            Self::insert_genres(&tx, &summary.external_id, &summary.genres)?;
        }

        let stored = Self::load(&tx, &summary.external_id)?
            .ok_or_else(|| CatalogError::NotFound(summary.external_id.clone()))?;
        tx.commit()?;

        Ok(stored)
    }

    fn patch_missing(
        &self,
        external_id: &str,
        genres: &[String],
        rating: u32,
        fetched_at: i64,
    ) -> Result<bool, CatalogError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Rating only moves away from 0, never back or sideways.
        let updated = tx.execute(
            "UPDATE movie_summaries
             SET rating = CASE WHEN rating = 0 THEN ?1 ELSE rating END,
                 last_fetched_at = ?2
             WHERE external_id = ?3",
            params![rating, fetched_at, external_id],
        )?;

        if updated == 0 {
            return Ok(false);
        }

        if !genres.is_empty() {
            let has_genres: bool = tx
                .query_row(
                    "SELECT 1 FROM movie_summary_genres WHERE external_id = ? LIMIT 1",
                    params![external_id],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);

            if !has_genres {
                Self::insert_genres(&tx, external_id, genres)?;
            }
        }

        tx.commit()?;
        Ok(true)
    }

    fn search_by_title_substring(
        &self,
        query: &SummarySearchQuery,
    ) -> Result<Page<MovieSummary>, CatalogError> {
        let conn = self.lock()?;
        let pattern = contains_pattern(query.text.trim());
        let genre = query
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty());

        let filter = "title LIKE ?1 ESCAPE '\\'
             AND (?2 IS NULL OR EXISTS (
                 SELECT 1 FROM movie_summary_genres g
                 WHERE g.external_id = movie_summaries.external_id
                   AND g.genre = ?2 COLLATE NOCASE))";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM movie_summaries WHERE {filter}"),
            params![&pattern, genre],
            |row| row.get(0),
        )?;

        let items = Self::collect_page(
            &conn,
            &format!(
                "SELECT {SUMMARY_COLUMNS} FROM movie_summaries WHERE {filter}
                 ORDER BY title ASC, external_id ASC
                 LIMIT ?3 OFFSET ?4"
            ),
            params![&pattern, genre, query.size, offset(query.page, query.size)],
        )?;

        Ok(Page {
            items,
            page: query.page,
            size: query.size,
            total: total as u64,
        })
    }

    fn list_all(
        &self,
        page: u32,
        size: u32,
        sort: SortField,
    ) -> Result<Page<MovieSummary>, CatalogError> {
        let conn = self.lock()?;

        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM movie_summaries", [], |row| row.get(0))?;

        // external_id breaks ties so consecutive pages never overlap.
        let items = Self::collect_page(
            &conn,
            &format!(
                "SELECT {SUMMARY_COLUMNS} FROM movie_summaries
                 ORDER BY {} DESC, external_id ASC
                 LIMIT ?1 OFFSET ?2",
                sort.column()
            ),
            params![size, offset(page, size)],
        )?;

        Ok(Page {
            items,
            page,
            size,
            total: total as u64,
        })
    }

    fn count(&self) -> Result<u64, CatalogError> {
        let conn = self.lock()?;
        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM movie_summaries", [], |row| row.get(0))?;
        Ok(total as u64)
    }

    fn remove(&self, external_id: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;

        // Cascades to genres
        let rows_affected = conn.execute(
            "DELETE FROM movie_summaries WHERE external_id = ?",
            params![external_id],
        )?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(external_id.to_string()));
        }

        Ok(())
    }
}
