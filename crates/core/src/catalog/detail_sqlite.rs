//! SQLite-backed detail store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{CatalogError, DetailStore, MediaKind, MovieDetail, RatingEntry};

/// SQLite-backed store for full detail records.
pub struct SqliteDetailStore {
    conn: Mutex<Connection>,
}

impl SqliteDetailStore {
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

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

            CREATE TABLE IF NOT EXISTS movie_details (
                external_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                year TEXT,
                rated TEXT,
                released TEXT,
                runtime TEXT,
                genre TEXT,
                director TEXT,
                writer TEXT,
                actors TEXT,
                plot TEXT,
                language TEXT,
                country TEXT,
                awards TEXT,
                poster TEXT,
                metascore TEXT,
                imdb_rating TEXT,
                imdb_votes TEXT,
                kind TEXT NOT NULL,
                total_seasons TEXT,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS movie_detail_ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL REFERENCES movie_details(external_id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                source TEXT NOT NULL,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_movie_detail_ratings_id ON movie_detail_ratings(external_id);
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Database("detail store lock poisoned".to_string()))
    }

    fn load_ratings(conn: &Connection, external_id: &str) -> Result<Vec<RatingEntry>, CatalogError> {
        let mut stmt = conn.prepare(
            "SELECT source, value FROM movie_detail_ratings WHERE external_id = ? ORDER BY position",
        )?;

        let rows = stmt.query_map(params![external_id], |row| {
            Ok(RatingEntry {
                source: row.get(0)?,
                value: row.get(1)?,
            })
        })?;

        let mut ratings = Vec::new();
        for row in rows {
            ratings.push(row?);
        }
        Ok(ratings)
    }

    /// Convert a row to MovieDetail (without ratings).
    fn row_to_detail(row: &rusqlite::Row) -> rusqlite::Result<MovieDetail> {
        let kind: String = row.get(18)?;
        Ok(MovieDetail {
            external_id: row.get(0)?,
            title: row.get(1)?,
            year: row.get(2)?,
            rated: row.get(3)?,
            released: row.get(4)?,
            runtime: row.get(5)?,
            genre: row.get(6)?,
            director: row.get(7)?,
            writer: row.get(8)?,
            actors: row.get(9)?,
            plot: row.get(10)?,
            language: row.get(11)?,
            country: row.get(12)?,
            awards: row.get(13)?,
            poster: row.get(14)?,
            metascore: row.get(15)?,
            imdb_rating: row.get(16)?,
            imdb_votes: row.get(17)?,
            kind: kind.parse().unwrap_or(MediaKind::Other),
            total_seasons: row.get(19)?,
            ratings: Vec::new(), // Loaded separately
        })
    }
}

impl DetailStore for SqliteDetailStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MovieDetail>, CatalogError> {
        let conn = self.lock()?;

        let detail = conn
            .query_row(
                "SELECT external_id, title, year, rated, released, runtime, genre, director,
                        writer, actors, plot, language, country, awards, poster, metascore,
                        imdb_rating, imdb_votes, kind, total_seasons
                 FROM movie_details WHERE external_id = ?",
                params![external_id],
                Self::row_to_detail,
            )
            .optional()?;

        match detail {
            Some(mut detail) => {
                detail.ratings = Self::load_ratings(&conn, external_id)?;
                Ok(Some(detail))
            }
            None => Ok(None),
        }
    }

    fn upsert(&self, detail: &MovieDetail) -> Result<(), CatalogError> {
        if detail.external_id.trim().is_empty() {
            return Err(CatalogError::Invalid("detail has an empty external id".to_string()));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO movie_details (
                external_id, title, year, rated, released, runtime, genre, director,
                writer, actors, plot, language, country, awards, poster, metascore,
                imdb_rating, imdb_votes, kind, total_seasons
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
             ON CONFLICT(external_id) DO UPDATE SET
                title = excluded.title,
                year = excluded.year,
                rated = excluded.rated,
                released = excluded.released,
                runtime = excluded.runtime,
                genre = excluded.genre,
                director = excluded.director,
                writer = excluded.writer,
                actors = excluded.actors,
                plot = excluded.plot,
                language = excluded.language,
                country = excluded.country,
                awards = excluded.awards,
                poster = excluded.poster,
                metascore = excluded.metascore,
                imdb_rating = excluded.imdb_rating,
                imdb_votes = excluded.imdb_votes,
                kind = excluded.kind,
                total_seasons = excluded.total_seasons,
                updated_at = datetime('now')",
            params![
                &detail.external_id,
                &detail.title,
                &detail.year,
                &detail.rated,
                &detail.released,
                &detail.runtime,
                &detail.genre,
                &detail.director,
                &detail.writer,
                &detail.actors,
                &detail.plot,
                &detail.language,
                &detail.country,
                &detail.awards,
                &detail.poster,
                &detail.metascore,
                &detail.imdb_rating,
                &detail.imdb_votes,
                detail.kind.as_str(),
                &detail.total_seasons,
            ],
        )?;

        // Replace ratings wholesale
        tx.execute(
            "DELETE FROM movie_detail_ratings WHERE external_id = ?",
            params![&detail.external_id],
        )?;
        for (position, rating) in detail.ratings.iter().enumerate() {
            tx.execute(
                "INSERT INTO movie_detail_ratings (external_id, position, source, value)
                 VALUES (?, ?, ?, ?)",
                params![&detail.external_id, position as i64, &rating.source, &rating.value],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
