//! Database repository for the song catalogue.
//!
//! Read-only access to songs, browse categories and lyrics.

use crate::database::models::{Category, Lyrics, Song, SongSection};
use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub struct SongRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SongRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Songs placed on a home-screen section.
    pub async fn get_songs_by_section(&self, section: SongSection) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, artist, image_url, song_url
            FROM songs
            WHERE section = ?
            ORDER BY title
            "#,
        )
        .bind(section.as_str())
        .fetch_all(self.pool)
        .await
        .context("Failed to get songs by section")?;

        Ok(songs)
    }

    pub async fn get_song_by_id(&self, id: &str) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            "SELECT id, title, artist, image_url, song_url FROM songs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get song by id")?;

        Ok(song)
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, image_url FROM categories ORDER BY name")
                .fetch_all(self.pool)
                .await
                .context("Failed to get categories")?;

        Ok(categories)
    }

    /// Case-insensitive substring match on title or artist, paginated.
    pub async fn search_songs(&self, query: &str, limit: u64, offset: u64) -> Result<Vec<Song>> {
        let pattern = like_pattern(query);
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, title, artist, image_url, song_url
            FROM songs
            WHERE title LIKE ? ESCAPE '\' OR artist LIKE ? ESCAPE '\'
            ORDER BY title
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool)
        .await
        .context("Failed to search songs")?;

        Ok(songs)
    }

    /// Total number of songs matching `search_songs` without pagination.
    pub async fn count_search_results(&self, query: &str) -> Result<u64> {
        let pattern = like_pattern(query);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM songs
            WHERE title LIKE ? ESCAPE '\' OR artist LIKE ? ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(self.pool)
        .await
        .context("Failed to count search results")?;

        Ok(count as u64)
    }

    pub async fn get_lyrics_for_song(&self, song_id: &str) -> Result<Option<Lyrics>> {
        let lyrics =
            sqlx::query_as::<_, Lyrics>("SELECT song_id, content FROM lyrics WHERE song_id = ?")
                .bind(song_id)
                .fetch_optional(self.pool)
                .await
                .context("Failed to get lyrics")?;

        Ok(lyrics)
    }
}

/// Wraps user input in `%...%`, escaping LIKE wildcards so they match literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
