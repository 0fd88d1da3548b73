//! Database repository for playlists and their songs.

use crate::database::models::{Playlist, Song};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct PlaylistRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlaylistRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_playlist(
        &self,
        id: &str,
        name: &str,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (id, name, owner_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(owner_id)
        .bind(created_at)
        .fetch_one(self.pool)
        .await
        .context("Failed to create playlist")?;

        Ok(playlist)
    }

    pub async fn get_playlist_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "SELECT id, name, owner_id, created_at FROM playlists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get playlist by id")?;

        Ok(playlist)
    }

    pub async fn get_user_playlists(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM playlists
            WHERE owner_id = ?
            ORDER BY created_at DESC, name
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to get user playlists")?;

        Ok(playlists)
    }

    /// Songs of a playlist in the order they were added.
    pub async fn get_playlist_songs(&self, playlist_id: &str) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT s.id, s.title, s.artist, s.image_url, s.song_url
            FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.added_at, s.title
            "#,
        )
        .bind(playlist_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to get playlist songs")?;

        Ok(songs)
    }

    /// Adds a song to a playlist.
    ///
    /// # Returns
    /// `false` if the song was already in the playlist
    pub async fn add_song(
        &self,
        playlist_id: &str,
        song_id: &str,
        added_at: DateTime<Utc>,
    ) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO playlist_songs (playlist_id, song_id, added_at)
            VALUES (?, ?, ?)
            ON CONFLICT(playlist_id, song_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(song_id)
        .bind(added_at)
        .execute(self.pool)
        .await
        .context("Failed to add song to playlist")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Removes a song from a playlist.
    ///
    /// # Returns
    /// `false` if the song was not in the playlist
    pub async fn remove_song(&self, playlist_id: &str, song_id: &str) -> Result<bool> {
        let rows_affected =
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
                .bind(playlist_id)
                .bind(song_id)
                .execute(self.pool)
                .await
                .context("Failed to remove song from playlist")?
                .rows_affected();

        Ok(rows_affected > 0)
    }
}
