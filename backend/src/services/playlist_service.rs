//! Playlist business logic service.
//!
//! Every operation on an existing playlist first passes `check_ownership`:
//! a missing playlist is `NotFound`, someone else's playlist is `Forbidden`.

use crate::auth::models::AuthContext;
use crate::database::models::{
    AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistWithSongs,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::playlist_repository::PlaylistRepository;
use crate::repositories::song_repository::SongRepository;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Service layer for playlist operations.
pub struct PlaylistService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> PlaylistService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads a playlist and confirms the caller owns it.
    ///
    /// # Errors
    /// - `NotFound` if no playlist has this id
    /// - `Forbidden` if it belongs to another user
    pub async fn check_ownership(
        &self,
        context: &AuthContext,
        playlist_id: &str,
    ) -> ServiceResult<Playlist> {
        let playlist = PlaylistRepository::new(self.pool)
            .get_playlist_by_id(playlist_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Playlist", playlist_id))?;

        if playlist.owner_id != context.user_id {
            return Err(ServiceError::forbidden(
                "You do not have access to this playlist",
            ));
        }

        Ok(playlist)
    }

    pub async fn list_playlists(&self, context: &AuthContext) -> ServiceResult<Vec<Playlist>> {
        let playlists = PlaylistRepository::new(self.pool)
            .get_user_playlists(&context.user_id)
            .await?;
        Ok(playlists)
    }

    pub async fn create_playlist(
        &self,
        context: &AuthContext,
        mut request: CreatePlaylistRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Playlist> {
        request.name = request.name.trim().to_string();
        request.validate()?;

        let playlist = PlaylistRepository::new(self.pool)
            .create_playlist(
                &Uuid::now_v7().to_string(),
                &request.name,
                &context.user_id,
                now,
            )
            .await?;

        tracing::info!(
            "User {} created playlist {}",
            context.user_id,
            playlist.id
        );
        Ok(playlist)
    }

    /// Fetches an owned playlist together with its songs.
    pub async fn get_playlist(
        &self,
        context: &AuthContext,
        playlist_id: &str,
    ) -> ServiceResult<PlaylistWithSongs> {
        let playlist = self.check_ownership(context, playlist_id).await?;
        let songs = PlaylistRepository::new(self.pool)
            .get_playlist_songs(&playlist.id)
            .await?;

        Ok(PlaylistWithSongs { playlist, songs })
    }

    /// Adds a catalogue song to an owned playlist.
    ///
    /// # Errors
    /// - `NotFound` if the song does not exist
    /// - `Conflict` if the song is already in the playlist
    pub async fn add_song(
        &self,
        context: &AuthContext,
        playlist_id: &str,
        request: AddSongRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let playlist = self.check_ownership(context, playlist_id).await?;
        request.validate()?;

        SongRepository::new(self.pool)
            .get_song_by_id(&request.song_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Song", &request.song_id))?;

        let added = PlaylistRepository::new(self.pool)
            .add_song(&playlist.id, &request.song_id, now)
            .await?;

        if !added {
            return Err(ServiceError::conflict("Song already in playlist"));
        }

        Ok(())
    }

    /// Removes a song from an owned playlist.
    ///
    /// # Errors
    /// `NotFound` if the song is not in the playlist
    pub async fn remove_song(
        &self,
        context: &AuthContext,
        playlist_id: &str,
        song_id: &str,
    ) -> ServiceResult<()> {
        let playlist = self.check_ownership(context, playlist_id).await?;

        let removed = PlaylistRepository::new(self.pool)
            .remove_song(&playlist.id, song_id)
            .await?;

        if !removed {
            return Err(ServiceError::not_found("Playlist song", song_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::{test_state, verified_user};
    use crate::database::test_pool;
    use crate::utils::clock::{Clock, ManualClock};
    use chrono::Duration;
    use std::sync::Arc;

    struct Fixture {
        pool: SqlitePool,
        clock: Arc<ManualClock>,
        owner: AuthContext,
        stranger: AuthContext,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let clock = Arc::new(ManualClock::at_epoch());
        let state = test_state(clock.clone());
        let owner_id = verified_user(&pool, &state, "owner@x.com", "pw").await;
        let stranger_id = verified_user(&pool, &state, "stranger@x.com", "pw").await;

        Fixture {
            pool,
            clock,
            owner: AuthContext {
                user_id: owner_id,
                is_subscribed: false,
            },
            stranger: AuthContext {
                user_id: stranger_id,
                is_subscribed: false,
            },
        }
    }

    fn add(song_id: &str) -> AddSongRequest {
        AddSongRequest {
            song_id: song_id.to_string(),
        }
    }

    async fn create(fixture: &Fixture, name: &str) -> Playlist {
        PlaylistService::new(&fixture.pool)
            .create_playlist(
                &fixture.owner,
                CreatePlaylistRequest {
                    name: name.to_string(),
                },
                fixture.clock.now(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_own_playlists() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);

        let playlist = create(&fixture, "  Road Trip ").await;
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.owner_id, fixture.owner.user_id);

        let mine = service.list_playlists(&fixture.owner).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(service.list_playlists(&fixture.stranger).await.unwrap().is_empty());

        let blank = service
            .create_playlist(
                &fixture.owner,
                CreatePlaylistRequest {
                    name: "   ".to_string(),
                },
                fixture.clock.now(),
            )
            .await;
        assert!(matches!(blank, Err(ServiceError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_songs_keep_insertion_order() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);
        let playlist = create(&fixture, "Mix").await;

        service
            .add_song(&fixture.owner, &playlist.id, add("recent_2"), fixture.clock.now())
            .await
            .unwrap();
        fixture.clock.advance(Duration::seconds(1));
        service
            .add_song(&fixture.owner, &playlist.id, add("mfy_1"), fixture.clock.now())
            .await
            .unwrap();

        let fetched = service.get_playlist(&fixture.owner, &playlist.id).await.unwrap();
        let ids: Vec<_> = fetched.songs.iter().map(|song| song.id.as_str()).collect();
        assert_eq!(ids, vec!["recent_2", "mfy_1"]);
    }

    #[tokio::test]
    async fn test_duplicate_song_is_conflict() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);
        let playlist = create(&fixture, "Mix").await;

        service
            .add_song(&fixture.owner, &playlist.id, add("recent_1"), fixture.clock.now())
            .await
            .unwrap();
        let again = service
            .add_song(&fixture.owner, &playlist.id, add("recent_1"), fixture.clock.now())
            .await;
        assert!(matches!(again, Err(ServiceError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_unknown_song_and_playlist_are_not_found() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);
        let playlist = create(&fixture, "Mix").await;

        let missing_song = service
            .add_song(&fixture.owner, &playlist.id, add("nope"), fixture.clock.now())
            .await;
        assert!(matches!(missing_song, Err(ServiceError::NotFound { .. })));

        let missing_playlist = service.get_playlist(&fixture.owner, "nope").await;
        assert!(matches!(missing_playlist, Err(ServiceError::NotFound { .. })));

        let not_member = service
            .remove_song(&fixture.owner, &playlist.id, "recent_1")
            .await;
        assert!(matches!(not_member, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);
        let playlist = create(&fixture, "Private").await;
        service
            .add_song(&fixture.owner, &playlist.id, add("recent_1"), fixture.clock.now())
            .await
            .unwrap();

        assert!(matches!(
            service.get_playlist(&fixture.stranger, &playlist.id).await,
            Err(ServiceError::Forbidden { .. })
        ));
        assert!(matches!(
            service
                .add_song(&fixture.stranger, &playlist.id, add("recent_2"), fixture.clock.now())
                .await,
            Err(ServiceError::Forbidden { .. })
        ));
        assert!(matches!(
            service
                .remove_song(&fixture.stranger, &playlist.id, "recent_1")
                .await,
            Err(ServiceError::Forbidden { .. })
        ));
        assert!(matches!(
            service
                .add_song(&fixture.stranger, &playlist.id, add(""), fixture.clock.now())
                .await,
            Err(ServiceError::Forbidden { .. })
        ));
        assert!(matches!(
            service
                .add_song(&fixture.stranger, &playlist.id, add("no-such-song"), fixture.clock.now())
                .await,
            Err(ServiceError::Forbidden { .. })
        ));
        assert!(matches!(
            service
                .remove_song(&fixture.stranger, &playlist.id, "no-such-song")
                .await,
            Err(ServiceError::Forbidden { .. })
        ));

        // Nothing changed for the owner.
        let fetched = service.get_playlist(&fixture.owner, &playlist.id).await.unwrap();
        assert_eq!(fetched.songs.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_song() {
        let fixture = fixture().await;
        let service = PlaylistService::new(&fixture.pool);
        let playlist = create(&fixture, "Mix").await;
        service
            .add_song(&fixture.owner, &playlist.id, add("recent_1"), fixture.clock.now())
            .await
            .unwrap();

        service
            .remove_song(&fixture.owner, &playlist.id, "recent_1")
            .await
            .unwrap();
        let fetched = service.get_playlist(&fixture.owner, &playlist.id).await.unwrap();
        assert!(fetched.songs.is_empty());
    }
}
