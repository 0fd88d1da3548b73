//! Song catalogue service: home-screen sections, categories, search and lyrics.

use crate::api::common::{PaginatedData, PaginationFilter, PaginationMeta};
use crate::database::models::{Category, Lyrics, Song, SongSection};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::song_repository::SongRepository;
use sqlx::SqlitePool;
use validator::Validate;

pub struct CatalogService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn songs_in_section(&self, section: SongSection) -> ServiceResult<Vec<Song>> {
        let songs = SongRepository::new(self.pool)
            .get_songs_by_section(section)
            .await?;
        Ok(songs)
    }

    pub async fn categories(&self) -> ServiceResult<Vec<Category>> {
        let categories = SongRepository::new(self.pool).get_categories().await?;
        Ok(categories)
    }

    /// Searches titles and artists. A blank query yields an empty page.
    pub async fn search(
        &self,
        query: &str,
        filter: &PaginationFilter,
    ) -> ServiceResult<(PaginatedData<Song>, PaginationMeta)> {
        filter.validate()?;

        let query = query.trim();
        if query.is_empty() {
            return Ok((
                PaginatedData::new(Vec::new(), 0),
                PaginationMeta::from_filter(filter, 0),
            ));
        }

        let repo = SongRepository::new(self.pool);
        let total = repo.count_search_results(query).await?;
        let songs = repo
            .search_songs(query, filter.limit(), filter.offset())
            .await?;

        Ok((
            PaginatedData::new(songs, total),
            PaginationMeta::from_filter(filter, total),
        ))
    }

    pub async fn lyrics(&self, song_id: &str) -> ServiceResult<Lyrics> {
        SongRepository::new(self.pool)
            .get_lyrics_for_song(song_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lyrics", song_id))
    }
}
