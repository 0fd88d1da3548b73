//! Handler functions for song catalogue API endpoints.

use crate::api::common::{
    ApiResponse, PaginatedData, PaginationFilter, service_error_to_http,
    validation_error_response,
};
use crate::database::models::{Category, Lyrics, Song, SongSection};
use crate::services::catalog_service::CatalogService;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
}

async fn section(
    pool: &SqlitePool,
    section: SongSection,
) -> Result<ResponseJson<ApiResponse<Vec<Song>>>, (StatusCode, String)> {
    match CatalogService::new(pool).songs_in_section(section).await {
        Ok(songs) => Ok(ResponseJson(ApiResponse::ok(songs))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn recently_played(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<ApiResponse<Vec<Song>>>, (StatusCode, String)> {
    section(&pool, SongSection::RecentlyPlayed).await
}

#[axum::debug_handler]
pub async fn made_for_you(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<ApiResponse<Vec<Song>>>, (StatusCode, String)> {
    section(&pool, SongSection::MadeForYou).await
}

#[axum::debug_handler]
pub async fn categories(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, (StatusCode, String)> {
    match CatalogService::new(&pool).categories().await {
        Ok(categories) => Ok(ResponseJson(ApiResponse::ok(categories))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Searches songs by title or artist.
#[axum::debug_handler]
pub async fn search(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<SearchQuery>,
) -> Result<ResponseJson<ApiResponse<PaginatedData<Song>>>, (StatusCode, String)> {
    if let Err(validation_errors) = query.validate() {
        return Err(validation_error_response(validation_errors));
    }

    let filter = PaginationFilter {
        page: query.page,
        per_page: query.per_page,
    };

    match CatalogService::new(&pool).search(&query.q, &filter).await {
        Ok((data, pagination)) => Ok(ResponseJson(ApiResponse::ok_paginated(data, pagination))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn lyrics(
    Extension(pool): Extension<SqlitePool>,
    Path(song_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Lyrics>>, (StatusCode, String)> {
    match CatalogService::new(&pool).lyrics(&song_id).await {
        Ok(lyrics) => Ok(ResponseJson(ApiResponse::ok(lyrics))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
