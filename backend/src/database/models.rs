//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_expires_at: Option<DateTime<Utc>>,
    pub reset_password_token: Option<String>,
    pub reset_password_token_expires_at: Option<DateTime<Utc>>,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A subscription counts only while it is active and its expiry lies
    /// strictly in the future.
    pub fn is_subscribed_at(&self, now: DateTime<Utc>) -> bool {
        self.subscription_status == SubscriptionStatus::Active
            && self
                .subscription_expires_at
                .is_some_and(|expires_at| expires_at > now)
    }
}

/// Row data for a freshly registered, unverified user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
    pub verification_token_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    None,
    Active,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "songUrl")]
    pub song_url: String,
}

/// Curated home-screen shelves a song can be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongSection {
    RecentlyPlayed,
    MadeForYou,
}

impl SongSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongSection::RecentlyPlayed => "recently_played",
            SongSection::MadeForYou => "made_for_you",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lyrics {
    pub song_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistWithSongs {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Playlist name must be between 1-255 characters"
    ))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddSongRequest {
    #[validate(length(min = 1, message = "Song ID is required"))]
    pub song_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentOrder {
    pub order_id: String,
    pub user_id: String,
    pub plan: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}
