use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::localization::{LanguageCode, LocalizedText};

/// Display metadata for a song. `play_count` only moves through the dedicated
/// play operation, never through normal updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub play_count: i64,
}

fn default_true() -> bool {
    true
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            order: 0,
            is_active: true,
            is_featured: false,
            play_count: 0,
        }
    }
}

/// A song with every language present (editor view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub artist: LocalizedText,
    pub lyrics: LocalizedText,
    /// Direct audio URL or a ledger reference; simple items use the former.
    pub audio_url: Option<String>,
    pub audio_asset_id: Option<Uuid>,
    pub duration_seconds: i32,
    pub cover_image: Option<Uuid>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub metadata: SongMetadata,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for the songs table.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct SongRow {
    pub id: Uuid,
    pub title: JsonValue,
    pub description: JsonValue,
    pub artist: JsonValue,
    pub lyrics: JsonValue,
    pub audio_url: Option<String>,
    pub audio_asset_id: Option<Uuid>,
    pub duration_seconds: i32,
    pub cover_image: Option<Uuid>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub play_count: i64,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SongRow {
    pub fn into_song(self) -> Result<Song, AppError> {
        Ok(Song {
            id: self.id,
            title: serde_json::from_value(self.title)?,
            description: serde_json::from_value(self.description)?,
            artist: serde_json::from_value(self.artist)?,
            lyrics: serde_json::from_value(self.lyrics)?,
            audio_url: self.audio_url,
            audio_asset_id: self.audio_asset_id,
            duration_seconds: self.duration_seconds,
            cover_image: self.cover_image,
            genre: self.genre,
            release_year: self.release_year,
            metadata: SongMetadata {
                order: self.display_order,
                is_active: self.is_active,
                is_featured: self.is_featured,
                play_count: self.play_count,
            },
            created_by: self.created_by,
            last_modified_by: self.last_modified_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Input for creating a song. `title.en` and a positive duration are
/// mandatory.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSongInput {
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub artist: LocalizedText,
    #[serde(default)]
    pub lyrics: LocalizedText,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub audio_asset_id: Option<Uuid>,
    pub duration_seconds: i32,
    #[serde(default)]
    pub cover_image: Option<Uuid>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub metadata: SongMetadata,
}

/// Partial song update. `play_count` is deliberately absent: it only moves
/// through the dedicated play operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSongInput {
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub artist: Option<LocalizedText>,
    pub lyrics: Option<LocalizedText>,
    pub audio_url: Option<String>,
    pub audio_asset_id: Option<Uuid>,
    pub duration_seconds: Option<i32>,
    pub cover_image: Option<Uuid>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl Song {
    pub fn apply_update(&mut self, input: UpdateSongInput) {
        if let Some(title) = input.title {
            self.title.merge(&title);
        }
        if let Some(description) = input.description {
            self.description.merge(&description);
        }
        if let Some(artist) = input.artist {
            self.artist.merge(&artist);
        }
        if let Some(lyrics) = input.lyrics {
            self.lyrics.merge(&lyrics);
        }
        if let Some(audio_url) = input.audio_url {
            self.audio_url = Some(audio_url);
        }
        if let Some(audio_asset_id) = input.audio_asset_id {
            self.audio_asset_id = Some(audio_asset_id);
        }
        if let Some(duration_seconds) = input.duration_seconds {
            self.duration_seconds = duration_seconds;
        }
        if let Some(cover_image) = input.cover_image {
            self.cover_image = Some(cover_image);
        }
        if let Some(genre) = input.genre {
            self.genre = Some(genre);
        }
        if let Some(release_year) = input.release_year {
            self.release_year = Some(release_year);
        }
        if let Some(order) = input.order {
            self.metadata.order = order;
        }
        if let Some(is_active) = input.is_active {
            self.metadata.is_active = is_active;
        }
        if let Some(is_featured) = input.is_featured {
            self.metadata.is_featured = is_featured;
        }
    }
}

/// Format a duration in whole seconds as "m:ss" for visitor views.
pub fn format_duration(seconds: i32) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Single-language visitor view of a song.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSong {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub artist: String,
    pub lyrics: String,
    pub audio_url: Option<String>,
    pub audio_asset_id: Option<Uuid>,
    pub duration_seconds: i32,
    pub formatted_duration: String,
    pub cover_image: Option<Uuid>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub order: i32,
    pub is_featured: bool,
    pub play_count: i64,
}

impl ResolvedSong {
    pub fn from_song(song: &Song, language: LanguageCode) -> Self {
        Self {
            id: song.id,
            title: song.title.resolve(language).to_string(),
            description: song.description.resolve(language).to_string(),
            artist: song.artist.resolve(language).to_string(),
            lyrics: song.lyrics.resolve(language).to_string(),
            audio_url: song.audio_url.clone(),
            audio_asset_id: song.audio_asset_id,
            duration_seconds: song.duration_seconds,
            formatted_duration: format_duration(song.duration_seconds),
            cover_image: song.cover_image,
            genre: song.genre.clone(),
            release_year: song.release_year,
            order: song.metadata.order,
            is_featured: song.metadata.is_featured,
            play_count: song.metadata.play_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_minutes_and_seconds() {
        assert_eq!(format_duration(195), "3:15");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(7), "0:07");
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(-5), "0:00");
    }

    #[test]
    fn resolved_song_falls_back_to_english_title() {
        let song = Song {
            id: Uuid::new_v4(),
            title: LocalizedText::english("Rise"),
            description: LocalizedText::new(),
            artist: LocalizedText::new(),
            lyrics: LocalizedText::new(),
            audio_url: Some("http://storage.example/rise.mp3".to_string()),
            audio_asset_id: None,
            duration_seconds: 195,
            cover_image: None,
            genre: None,
            release_year: None,
            metadata: SongMetadata::default(),
            created_by: None,
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let resolved = ResolvedSong::from_song(&song, LanguageCode::Es);
        assert_eq!(resolved.title, "Rise");
        assert_eq!(resolved.formatted_duration, "3:15");
    }

    #[test]
    fn apply_update_cannot_touch_play_count() {
        let mut song = Song {
            id: Uuid::new_v4(),
            title: LocalizedText::english("Rise"),
            description: LocalizedText::new(),
            artist: LocalizedText::new(),
            lyrics: LocalizedText::new(),
            audio_url: None,
            audio_asset_id: None,
            duration_seconds: 120,
            cover_image: None,
            genre: None,
            release_year: None,
            metadata: SongMetadata {
                play_count: 42,
                ..Default::default()
            },
            created_by: None,
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        song.apply_update(UpdateSongInput {
            is_featured: Some(true),
            genre: Some("ambient".to_string()),
            ..Default::default()
        });
        assert_eq!(song.metadata.play_count, 42);
        assert!(song.metadata.is_featured);
    }
}
