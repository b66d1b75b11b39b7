use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::localization::{LanguageCode, LocalizedText};

/// One footer social icon. The list is ordered; editors either replace the
/// whole list on save or address single icons by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialIcon {
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Site footer singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FooterConfig {
    pub id: Uuid,
    pub text: LocalizedText,
    pub copyright: LocalizedText,
    pub social_icons: Vec<SocialIcon>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct FooterRow {
    pub id: Uuid,
    pub text: JsonValue,
    pub copyright: JsonValue,
    pub social_icons: JsonValue,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FooterRow {
    pub fn into_config(self) -> Result<FooterConfig, AppError> {
        Ok(FooterConfig {
            id: self.id,
            text: serde_json::from_value(self.text)?,
            copyright: serde_json::from_value(self.copyright)?,
            social_icons: serde_json::from_value(self.social_icons)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Footer save input. Localized fields merge; `social_icons`, when present,
/// replaces the whole ordered list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FooterInput {
    pub text: Option<LocalizedText>,
    pub copyright: Option<LocalizedText>,
    pub social_icons: Option<Vec<SocialIcon>>,
    pub is_active: Option<bool>,
}

impl FooterConfig {
    pub fn apply_update(&mut self, input: FooterInput) {
        if let Some(text) = input.text {
            self.text.merge(&text);
        }
        if let Some(copyright) = input.copyright {
            self.copyright.merge(&copyright);
        }
        if let Some(social_icons) = input.social_icons {
            self.social_icons = social_icons;
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
    }
}

/// Site logo singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoConfig {
    pub id: Uuid,
    pub image_url: Option<String>,
    pub asset_id: Option<Uuid>,
    pub alt_text: LocalizedText,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct LogoRow {
    pub id: Uuid,
    pub image_url: Option<String>,
    pub asset_id: Option<Uuid>,
    pub alt_text: JsonValue,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogoRow {
    pub fn into_config(self) -> Result<LogoConfig, AppError> {
        Ok(LogoConfig {
            id: self.id,
            image_url: self.image_url,
            asset_id: self.asset_id,
            alt_text: serde_json::from_value(self.alt_text)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoInput {
    pub image_url: Option<String>,
    pub asset_id: Option<Uuid>,
    pub alt_text: Option<LocalizedText>,
    pub is_active: Option<bool>,
}

impl LogoConfig {
    pub fn apply_update(&mut self, input: LogoInput) {
        if let Some(image_url) = input.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(asset_id) = input.asset_id {
            self.asset_id = Some(asset_id);
        }
        if let Some(alt_text) = input.alt_text {
            self.alt_text.merge(&alt_text);
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
    }
}

/// Single-language visitor view of the footer.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFooter {
    pub text: String,
    pub copyright: String,
    pub social_icons: Vec<SocialIcon>,
}

impl ResolvedFooter {
    pub fn from_config(config: &FooterConfig, language: LanguageCode) -> Self {
        Self {
            text: config.text.resolve(language).to_string(),
            copyright: config.copyright.resolve(language).to_string(),
            social_icons: config
                .social_icons
                .iter()
                .filter(|icon| icon.is_active)
                .cloned()
                .collect(),
        }
    }
}
