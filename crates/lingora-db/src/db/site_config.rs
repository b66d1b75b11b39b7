use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use lingora_core::models::{
    FooterConfig, FooterInput, FooterRow, LogoConfig, LogoInput, LogoRow, ResolvedFooter,
    SocialIcon,
};
use lingora_core::{AppError, LanguageCode, LocalizedText};

use super::json_or_null;

/// Repository for the footer and logo singletons. Each table holds at most
/// one row in practice; saves update the existing row or create it on first
/// save, so editors never deal with a missing-singleton error.
#[derive(Clone)]
pub struct SiteConfigRepository {
    pool: PgPool,
}

impl SiteConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // FOOTER
    // =========================================================================

    /// Active footer for visitor resolution.
    #[tracing::instrument(skip(self), fields(db.table = "footer_config", db.operation = "select"))]
    pub async fn get_active_footer(&self) -> Result<FooterConfig, AppError> {
        let row = sqlx::query_as::<Postgres, FooterRow>(
            "SELECT * FROM footer_config WHERE is_active = TRUE ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No active footer configured".to_string()))?;
        row.into_config()
    }

    /// Footer singleton regardless of active flag (editor view); `None`
    /// before the first save.
    #[tracing::instrument(skip(self), fields(db.table = "footer_config", db.operation = "select"))]
    pub async fn get_footer_for_editor(&self) -> Result<Option<FooterConfig>, AppError> {
        let row = sqlx::query_as::<Postgres, FooterRow>(
            "SELECT * FROM footer_config ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(FooterRow::into_config).transpose()
    }

    /// Active footer resolved to one language, inactive icons dropped.
    pub async fn resolve_footer(&self, language: LanguageCode) -> Result<ResolvedFooter, AppError> {
        let footer = self.get_active_footer().await?;
        Ok(ResolvedFooter::from_config(&footer, language))
    }

    /// Save the footer: merge into the existing singleton or create it on
    /// first save. Localized fields merge per-language; `social_icons`, when
    /// present, replaces the whole ordered list.
    #[tracing::instrument(skip(self, input), fields(db.table = "footer_config", db.operation = "upsert"))]
    pub async fn save_footer(&self, input: FooterInput) -> Result<FooterConfig, AppError> {
        let mut footer = match self.get_footer_for_editor().await? {
            Some(existing) => existing,
            None => empty_footer(),
        };
        footer.apply_update(input);
        self.write_footer(&footer).await
    }

    /// Append one social icon to the footer's ordered list, creating the
    /// singleton if it does not exist yet.
    #[tracing::instrument(skip(self, icon), fields(db.table = "footer_config", db.operation = "update"))]
    pub async fn add_social_icon(&self, icon: SocialIcon) -> Result<FooterConfig, AppError> {
        let mut footer = match self.get_footer_for_editor().await? {
            Some(existing) => existing,
            None => empty_footer(),
        };
        footer.social_icons.push(icon);
        self.write_footer(&footer).await
    }

    /// Replace the social icon at `index`. Out-of-range positions are a
    /// validation error, not a silent no-op.
    #[tracing::instrument(skip(self, icon), fields(db.table = "footer_config", db.operation = "update", icon_index = index))]
    pub async fn update_social_icon(
        &self,
        index: usize,
        icon: SocialIcon,
    ) -> Result<FooterConfig, AppError> {
        let mut footer = self
            .get_footer_for_editor()
            .await?
            .ok_or_else(|| AppError::NotFound("Footer not configured".to_string()))?;
        if index >= footer.social_icons.len() {
            return Err(AppError::Validation(format!(
                "Social icon index {} out of range (0..{})",
                index,
                footer.social_icons.len()
            )));
        }
        footer.social_icons[index] = icon;
        self.write_footer(&footer).await
    }

    /// Remove the social icon at `index`.
    #[tracing::instrument(skip(self), fields(db.table = "footer_config", db.operation = "update", icon_index = index))]
    pub async fn remove_social_icon(&self, index: usize) -> Result<FooterConfig, AppError> {
        let mut footer = self
            .get_footer_for_editor()
            .await?
            .ok_or_else(|| AppError::NotFound("Footer not configured".to_string()))?;
        if index >= footer.social_icons.len() {
            return Err(AppError::Validation(format!(
                "Social icon index {} out of range (0..{})",
                index,
                footer.social_icons.len()
            )));
        }
        footer.social_icons.remove(index);
        self.write_footer(&footer).await
    }

    async fn write_footer(&self, footer: &FooterConfig) -> Result<FooterConfig, AppError> {
        let row = sqlx::query_as::<Postgres, FooterRow>(
            r#"
            INSERT INTO footer_config (id, text, copyright, social_icons, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (id) DO UPDATE
            SET text = EXCLUDED.text,
                copyright = EXCLUDED.copyright,
                social_icons = EXCLUDED.social_icons,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(footer.id)
        .bind(json_or_null(&footer.text))
        .bind(json_or_null(&footer.copyright))
        .bind(json_or_null(&footer.social_icons))
        .bind(footer.is_active)
        .fetch_one(&self.pool)
        .await?;
        row.into_config()
    }

    // =========================================================================
    // LOGO
    // =========================================================================

    /// Active logo for visitor resolution.
    #[tracing::instrument(skip(self), fields(db.table = "logo_config", db.operation = "select"))]
    pub async fn get_active_logo(&self) -> Result<LogoConfig, AppError> {
        let row = sqlx::query_as::<Postgres, LogoRow>(
            "SELECT * FROM logo_config WHERE is_active = TRUE ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No active logo configured".to_string()))?;
        row.into_config()
    }

    /// Logo singleton regardless of active flag (editor view).
    #[tracing::instrument(skip(self), fields(db.table = "logo_config", db.operation = "select"))]
    pub async fn get_logo_for_editor(&self) -> Result<Option<LogoConfig>, AppError> {
        let row = sqlx::query_as::<Postgres, LogoRow>(
            "SELECT * FROM logo_config ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(LogoRow::into_config).transpose()
    }

    /// Save the logo: merge into the existing singleton or create it on
    /// first save.
    #[tracing::instrument(skip(self, input), fields(db.table = "logo_config", db.operation = "upsert"))]
    pub async fn save_logo(&self, input: LogoInput) -> Result<LogoConfig, AppError> {
        let mut logo = match self.get_logo_for_editor().await? {
            Some(existing) => existing,
            None => empty_logo(),
        };
        logo.apply_update(input);

        let row = sqlx::query_as::<Postgres, LogoRow>(
            r#"
            INSERT INTO logo_config (id, image_url, asset_id, alt_text, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (id) DO UPDATE
            SET image_url = EXCLUDED.image_url,
                asset_id = EXCLUDED.asset_id,
                alt_text = EXCLUDED.alt_text,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(logo.id)
        .bind(&logo.image_url)
        .bind(logo.asset_id)
        .bind(json_or_null(&logo.alt_text))
        .bind(logo.is_active)
        .fetch_one(&self.pool)
        .await?;
        row.into_config()
    }
}

fn empty_footer() -> FooterConfig {
    let now = Utc::now();
    FooterConfig {
        id: Uuid::new_v4(),
        text: LocalizedText::new(),
        copyright: LocalizedText::new(),
        social_icons: Vec::new(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn empty_logo() -> LogoConfig {
    let now = Utc::now();
    LogoConfig {
        id: Uuid::new_v4(),
        image_url: None,
        asset_id: None,
        alt_text: LocalizedText::new(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
