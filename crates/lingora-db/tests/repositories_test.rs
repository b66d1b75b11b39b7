//! Repository integration tests against a live Postgres.
//!
//! Run with: `cargo test -p lingora-db --test repositories_test`
//! Requires DATABASE_URL; every test skips silently when it is unset, so the
//! suite is a no-op in environments without a database.

use std::path::Path;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use lingora_core::models::{
    ContentMetadata, ContentType, CreateContentInput, CreateSongInput, ReorderUpdate, SocialIcon,
    SongMetadata, VisitorContentQuery,
};
use lingora_core::{AppError, LanguageCode, LocalizedText};
use lingora_db::{ContentRepository, SiteConfigRepository, SongRepository};

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    sqlx::migrate::Migrator::new(migrations)
        .await
        .expect("load migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    Some(pool)
}

// Tests share one database, so every row carries a key or name no other run
// can collide with, and each test deletes what it created.
fn unique_key(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

fn content_input(key: &str, title: &str, order: i32) -> CreateContentInput {
    CreateContentInput {
        key: Some(key.to_string()),
        content_type: ContentType::General,
        title: LocalizedText::english(title),
        description: LocalizedText::new(),
        subtitle: LocalizedText::new(),
        image_url: None,
        video_url: None,
        media: None,
        metadata: ContentMetadata {
            order,
            ..ContentMetadata::default()
        },
        seo: None,
    }
}

fn song_input(title: &str) -> CreateSongInput {
    CreateSongInput {
        title: LocalizedText::english(title),
        description: LocalizedText::new(),
        artist: LocalizedText::new(),
        lyrics: LocalizedText::new(),
        audio_url: None,
        audio_asset_id: None,
        duration_seconds: 215,
        cover_image: None,
        genre: None,
        release_year: None,
        metadata: SongMetadata::default(),
    }
}

fn icon(platform: &str, url: &str) -> SocialIcon {
    SocialIcon {
        platform: platform.to_string(),
        url: url.to_string(),
        icon: None,
        is_active: true,
    }
}

#[tokio::test]
async fn duplicate_explicit_key_yields_exactly_one_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = ContentRepository::new(pool);
    let key = unique_key("dup");

    let first = repo
        .create(content_input(&key, "First claimant", 0), Some("tests"))
        .await
        .unwrap();
    let err = repo
        .create(content_input(&key, "Second claimant", 0), Some("tests"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The key still addresses exactly the first item.
    let item = repo.get_by_key(&key).await.unwrap();
    assert_eq!(item.id, first.id);

    repo.delete(first.id).await.unwrap();
}

#[tokio::test]
async fn bulk_reorder_reshapes_visitor_order() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = ContentRepository::new(pool);

    let a = repo
        .create(content_input(&unique_key("ord_a"), "Alpha", 1), None)
        .await
        .unwrap();
    let b = repo
        .create(content_input(&unique_key("ord_b"), "Beta", 2), None)
        .await
        .unwrap();
    let c = repo
        .create(content_input(&unique_key("ord_c"), "Gamma", 3), None)
        .await
        .unwrap();

    let updates = vec![
        ReorderUpdate { id: a.id, order: 3 },
        ReorderUpdate { id: b.id, order: 1 },
        ReorderUpdate { id: c.id, order: 2 },
    ];
    let outcome = repo.bulk_reorder(&updates, Some("tests")).await.unwrap();
    assert_eq!(outcome.matched_count, 3);
    assert_eq!(outcome.modified_count, 3);

    // Rows from other runs may interleave, but the relative order of these
    // three in the visitor view must follow the new display orders.
    let groups = repo
        .list_for_visitor(VisitorContentQuery {
            language: LanguageCode::En,
            content_type: Some(ContentType::General),
            featured_only: false,
        })
        .await
        .unwrap();
    let ours: Vec<Uuid> = groups
        .iter()
        .flat_map(|g| g.items.iter())
        .filter(|r| [a.id, b.id, c.id].contains(&r.id))
        .map(|r| r.id)
        .collect();
    assert_eq!(ours, vec![b.id, c.id, a.id]);

    for id in [a.id, b.id, c.id] {
        repo.delete(id).await.unwrap();
    }
}

#[tokio::test]
async fn concurrent_plays_each_count() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = SongRepository::new(pool);
    let song = repo
        .create(song_input("Counter proof"), Some("tests"))
        .await
        .unwrap();

    const PLAYS: usize = 20;
    let mut handles = Vec::with_capacity(PLAYS);
    for _ in 0..PLAYS {
        let repo = repo.clone();
        let id = song.id;
        handles.push(tokio::spawn(
            async move { repo.increment_play_count(id).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let after = repo.get(song.id).await.unwrap();
    assert_eq!(after.metadata.play_count, PLAYS as i64);

    repo.delete(song.id).await.unwrap();
}

#[tokio::test]
async fn social_icons_are_addressed_by_position() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = SiteConfigRepository::new(pool);

    let platform = format!("net_{}", Uuid::new_v4().simple());
    let footer = repo
        .add_social_icon(icon(&platform, "https://example.com/a"))
        .await
        .unwrap();
    let index = footer.social_icons.len() - 1;
    assert_eq!(footer.social_icons[index].platform, platform);

    let replacement = format!("net_{}", Uuid::new_v4().simple());
    let footer = repo
        .update_social_icon(index, icon(&replacement, "https://example.com/b"))
        .await
        .unwrap();
    assert_eq!(footer.social_icons[index].platform, replacement);

    let err = repo
        .update_social_icon(
            footer.social_icons.len() + 5,
            icon("overflow", "https://example.com/c"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let footer = repo.remove_social_icon(index).await.unwrap();
    assert!(!footer.social_icons.iter().any(|i| i.platform == replacement));
}
