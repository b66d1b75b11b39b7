//! Lingora CLI — operator console for the localized content repository.
//!
//! Talks to the database directly; set DATABASE_URL (a .env file is picked
//! up). Storage-backed commands additionally use LOCAL_STORAGE_PATH and
//! LOCAL_STORAGE_BASE_URL.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use lingora_cli::{init_tracing, mime_for_extension, parse_reorder_batch};
use lingora_core::models::{
    AssetCategory, ContentType, CreateContentInput, CreateQuerySubmission, CreateSongInput,
    EditorContentFilter, EditorSongFilter, FooterInput, LogoInput, MediaAssetFilter, Pagination,
    ResourceKind, SocialIcon, UpdateContentInput, UpdateSongInput, VisitorContentQuery,
    VisitorSongQuery,
};
use lingora_core::validation::UploadProfile;
use lingora_core::{LanguageCode, LingoraConfig};
use lingora_db::{
    ContentRepository, MediaAssetRepository, QuerySubmissionRepository, SiteConfigRepository,
    SongRepository,
};
use lingora_services::{LogNotifier, SubmissionService, UploadRequest, UploadService};
use lingora_storage::{DerivedRendition, LocalStorage, ObjectStorage};

#[derive(Parser)]
#[command(name = "lingora", about = "Lingora content repository CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Content item operations
    Content {
        #[command(subcommand)]
        sub: ContentCommands,
    },
    /// Song operations
    Song {
        #[command(subcommand)]
        sub: SongCommands,
    },
    /// Media ledger operations
    Media {
        #[command(subcommand)]
        sub: MediaCommands,
    },
    /// Visitor query submissions
    Submissions {
        #[command(subcommand)]
        sub: SubmissionCommands,
    },
    /// Footer singleton operations
    Footer {
        #[command(subcommand)]
        sub: FooterCommands,
    },
    /// Logo singleton operations
    Logo {
        #[command(subcommand)]
        sub: LogoCommands,
    },
    /// Apply pending database migrations
    Migrate,
}

#[derive(Subcommand)]
enum ContentCommands {
    /// List content items with filters and pagination
    List {
        /// Filter by content type (e.g. hero, about, ana-bio)
        #[arg(long)]
        r#type: Option<String>,
        /// Filter by active flag
        #[arg(long)]
        active: Option<bool>,
        /// Free-text search across title, description, key, and tags
        #[arg(long)]
        search: Option<String>,
        /// Sort field: created_at, updated_at, title_en, display_order,
        /// content_type
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Get one content item by UUID or key
    Get {
        id_or_key: String,
    },
    /// Create an item from a JSON file (title.en required; key optional)
    Create {
        file: std::path::PathBuf,
    },
    /// Apply a partial update from a JSON file (omitted fields untouched)
    Update {
        id: Uuid,
        file: std::path::PathBuf,
    },
    /// Resolve one active item by key to a single language
    Resolve {
        key: String,
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Visitor view: active items resolved and grouped by type
    Site {
        #[arg(long, default_value = "en")]
        lang: String,
        #[arg(long)]
        featured: bool,
    },
    /// Apply a reorder batch from a JSON file of {"id", "order"} pairs
    Reorder {
        file: std::path::PathBuf,
    },
    /// Delete a content item by UUID
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum SubmissionCommands {
    /// List submissions, newest first
    List {
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Record a submission and trigger the notification channel
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum FooterCommands {
    /// Show the footer singleton (editor view, or resolved with --lang)
    Show {
        /// Resolve the active footer to one language instead
        #[arg(long)]
        lang: Option<String>,
    },
    /// Merge a partial update from a JSON file into the singleton
    Save {
        file: std::path::PathBuf,
    },
    /// Append a social icon
    AddIcon {
        #[arg(long)]
        platform: String,
        #[arg(long)]
        url: String,
    },
    /// Replace the social icon at a position
    UpdateIcon {
        index: usize,
        #[arg(long)]
        platform: String,
        #[arg(long)]
        url: String,
    },
    /// Remove the social icon at a position
    RemoveIcon {
        index: usize,
    },
}

#[derive(Subcommand)]
enum LogoCommands {
    /// Show the logo singleton (editor view)
    Show,
    /// Merge a partial update from a JSON file into the singleton
    Save {
        file: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum SongCommands {
    /// List songs with pagination
    List {
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        genre: Option<String>,
        /// Sort field: created_at, updated_at, title_en, display_order
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Get one song by UUID
    Get {
        id: Uuid,
    },
    /// Create a song from a JSON file (title.en and duration required)
    Create {
        file: std::path::PathBuf,
    },
    /// Apply a partial update from a JSON file
    Update {
        id: Uuid,
        file: std::path::PathBuf,
    },
    /// Delete a song by UUID
    Delete {
        id: Uuid,
    },
    /// Visitor view: active songs resolved to one language
    Site {
        #[arg(long, default_value = "en")]
        lang: String,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Register one play and print the new count
    Play {
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum MediaCommands {
    /// List active ledger assets, newest first
    List {
        /// Filter by category (e.g. hero-video, logo)
        #[arg(long)]
        category: Option<String>,
        /// Filter by resource kind: image, video, audio, raw
        #[arg(long)]
        kind: Option<String>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Get one ledger asset by UUID
    Get {
        id: Uuid,
    },
    /// Visitor view: like list, but usage accounting runs for the hits
    Site {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Aggregate counts and byte totals over the active ledger
    Stats,
    /// Validate, push, and record local files (several files form one batch)
    Upload {
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
        /// Explicit category, overriding inference (e.g. team-photo)
        #[arg(long)]
        category: Option<String>,
        /// Use the logo profile (images only, 5 MB ceiling)
        #[arg(long)]
        logo: bool,
    },
    /// Merge storage-produced renditions from a JSON file into an asset
    Renditions {
        id: Uuid,
        file: std::path::PathBuf,
    },
    /// Delete an asset: ledger row plus best-effort physical removal
    Delete {
        id: Uuid,
    },
}

fn read_json_input<T: serde::de::DeserializeOwned>(file: &std::path::Path) -> anyhow::Result<T> {
    let json =
        std::fs::read_to_string(file).with_context(|| format!("Read {}", file.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Parse {}", file.display()))
}

fn build_upload_request(
    file: &std::path::Path,
    category: Option<AssetCategory>,
    profile: UploadProfile,
) -> anyhow::Result<UploadRequest> {
    let data = std::fs::read(file).with_context(|| format!("Read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let extension = file
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let content_type = mime_for_extension(&extension)
        .ok_or_else(|| anyhow::anyhow!("Cannot infer MIME type for '{}'", filename))?;
    Ok(UploadRequest {
        field_name: "file".to_string(),
        filename,
        content_type: content_type.to_string(),
        data,
        category,
        profile,
        uploaded_by: Some("cli".to_string()),
        eager_renditions: false,
    })
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn parse_kind(s: &str) -> anyhow::Result<ResourceKind> {
    match s {
        "image" => Ok(ResourceKind::Image),
        "video" => Ok(ResourceKind::Video),
        "audio" => Ok(ResourceKind::Audio),
        "raw" => Ok(ResourceKind::Raw),
        other => anyhow::bail!("Unknown resource kind: {}", other),
    }
}

async fn connect(config: &LingoraConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the database")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = LingoraConfig::from_env()?;
    let cli = Cli::parse();
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Content { sub } => {
            let repo = ContentRepository::new(pool);
            match sub {
                ContentCommands::List {
                    r#type,
                    active,
                    search,
                    sort,
                    order,
                    page,
                    limit,
                } => {
                    let content_type = r#type
                        .as_deref()
                        .map(str::parse::<ContentType>)
                        .transpose()?;
                    let filter = EditorContentFilter {
                        content_type,
                        is_active: active,
                        search,
                        sort: sort.as_deref().map(str::parse).transpose()?,
                        direction: order.as_deref().map(str::parse).transpose()?,
                        pagination: Pagination { page, limit },
                    };
                    print_json(&repo.list_for_editor(&filter).await?)?;
                }
                ContentCommands::Get { id_or_key } => match id_or_key.parse::<Uuid>() {
                    Ok(id) => print_json(&repo.get(id).await?)?,
                    Err(_) => print_json(&repo.get_by_key(&id_or_key).await?)?,
                },
                ContentCommands::Create { file } => {
                    let input: CreateContentInput = read_json_input(&file)?;
                    print_json(&repo.create(input, Some("cli")).await?)?;
                }
                ContentCommands::Update { id, file } => {
                    let input: UpdateContentInput = read_json_input(&file)?;
                    print_json(&repo.update(id, input, Some("cli")).await?)?;
                }
                ContentCommands::Resolve { key, lang } => {
                    let language = lang.parse::<LanguageCode>()?;
                    print_json(&repo.get_by_key_for_visitor(&key, language).await?)?;
                }
                ContentCommands::Site { lang, featured } => {
                    let language = lang.parse::<LanguageCode>()?;
                    let query = VisitorContentQuery {
                        language,
                        content_type: None,
                        featured_only: featured,
                    };
                    print_json(&repo.list_for_visitor(query).await?)?;
                }
                ContentCommands::Reorder { file } => {
                    let json = std::fs::read_to_string(&file)
                        .with_context(|| format!("Read {}", file.display()))?;
                    let updates = parse_reorder_batch(&json)?;
                    let outcome = repo.bulk_reorder(&updates, Some("cli")).await?;
                    print_json(&outcome)?;
                }
                ContentCommands::Delete { id } => {
                    repo.delete(id).await?;
                    println!("Deleted content {}", id);
                }
            }
        }
        Commands::Song { sub } => {
            let repo = SongRepository::new(pool);
            match sub {
                SongCommands::List {
                    active,
                    genre,
                    sort,
                    order,
                    page,
                    limit,
                } => {
                    let filter = EditorSongFilter {
                        is_active: active,
                        genre,
                        search: None,
                        sort: sort.as_deref().map(str::parse).transpose()?,
                        direction: order.as_deref().map(str::parse).transpose()?,
                        pagination: Pagination { page, limit },
                    };
                    print_json(&repo.list_for_editor(&filter).await?)?;
                }
                SongCommands::Get { id } => print_json(&repo.get(id).await?)?,
                SongCommands::Create { file } => {
                    let input: CreateSongInput = read_json_input(&file)?;
                    print_json(&repo.create(input, Some("cli")).await?)?;
                }
                SongCommands::Update { id, file } => {
                    let input: UpdateSongInput = read_json_input(&file)?;
                    print_json(&repo.update(id, input, Some("cli")).await?)?;
                }
                SongCommands::Delete { id } => {
                    repo.delete(id).await?;
                    println!("Deleted song {}", id);
                }
                SongCommands::Site {
                    lang,
                    featured,
                    genre,
                    limit,
                } => {
                    let query = VisitorSongQuery {
                        language: lang.parse::<LanguageCode>()?,
                        featured_only: featured,
                        genre,
                        limit,
                    };
                    print_json(&repo.list_for_visitor(&query).await?)?;
                }
                SongCommands::Play { id } => {
                    let count = repo.increment_play_count(id).await?;
                    println!("Song {} play count: {}", id, count);
                }
            }
        }
        Commands::Media { sub } => {
            let storage: Arc<dyn ObjectStorage> = Arc::new(
                LocalStorage::new(
                    config.local_storage_path.clone(),
                    config.local_storage_base_url.clone(),
                )
                .await?,
            );
            let repo = MediaAssetRepository::new(pool, storage.clone());
            match sub {
                MediaCommands::List {
                    category,
                    kind,
                    page,
                    limit,
                } => {
                    let filter = MediaAssetFilter {
                        category: category.as_deref().map(str::parse).transpose()?,
                        resource_kind: kind.as_deref().map(parse_kind).transpose()?,
                        pagination: Pagination { page, limit },
                    };
                    print_json(&repo.list(&filter).await?)?;
                }
                MediaCommands::Get { id } => print_json(&repo.get(id).await?)?,
                MediaCommands::Site {
                    category,
                    kind,
                    page,
                    limit,
                } => {
                    let filter = MediaAssetFilter {
                        category: category.as_deref().map(str::parse).transpose()?,
                        resource_kind: kind.as_deref().map(parse_kind).transpose()?,
                        pagination: Pagination { page, limit },
                    };
                    print_json(&repo.list_for_visitor(&filter).await?)?;
                }
                MediaCommands::Stats => print_json(&repo.stats().await?)?,
                MediaCommands::Upload {
                    files,
                    category,
                    logo,
                } => {
                    let category = category
                        .as_deref()
                        .map(str::parse::<AssetCategory>)
                        .transpose()?;
                    let profile = if logo {
                        UploadProfile::Logo
                    } else {
                        UploadProfile::General
                    };
                    let requests = files
                        .iter()
                        .map(|file| build_upload_request(file, category, profile))
                        .collect::<anyhow::Result<Vec<_>>>()?;
                    let service = UploadService::new(storage.clone(), repo.clone());
                    if requests.len() == 1 {
                        let request = requests.into_iter().next().ok_or_else(|| {
                            anyhow::anyhow!("No upload request built")
                        })?;
                        print_json(&service.upload_one(request).await?)?;
                    } else {
                        for outcome in service.upload_many(requests).await? {
                            match outcome.result {
                                Ok(asset) => print_json(&asset)?,
                                Err(e) => eprintln!("{}: {}", outcome.filename, e),
                            }
                        }
                    }
                }
                MediaCommands::Renditions { id, file } => {
                    let renditions: Vec<DerivedRendition> = read_json_input(&file)?;
                    print_json(&repo.merge_renditions(id, &renditions).await?)?;
                }
                MediaCommands::Delete { id } => {
                    repo.delete(id).await?;
                    println!("Deleted media asset {}", id);
                }
            }
        }
        Commands::Submissions { sub } => {
            let repo = QuerySubmissionRepository::new(pool);
            match sub {
                SubmissionCommands::List { page, limit } => {
                    print_json(&repo.list(Pagination { page, limit }).await?)?;
                }
                SubmissionCommands::Submit {
                    name,
                    email,
                    subject,
                    message,
                } => {
                    let service = SubmissionService::new(repo, Arc::new(LogNotifier));
                    let input = CreateQuerySubmission {
                        name,
                        email,
                        subject,
                        message,
                    };
                    print_json(&service.submit(input).await?)?;
                }
            }
        }
        Commands::Footer { sub } => {
            let repo = SiteConfigRepository::new(pool);
            match sub {
                FooterCommands::Show { lang } => match lang {
                    Some(lang) => {
                        let language = lang.parse::<LanguageCode>()?;
                        print_json(&repo.resolve_footer(language).await?)?;
                    }
                    None => match repo.get_footer_for_editor().await? {
                        Some(footer) => print_json(&footer)?,
                        None => println!("Footer not configured yet"),
                    },
                },
                FooterCommands::Save { file } => {
                    let input: FooterInput = read_json_input(&file)?;
                    print_json(&repo.save_footer(input).await?)?;
                }
                FooterCommands::AddIcon { platform, url } => {
                    let icon = SocialIcon {
                        platform,
                        url,
                        icon: None,
                        is_active: true,
                    };
                    print_json(&repo.add_social_icon(icon).await?)?;
                }
                FooterCommands::UpdateIcon {
                    index,
                    platform,
                    url,
                } => {
                    let icon = SocialIcon {
                        platform,
                        url,
                        icon: None,
                        is_active: true,
                    };
                    print_json(&repo.update_social_icon(index, icon).await?)?;
                }
                FooterCommands::RemoveIcon { index } => {
                    print_json(&repo.remove_social_icon(index).await?)?;
                }
            }
        }
        Commands::Logo { sub } => {
            let repo = SiteConfigRepository::new(pool);
            match sub {
                LogoCommands::Show => match repo.get_logo_for_editor().await? {
                    Some(logo) => print_json(&logo)?,
                    None => println!("Logo not configured yet"),
                },
                LogoCommands::Save { file } => {
                    let input: LogoInput = read_json_input(&file)?;
                    print_json(&repo.save_logo(input).await?)?;
                }
            }
        }
        Commands::Migrate => {
            // Workspace migrations/ from the crate root
            let migrations_dir =
                std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
            let migrator = sqlx::migrate::Migrator::new(migrations_dir)
                .await
                .context("Failed to load migrations")?;
            migrator
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }
    }

    Ok(())
}
