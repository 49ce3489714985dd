use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod application;
mod cli;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::blog_service::BlogService;
use cli::{Cli, Command};
use data::repositories::sqlite::{SqliteGroupRepository, SqlitePostRepository, SqliteUserRepository};
use domain::group::NewGroupRequest;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::{LogFormat, init_logging};
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command() {
        Command::Serve => serve().await,
        Command::CreateGroup {
            title,
            slug,
            description,
        } => create_group(title, slug, description).await,
    }
}

async fn serve() -> Result<()> {
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level, settings.log_format)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds));
    let state = AppState::new(pool, jwt, settings.session_cookie_secure);

    server::run_http(&settings, state).await
}

async fn create_group(title: String, slug: String, description: String) -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    init_logging(&log_level, LogFormat::Compact)?;

    let pool = create_pool(&Settings::database_url_from_env(), 1).await?;
    run_migrations(&pool).await?;

    let service = BlogService::new(
        SqlitePostRepository::new(pool.clone()),
        SqliteGroupRepository::new(pool.clone()),
        SqliteUserRepository::new(pool.clone()),
    );
    let group = service
        .create_group(NewGroupRequest {
            title,
            slug,
            description,
        })
        .await
        .context("failed to create group")?;

    info!(group_id = group.id, "group created");
    println!("group '{}' created: /group/{}/", group.title, group.slug);
    Ok(())
}
