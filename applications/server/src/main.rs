/// TuneViewer Server - music catalog and playlist API
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tune_core::{CatalogStore, CreateUser, UserRole};
use tune_server::{
    api,
    config::ServerConfig,
    services::{AuthService, FileStorage},
    state::AppState,
};
use tune_storage::Database;

#[derive(Parser)]
#[command(name = "tune-server")]
#[command(about = "TuneViewer catalog and playlist server", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tune_server=info,tune_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            email,
            password,
            admin,
        } => add_user(config, username, email, password, admin).await?,
        Commands::ListUsers => list_users(config).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting TuneViewer server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let db = open_database(&config).await?;
    tracing::info!("Database connected");

    let file_storage = FileStorage::new(config.storage.media_root.clone(), config.uploads.clone());
    file_storage.initialize().await?;
    tracing::info!(
        "Media storage initialized at {}",
        config.storage.media_root.display()
    );

    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
    );

    let app_state = AppState::new(
        Arc::new(db),
        Arc::new(auth_service),
        Arc::new(file_storage),
    );

    let app = api::router(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(cors_layer(&config.server.cors_origins));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<Database> {
    let url = &config.storage.database_url;
    if let Some(parent) = url
        .strip_prefix("sqlite://")
        .map(Path::new)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    Ok(Database::new(url).await?)
}

async fn add_user(
    config: ServerConfig,
    username: String,
    email: String,
    password: String,
    admin: bool,
) -> anyhow::Result<()> {
    let db = open_database(&config).await?;

    // Password hashing needs no signing key
    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
    );
    let password_hash = auth_service.hash_password(&password)?;

    let user = db
        .create_user(CreateUser {
            display_name: Some(username.clone()),
            username,
            email,
            password_hash,
            role: if admin { UserRole::Admin } else { UserRole::User },
        })
        .await?;

    println!(
        "Created {} {} (id {})",
        user.role.as_str(),
        user.username,
        user.id
    );
    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config).await?;
    let users = db.list_users(0, i64::MAX).await?;

    println!("Users:");
    for user in users {
        println!(
            "  {} - {} <{}> [{}]{}",
            user.id,
            user.username,
            user.email,
            user.role.as_str(),
            if user.is_active { "" } else { " (inactive)" }
        );
    }

    Ok(())
}
