use account::{
    api::{routes::create_router, ApiDoc},
    auth::password::{PasswordHasher, DEFAULT_COST},
    cli::{output::Output, Cli, Commands},
    utils::toml_config::ConfigError,
    AccountConfig, AppState, BcryptPasswordHasher, DatabaseProvider, Rs256TokenCodec,
};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        None => serve(&cli.config, cli.verbose, &output).await,
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::HashPassword { password }) => hash_password(&cli.config, &password),
        Some(Commands::Openapi) => {
            println!("{}", ApiDoc::openapi().to_pretty_json()?);
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let config = AccountConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    init_tracing(&config.server.log_level, verbose);
    tracing::info!(path = %config_path.display(), "configuration loaded");
    output.banner();

    let keys = config.load_token_keys()?;

    let provider = DatabaseProvider::from_url(&config.database.url);
    if let DatabaseProvider::SQLite { path } = &provider {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
    }
    let store = provider.create_store().await?;
    tracing::info!(database = %config.database.url, "database ready");

    let addr = config.bind_address();
    let state = AppState::new(config, store, keys)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    output.success(&format!("listening on http://{}", addr));
    tracing::info!(%addr, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn show_config(config_path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = match AccountConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            return Err(e.into());
        }
    };

    output.header("Server");
    output.kv("address", &config.bind_address());
    output.kv("log_level", &config.server.log_level);

    output.header("Auth");
    output.kv("issuer", &config.auth.issuer);
    output.kv("token_expiry_secs", &config.auth.token_expiry_secs.to_string());
    output.kv("private_key_path", &config.auth.private_key_path.display().to_string());
    output.kv("public_key_path", &config.auth.public_key_path.display().to_string());
    output.kv("password_cost", &config.auth.password_cost.to_string());

    output.header("Database");
    output.kv("url", &config.database.url);

    if validate {
        println!();
        let keys = config.load_token_keys()?;
        Rs256TokenCodec::new(Arc::new(keys))?;
        output.success("configuration and key files are valid");
    } else {
        println!();
        output.info("run with --validate to check the key files");
    }

    Ok(())
}

fn hash_password(config_path: &Path, password: &str) -> anyhow::Result<()> {
    let cost = match AccountConfig::load(config_path) {
        Ok(config) => config.auth.password_cost,
        Err(ConfigError::FileNotFound(_)) => DEFAULT_COST,
        Err(e) => return Err(e.into()),
    };

    let hash = BcryptPasswordHasher::with_cost(cost).hash(password)?;
    println!("{}", hash);
    Ok(())
}
