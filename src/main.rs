use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use inkwell::application::{ServerConfig, serve};
use inkwell::infrastructure::catalog::{Catalog, CatalogImporter};
use inkwell::infrastructure::client::InkwellClient;
use inkwell::infrastructure::database::Database;
use inkwell::infrastructure::repositories::books::SqlBookRepository;
use inkwell::infrastructure::repositories::categories::SqlCategoryRepository;
use inkwell::presentation::cli::{
    Cli, Commands, ImportCommand, ServeCommand, accounts, books, categories, chapters, history,
    shelf,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Import(cmd) => run_import(cmd).await,
        command => {
            let client = InkwellClient::from_base_url(&cli.api_url)?
                .with_tokens(cli.access_token.clone(), cli.refresh_token);
            let outcome = run_client_command(&client, command).await;
            report_refreshed_tokens(&client, cli.access_token.as_deref()).await;
            outcome
        }
    }
}

async fn run_client_command(client: &InkwellClient, command: Commands) -> Result<()> {
    match command {
        Commands::Login(cmd) => accounts::login(client, cmd).await,
        Commands::Register(cmd) => accounts::register(client, cmd).await,
        Commands::Profile => accounts::profile(client).await,
        Commands::Book { command } => books::run(client, command).await,
        Commands::Chapter { command } => chapters::run(client, command).await,
        Commands::Category { command } => categories::run(client, command).await,
        Commands::Shelf { command } => shelf::run(client, command).await,
        Commands::History { command } => history::run(client, command).await,
        Commands::Serve(_) | Commands::Import(_) => {
            anyhow::bail!("command does not talk to the API")
        }
    }
}

/// Tokens rotated by an automatic refresh only live in this process, so
/// tell the user what to export for the next invocation.
async fn report_refreshed_tokens(client: &InkwellClient, initial_access: Option<&str>) {
    let Some(initial_access) = initial_access else {
        return;
    };
    if let Some(tokens) = client.tokens().await
        && tokens.access_token != initial_access
    {
        eprintln!("Session refreshed. Update your environment:");
        eprintln!("export INKWELL_ACCESS_TOKEN={}", tokens.access_token);
        eprintln!("export INKWELL_REFRESH_TOKEN={}", tokens.refresh_token);
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        token_secret: command.token_secret,
        access_ttl_minutes: command.access_ttl_minutes,
        refresh_ttl_days: command.refresh_ttl_days,
        auth_rate_limit_per_minute: command.auth_rate_limit,
    };

    serve(config).await
}

async fn run_import(command: ImportCommand) -> Result<()> {
    let catalog = Catalog::from_path(&command.file)?;
    let database = Database::connect(&command.database_url)
        .await
        .context("failed to connect to database")?;
    let pool = database.clone_pool();

    let importer = CatalogImporter::new(
        Arc::new(SqlCategoryRepository::new(pool.clone())),
        Arc::new(SqlBookRepository::new(pool)),
    );
    let summary = importer.import(catalog).await?;

    eprintln!(
        "Imported {} categories, {} books and {} chapters.",
        summary.categories, summary.books, summary.chapters
    );
    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
