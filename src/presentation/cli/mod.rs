pub mod accounts;
pub mod books;
pub mod categories;
pub mod chapters;
pub mod history;
pub mod shelf;

use std::net::SocketAddr;
use std::path::PathBuf;

use accounts::{LoginCommand, RegisterCommand};
use books::BookCommands;
use categories::CategoryCommands;
use chapters::ChapterCommands;
use clap::{Args, Parser, Subcommand};
use history::HistoryCommands;
use shelf::ShelfCommands;

use crate::application::state::DEFAULT_AUTH_RATE_LIMIT_PER_MINUTE;
use crate::infrastructure::auth::{DEFAULT_ACCESS_TTL_MINUTES, DEFAULT_REFRESH_TTL_DAYS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve and browse an online reading platform", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "INKWELL_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    /// Access token from a previous `login`
    #[arg(long, global = true, env = "INKWELL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Refresh token from a previous `login`, used when the access token expires
    #[arg(long, global = true, env = "INKWELL_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Load categories, books and chapters from a JSON catalog
    Import(ImportCommand),

    /// Log in and print a token pair
    Login(LoginCommand),

    /// Create an account
    Register(RegisterCommand),

    /// Show the logged-in user's profile
    Profile,

    /// Browse the catalog
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },

    /// List and read chapters
    Chapter {
        #[command(subcommand)]
        command: ChapterCommands,
    },

    /// List categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage the bookshelf
    Shelf {
        #[command(subcommand)]
        command: ShelfCommands,
    },

    /// Manage reading progress
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "INKWELL_DATABASE_URL",
        default_value = "sqlite://inkwell.db"
    )]
    pub database_url: String,

    #[arg(long, env = "INKWELL_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    /// HMAC secret used to sign access and refresh tokens
    #[arg(
        long,
        env = "INKWELL_TOKEN_SECRET",
        default_value = "inkwell-jwt-secret",
        hide_env_values = true
    )]
    pub token_secret: String,

    #[arg(long, env = "INKWELL_ACCESS_TTL_MINUTES", default_value_t = DEFAULT_ACCESS_TTL_MINUTES)]
    pub access_ttl_minutes: i64,

    #[arg(long, env = "INKWELL_REFRESH_TTL_DAYS", default_value_t = DEFAULT_REFRESH_TTL_DAYS)]
    pub refresh_ttl_days: i64,

    /// Login, register and refresh calls allowed per client IP per minute
    #[arg(long, env = "INKWELL_AUTH_RATE_LIMIT", default_value_t = DEFAULT_AUTH_RATE_LIMIT_PER_MINUTE)]
    pub auth_rate_limit: u32,
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    #[arg(
        long,
        env = "INKWELL_DATABASE_URL",
        default_value = "sqlite://inkwell.db"
    )]
    pub database_url: String,

    /// Path to the catalog JSON file
    #[arg(long)]
    pub file: PathBuf,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
