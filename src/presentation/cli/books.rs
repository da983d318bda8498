use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::BookId;
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Subcommand)]
pub enum BookCommands {
    /// List books, newest first
    List(ListBooksCommand),
    /// Show a book
    Get(GetBookCommand),
    /// Search titles, authors and descriptions
    Search(SearchBooksCommand),
}

pub async fn run(client: &InkwellClient, cmd: BookCommands) -> Result<()> {
    match cmd {
        BookCommands::List(c) => list_books(client, c).await,
        BookCommands::Get(c) => get_book(client, c).await,
        BookCommands::Search(c) => search_books(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct ListBooksCommand {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Category name; "全部" lists every category
    #[arg(long)]
    pub category: Option<String>,
}

pub async fn list_books(client: &InkwellClient, command: ListBooksCommand) -> Result<()> {
    let books = client
        .books()
        .list(command.page, command.limit, command.category.as_deref())
        .await?;
    print_json(&books)
}

#[derive(Debug, Args)]
pub struct GetBookCommand {
    pub id: i64,
}

pub async fn get_book(client: &InkwellClient, command: GetBookCommand) -> Result<()> {
    let book = client.books().get(BookId::new(command.id)).await?;
    print_json(&book)
}

#[derive(Debug, Args)]
pub struct SearchBooksCommand {
    pub keyword: String,
}

pub async fn search_books(client: &InkwellClient, command: SearchBooksCommand) -> Result<()> {
    let books = client.books().search(&command.keyword).await?;
    print_json(&books)
}
