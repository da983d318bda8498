use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::BookId;
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Subcommand)]
pub enum ShelfCommands {
    /// List books on the shelf
    List,
    /// Put a book on the shelf
    Add(ShelfBookCommand),
    /// Take a book off the shelf
    Remove(ShelfBookCommand),
    /// Add the book if absent, remove it otherwise
    Toggle(ShelfBookCommand),
    /// Report whether a book is on the shelf
    Check(ShelfBookCommand),
}

#[derive(Debug, Args)]
pub struct ShelfBookCommand {
    pub book_id: i64,
}

pub async fn run(client: &InkwellClient, cmd: ShelfCommands) -> Result<()> {
    let bookmarks = client.bookmarks();
    match cmd {
        ShelfCommands::List => print_json(&bookmarks.list().await?),
        ShelfCommands::Add(c) => print_json(&bookmarks.add(BookId::new(c.book_id)).await?),
        ShelfCommands::Remove(c) => {
            let message = bookmarks.remove(BookId::new(c.book_id)).await?;
            println!("{message}");
            Ok(())
        }
        ShelfCommands::Toggle(c) => {
            let shelved = bookmarks.toggle(BookId::new(c.book_id)).await?;
            println!("{}", if shelved { "on shelf" } else { "removed" });
            Ok(())
        }
        ShelfCommands::Check(c) => {
            let shelved = bookmarks.check(BookId::new(c.book_id)).await?;
            println!("{shelved}");
            Ok(())
        }
    }
}
