use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::{BookId, ChapterId};
use crate::domain::reading_records::UpsertReadingRecord;
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// Recently read books
    List(ListHistoryCommand),
    /// Progress within one book
    Get(BookProgressCommand),
    /// Record the current chapter and progress for a book
    Save(SaveProgressCommand),
    /// Forget progress for one book
    Delete(BookProgressCommand),
    /// Forget all reading history
    Clear,
}

pub async fn run(client: &InkwellClient, cmd: HistoryCommands) -> Result<()> {
    let records = client.reading_records();
    match cmd {
        HistoryCommands::List(c) => print_json(&records.list(c.page, c.page_size).await?),
        HistoryCommands::Get(c) => print_json(&records.get(BookId::new(c.book_id)).await?),
        HistoryCommands::Save(c) => {
            let record = UpsertReadingRecord {
                book_id: BookId::new(c.book_id),
                chapter_id: ChapterId::new(c.chapter_id),
                progress: c.progress,
            };
            print_json(&records.save(&record).await?)
        }
        HistoryCommands::Delete(c) => {
            println!("{}", records.delete(BookId::new(c.book_id)).await?);
            Ok(())
        }
        HistoryCommands::Clear => {
            println!("{}", records.clear().await?);
            Ok(())
        }
    }
}

#[derive(Debug, Args)]
pub struct ListHistoryCommand {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BookProgressCommand {
    pub book_id: i64,
}

#[derive(Debug, Args)]
pub struct SaveProgressCommand {
    #[arg(long)]
    pub book_id: i64,
    #[arg(long)]
    pub chapter_id: i64,
    /// Percentage through the chapter (0-100)
    #[arg(long, default_value_t = 0)]
    pub progress: i64,
}
