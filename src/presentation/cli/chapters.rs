use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::{BookId, ChapterId};
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Subcommand)]
pub enum ChapterCommands {
    /// Table of contents for a book
    List(ListChaptersCommand),
    /// Print a chapter
    Read(ReadChapterCommand),
}

pub async fn run(client: &InkwellClient, cmd: ChapterCommands) -> Result<()> {
    match cmd {
        ChapterCommands::List(c) => list_chapters(client, c).await,
        ChapterCommands::Read(c) => read_chapter(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct ListChaptersCommand {
    #[arg(long)]
    pub book_id: i64,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

pub async fn list_chapters(client: &InkwellClient, command: ListChaptersCommand) -> Result<()> {
    let chapters = client
        .chapters()
        .list(BookId::new(command.book_id), command.page, command.limit)
        .await?;
    print_json(&chapters)
}

#[derive(Debug, Args)]
pub struct ReadChapterCommand {
    pub id: i64,
    /// Print the chapter as JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

pub async fn read_chapter(client: &InkwellClient, command: ReadChapterCommand) -> Result<()> {
    let chapter = client.chapters().get(ChapterId::new(command.id)).await?;
    if command.json {
        return print_json(&chapter);
    }

    println!("{} · {}\n", chapter.book.title, chapter.title);
    println!("{}", chapter.content);
    if let Some(next) = &chapter.next_chapter {
        println!("\nNext: {} (id {})", next.title, next.id);
    }
    Ok(())
}
