use anyhow::Result;
use clap::Subcommand;

use super::print_json;
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Subcommand)]
pub enum CategoryCommands {
    /// List category names in display order
    List,
}

pub async fn run(client: &InkwellClient, cmd: CategoryCommands) -> Result<()> {
    match cmd {
        CategoryCommands::List => {
            let categories = client.categories().list().await?;
            print_json(&categories)
        }
    }
}
