use anyhow::Result;
use clap::Args;

use super::print_json;
use crate::domain::users::Registration;
use crate::infrastructure::client::InkwellClient;

#[derive(Debug, Args)]
pub struct LoginCommand {
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "INKWELL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn login(client: &InkwellClient, command: LoginCommand) -> Result<()> {
    let login = client
        .accounts()
        .login(&command.username, &command.password)
        .await?;
    eprintln!(
        "Logged in as {}. Export INKWELL_ACCESS_TOKEN and INKWELL_REFRESH_TOKEN to reuse this session.",
        login.user.nickname
    );
    print_json(&login)
}

#[derive(Debug, Args)]
pub struct RegisterCommand {
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "INKWELL_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub nickname: Option<String>,
}

pub async fn register(client: &InkwellClient, command: RegisterCommand) -> Result<()> {
    let registration = Registration {
        username: command.username,
        password: command.password,
        nickname: command.nickname,
    };
    let user = client.accounts().register(&registration).await?;
    print_json(&user)
}

pub async fn profile(client: &InkwellClient) -> Result<()> {
    let profile = client.accounts().profile().await?;
    print_json(&profile)
}
