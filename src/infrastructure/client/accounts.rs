use anyhow::{Result, anyhow};

use super::InkwellClient;
use crate::domain::ids::UserId;
use crate::domain::tokens::{LoginResponse, TokenPair};
use crate::domain::users::{Credentials, RegisteredUser, Registration, UserProfile};

pub struct AccountsClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> AccountsClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    /// Log in and keep the returned tokens for subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.client.endpoint("api/auth/login")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(&Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let login: LoginResponse = self.client.handle_json(response).await?;
        self.client.store_tokens(&login.tokens).await;
        Ok(login)
    }

    /// Exchange the stored refresh token for a new pair.
    pub async fn refresh(&self) -> Result<TokenPair> {
        let refresh_token = self
            .client
            .refresh_token()
            .await
            .ok_or_else(|| anyhow!("no refresh token available, log in first"))?;
        let tokens = self.client.exchange_refresh_token(&refresh_token).await?;
        self.client.store_tokens(&tokens).await;
        Ok(tokens)
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser> {
        let url = self.client.endpoint("api/users/register")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(registration)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        let url = self.client.endpoint("api/users/profile")?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn user(&self, id: UserId) -> Result<UserProfile> {
        let url = self.client.endpoint(&format!("api/users/{id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }
}
