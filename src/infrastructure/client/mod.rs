//! HTTP client for the Inkwell API.
//!
//! Requests carry the stored access token. When the server answers 401 and
//! a refresh token is known, the client refreshes once and retries the
//! request. Concurrent 401s share a single refresh: the first caller holds
//! the session lock while refreshing and later callers see the bumped
//! generation and reuse its result.

pub mod accounts;
pub mod bookmarks;
pub mod books;
pub mod categories;
pub mod chapters;
pub mod reading_records;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::envelope::Envelope;
use crate::application::errors::ErrorResponse;
use crate::domain::tokens::{RefreshRequest, TokenPair};

#[derive(Debug, Default)]
struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Bumped whenever the tokens are replaced or cleared.
    generation: u64,
}

pub struct InkwellClient {
    base_url: Url,
    http: Client,
    session: Mutex<Session>,
}

impl InkwellClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let mut normalized = base_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent(concat!("inkwell-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            base_url: normalized,
            http,
            session: Mutex::new(Session::default()),
        })
    }

    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid API url: {base_url}"))?;
        Self::new(url)
    }

    /// Seed the session with previously issued tokens.
    pub fn with_tokens(self, access_token: Option<String>, refresh_token: Option<String>) -> Self {
        let session = Session {
            access_token: access_token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            generation: 0,
        };
        Self {
            session: Mutex::new(session),
            ..self
        }
    }

    pub fn accounts(&self) -> accounts::AccountsClient<'_> {
        accounts::AccountsClient::new(self)
    }

    pub fn books(&self) -> books::BooksClient<'_> {
        books::BooksClient::new(self)
    }

    pub fn chapters(&self) -> chapters::ChaptersClient<'_> {
        chapters::ChaptersClient::new(self)
    }

    pub fn categories(&self) -> categories::CategoriesClient<'_> {
        categories::CategoriesClient::new(self)
    }

    pub fn bookmarks(&self) -> bookmarks::BookmarksClient<'_> {
        bookmarks::BookmarksClient::new(self)
    }

    pub fn reading_records(&self) -> reading_records::ReadingRecordsClient<'_> {
        reading_records::ReadingRecordsClient::new(self)
    }

    /// The tokens currently held, if both are known.
    pub async fn tokens(&self) -> Option<TokenPair> {
        let session = self.session.lock().await;
        Some(TokenPair {
            access_token: session.access_token.clone()?,
            refresh_token: session.refresh_token.clone()?,
        })
    }

    pub(crate) async fn refresh_token(&self) -> Option<String> {
        self.session.lock().await.refresh_token.clone()
    }

    pub(crate) async fn store_tokens(&self, tokens: &TokenPair) {
        let mut session = self.session.lock().await;
        session.access_token = Some(tokens.access_token.clone());
        session.refresh_token = Some(tokens.refresh_token.clone());
        session.generation += 1;
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {path}"))
    }

    /// Build a request. Authentication is attached by [`Self::send`].
    pub(crate) fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send with the current access token, refreshing and retrying once on 401.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let retry = request.try_clone();
        let (token, generation) = self.snapshot().await;

        let response = with_bearer(request, token.as_deref())
            .send()
            .await
            .context("request failed")?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(retry) = retry else {
            return Ok(response);
        };
        if !self.refresh_after(generation).await? {
            return Ok(response);
        }

        let (token, _) = self.snapshot().await;
        with_bearer(retry, token.as_deref())
            .send()
            .await
            .context("request failed")
    }

    async fn snapshot(&self) -> (Option<String>, u64) {
        let session = self.session.lock().await;
        (session.access_token.clone(), session.generation)
    }

    /// Refresh the tokens unless another caller already did so after
    /// `seen_generation`. Returns whether a retry may succeed.
    async fn refresh_after(&self, seen_generation: u64) -> Result<bool> {
        let mut session = self.session.lock().await;
        if session.generation != seen_generation {
            return Ok(session.access_token.is_some());
        }
        let Some(refresh_token) = session.refresh_token.clone() else {
            return Ok(false);
        };

        debug!("access token rejected, refreshing");
        match self.exchange_refresh_token(&refresh_token).await {
            Ok(tokens) => {
                session.access_token = Some(tokens.access_token);
                session.refresh_token = Some(tokens.refresh_token);
                session.generation += 1;
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                session.access_token = None;
                session.refresh_token = None;
                session.generation += 1;
                Err(err.context("session expired, please log in again"))
            }
        }
    }

    pub(crate) async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let url = self.endpoint("api/auth/refresh")?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await
            .context("refresh request failed")?;
        self.handle_json(response).await
    }

    /// Unwrap the `data` field of a successful envelope.
    pub(crate) async fn handle_response<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.handle_json(response).await?;
        Ok(envelope.data)
    }

    /// Return the `msg` of a successful envelope, ignoring its payload.
    pub(crate) async fn handle_message(&self, response: Response) -> Result<String> {
        let envelope: Envelope<serde_json::Value> = self.handle_json(response).await?;
        Ok(envelope.msg)
    }

    /// Deserialize a successful body as-is.
    pub(crate) async fn handle_json<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .context("failed to deserialize response body")
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub(crate) async fn response_error(&self, response: Response) -> anyhow::Error {
        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&bytes) {
            return anyhow!("request failed ({status}): {}", err.msg);
        }

        let message = String::from_utf8_lossy(&bytes);
        anyhow!("request failed ({status}): {message}")
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
