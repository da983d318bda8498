use anyhow::Result;

use super::InkwellClient;
use crate::application::routes::api::bookmarks::{AddBookmark, BookmarkCreated, BookmarkStatus};
use crate::domain::bookmarks::ShelfEntry;
use crate::domain::ids::BookId;

pub struct BookmarksClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> BookmarksClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<ShelfEntry>> {
        let url = self.client.endpoint("api/bookmarks")?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn add(&self, book_id: BookId) -> Result<BookmarkCreated> {
        let url = self.client.endpoint("api/bookmarks")?;
        let request = self
            .client
            .request(reqwest::Method::POST, url)
            .json(&AddBookmark { book_id });
        let response = self.client.send(request).await?;
        self.client.handle_response(response).await
    }

    /// Returns the server's confirmation message.
    pub async fn remove(&self, book_id: BookId) -> Result<String> {
        let url = self.client.endpoint(&format!("api/bookmarks/{book_id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::DELETE, url))
            .await?;
        self.client.handle_message(response).await
    }

    pub async fn check(&self, book_id: BookId) -> Result<bool> {
        let url = self
            .client
            .endpoint(&format!("api/bookmarks/check/{book_id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        let status: BookmarkStatus = self.client.handle_response(response).await?;
        Ok(status.is_bookmarked)
    }

    /// Flip shelf membership; returns whether the book is now shelved.
    pub async fn toggle(&self, book_id: BookId) -> Result<bool> {
        let url = self
            .client
            .endpoint(&format!("api/bookmarks/toggle/{book_id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::POST, url))
            .await?;
        let status: BookmarkStatus = self.client.handle_response(response).await?;
        Ok(status.is_bookmarked)
    }
}
