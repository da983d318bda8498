use anyhow::Result;

use super::InkwellClient;
use crate::application::envelope::Paginated;
use crate::domain::books::{BookDetail, BookSummary};
use crate::domain::ids::BookId;

pub struct BooksClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> BooksClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
        category: Option<&str>,
    ) -> Result<Paginated<BookSummary>> {
        let mut url = self.client.endpoint("api/books")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(category) = category {
                query.append_pair("category", category);
            }
        }
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_json(response).await
    }

    pub async fn get(&self, id: BookId) -> Result<BookDetail> {
        let url = self.client.endpoint(&format!("api/books/{id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<BookSummary>> {
        let mut url = self.client.endpoint("api/books/search")?;
        url.query_pairs_mut().append_pair("keyword", keyword);
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }
}
