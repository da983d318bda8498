use std::collections::BTreeMap;

use anyhow::Result;

use super::InkwellClient;
use crate::application::envelope::HistoryPage;
use crate::application::routes::api::reading_records::BatchProgressRequest;
use crate::domain::ids::BookId;
use crate::domain::reading_records::{
    BookProgress, ReadingHistoryEntry, ReadingRecord, UpsertReadingRecord,
};

pub struct ReadingRecordsClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> ReadingRecordsClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<HistoryPage<ReadingHistoryEntry>> {
        let mut url = self.client.endpoint("api/reading-records")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(page_size) = page_size {
                query.append_pair("page_size", &page_size.to_string());
            }
        }
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn get(&self, book_id: BookId) -> Result<Option<BookProgress>> {
        let url = self
            .client
            .endpoint(&format!("api/reading-records/book/{book_id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn batch(&self, book_ids: &[BookId]) -> Result<BTreeMap<BookId, BookProgress>> {
        let url = self.client.endpoint("api/reading-records/batch")?;
        let request = self
            .client
            .request(reqwest::Method::POST, url)
            .json(&BatchProgressRequest {
                book_ids: book_ids.to_vec(),
            });
        let response = self.client.send(request).await?;
        self.client.handle_response(response).await
    }

    pub async fn save(&self, record: &UpsertReadingRecord) -> Result<ReadingRecord> {
        let url = self.client.endpoint("api/reading-records")?;
        let request = self
            .client
            .request(reqwest::Method::POST, url)
            .json(record);
        let response = self.client.send(request).await?;
        self.client.handle_response(response).await
    }

    pub async fn delete(&self, book_id: BookId) -> Result<String> {
        let url = self
            .client
            .endpoint(&format!("api/reading-records/book/{book_id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::DELETE, url))
            .await?;
        self.client.handle_message(response).await
    }

    pub async fn clear(&self) -> Result<String> {
        let url = self.client.endpoint("api/reading-records/clear")?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::DELETE, url))
            .await?;
        self.client.handle_message(response).await
    }
}
