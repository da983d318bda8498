use anyhow::Result;

use super::InkwellClient;
use crate::application::envelope::Paginated;
use crate::domain::chapters::{ChapterDetail, ChapterListItem};
use crate::domain::ids::{BookId, ChapterId};

pub struct ChaptersClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> ChaptersClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        book_id: BookId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<ChapterListItem>> {
        let mut url = self.client.endpoint(&format!("api/books/{book_id}/chapters"))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_json(response).await
    }

    pub async fn get(&self, id: ChapterId) -> Result<ChapterDetail> {
        let url = self.client.endpoint(&format!("api/chapters/{id}"))?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }
}
