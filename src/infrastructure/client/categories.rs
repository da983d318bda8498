use anyhow::Result;

use super::InkwellClient;

pub struct CategoriesClient<'a> {
    client: &'a InkwellClient,
}

impl<'a> CategoriesClient<'a> {
    pub fn new(client: &'a InkwellClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        let url = self.client.endpoint("api/categories")?;
        let response = self
            .client
            .send(self.client.request(reqwest::Method::GET, url))
            .await?;
        self.client.handle_response(response).await
    }
}
