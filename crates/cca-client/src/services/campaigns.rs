//! Campaigns.

use cca_domain::{Campaign, CampaignDraft, Page, PageRequest, Pagination};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use super::{UploadedFile, page_query};
use crate::error::Result;
use crate::http::ApiClient;

/// `/api/campaigns`
#[derive(Debug, Clone)]
pub struct CampaignsService {
    client: ApiClient,
}

impl CampaignsService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Campaign>> {
        #[derive(Deserialize)]
        struct CampaignsResponse {
            #[serde(default)]
            campaigns: Vec<Campaign>,
            #[serde(default)]
            pagination: Pagination,
        }

        let response: CampaignsResponse = self
            .client
            .get_json("/api/campaigns", &page_query(request))
            .await?;

        tracing::debug!(
            page = request.page,
            count = response.campaigns.len(),
            "Fetched campaigns"
        );

        Ok(Page {
            items: response.campaigns,
            pagination: response.pagination,
        })
    }

    /// Every campaign, unpaginated. Slow on large datasets; callers should go
    /// through the campaigns cache.
    pub async fn list_all(&self) -> Result<Vec<Campaign>> {
        let campaigns: Vec<Campaign> = self.client.get_json("/api/campaigns/all", &[]).await?;
        tracing::debug!(count = campaigns.len(), "Fetched full campaigns list");
        Ok(campaigns)
    }

    pub async fn list_active(&self) -> Result<Vec<Campaign>> {
        self.client.get_json("/api/campaigns/active", &[]).await
    }

    pub async fn get(&self, id: &str) -> Result<Campaign> {
        self.client.get_json(&self.client.path("/api/campaigns", &[id]), &[]).await
    }

    /// # Errors
    ///
    /// Validation errors are raised before any request is sent.
    pub async fn create(&self, draft: &CampaignDraft) -> Result<Value> {
        draft.validate()?;
        let created = self
            .client
            .send_json(Method::POST, "/api/campaigns", draft)
            .await?;
        tracing::info!(nombre = %draft.nombre, "Campaign created");
        Ok(created)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.client.path("/api/campaigns", &[id])).await?;
        tracing::info!(id, "Campaign deleted");
        Ok(())
    }

    pub async fn upload_image(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadedFile> {
        self.client
            .upload("/api/upload/campaign", file_name, contents)
            .await
    }

    /// Public URL of an uploaded campaign image. Absolute URLs pass through.
    #[must_use]
    pub fn image_url(&self, file_name: &str) -> Option<String> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            None
        } else if file_name.starts_with("http://") || file_name.starts_with("https://") {
            Some(file_name.to_string())
        } else {
            Some(self.client.url(&self.client.path("/api/upload/campaign", &[file_name])))
        }
    }
}
