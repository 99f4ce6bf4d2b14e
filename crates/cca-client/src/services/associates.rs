//! Associates (merchants).

use cca_domain::{Associate, AssociateDraft, Page, PageRequest, Pagination};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use super::{UploadedFile, page_query};
use crate::error::Result;
use crate::http::ApiClient;

/// `/api/associates`
#[derive(Debug, Clone)]
pub struct AssociatesService {
    client: ApiClient,
}

impl AssociatesService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Associate>> {
        #[derive(Deserialize)]
        struct AssociatesResponse {
            #[serde(default)]
            associates: Vec<Associate>,
            #[serde(default)]
            pagination: Pagination,
        }

        let response: AssociatesResponse = self
            .client
            .get_json("/api/associates", &page_query(request))
            .await?;

        tracing::debug!(
            page = request.page,
            count = response.associates.len(),
            total = response.pagination.total,
            "Fetched associates"
        );

        Ok(Page {
            items: response.associates,
            pagination: response.pagination,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Associate> {
        self.client
            .get_json(&self.client.path("/api/associates", &[id]), &[])
            .await
    }

    /// # Errors
    ///
    /// Validation errors are raised before any request is sent.
    pub async fn create(&self, draft: &AssociateDraft) -> Result<Value> {
        draft.validate()?;
        let created = self
            .client
            .send_json(Method::POST, "/api/associates", &draft.payload())
            .await?;
        tracing::info!(nombre = %draft.nombre, "Associate created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Validation errors are raised before any request is sent.
    pub async fn update(&self, id: &str, draft: &AssociateDraft) -> Result<Value> {
        draft.validate()?;
        let updated = self
            .client
            .send_json(Method::PUT, &self.client.path("/api/associates", &[id]), &draft.payload())
            .await?;
        tracing::info!(id, "Associate updated");
        Ok(updated)
    }

    /// Upload a logo; the returned file name goes into the draft's `imagen`
    pub async fn upload_image(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadedFile> {
        self.client
            .upload("/api/upload/associate", file_name, contents)
            .await
    }
}
