//! Program participants.

use cca_domain::{Page, PageRequest, Pagination, User};
use serde::Deserialize;

use super::page_query;
use crate::error::Result;
use crate::http::ApiClient;

/// `/api/users`
#[derive(Debug, Clone)]
pub struct UsersService {
    client: ApiClient,
}

impl UsersService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<User>> {
        #[derive(Deserialize)]
        struct UsersResponse {
            #[serde(default)]
            users: Vec<User>,
            #[serde(default)]
            pagination: Pagination,
        }

        let response: UsersResponse = self
            .client
            .get_json("/api/users", &page_query(request))
            .await?;

        Ok(Page {
            items: response.users,
            pagination: response.pagination,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.client.path("/api/users", &[id])).await?;
        tracing::info!(id, "User deleted");
        Ok(())
    }
}
