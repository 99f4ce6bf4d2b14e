//! Tickets and their participations.

use cca_domain::{Page, PageRequest, Pagination, Participation};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::page_query;
use crate::error::Result;
use crate::http::ApiClient;

/// `/api/tickets`
#[derive(Debug, Clone)]
pub struct TicketsService {
    client: ApiClient,
}

impl TicketsService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Participations with their tickets
    pub async fn list(&self, request: PageRequest) -> Result<Page<Participation>> {
        #[derive(Deserialize)]
        struct TicketsResponse {
            #[serde(default)]
            participations: Vec<Participation>,
            #[serde(default)]
            pagination: Pagination,
        }

        let response: TicketsResponse = self
            .client
            .get_json("/api/tickets", &page_query(request))
            .await?;

        tracing::debug!(
            page = request.page,
            count = response.participations.len(),
            "Fetched tickets"
        );

        Ok(Page {
            items: response.participations,
            pagination: response.pagination,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.client.path("/api/tickets", &[id])).await?;
        tracing::info!(id, "Ticket deleted");
        Ok(())
    }

    /// Mark a ticket as validated or pending
    pub async fn set_validated(&self, id: &str, validated: bool) -> Result<Value> {
        #[derive(Serialize)]
        struct StatusBody {
            validated: bool,
        }

        let updated = self
            .client
            .send_json(
                Method::PATCH,
                &self.client.path("/api/tickets", &[id, "status"]),
                &StatusBody { validated },
            )
            .await?;
        tracing::info!(id, validated, "Ticket status updated");
        Ok(updated)
    }
}
