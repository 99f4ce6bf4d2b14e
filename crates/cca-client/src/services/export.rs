//! Spreadsheet exports.

use cca_domain::ExportFilters;

use crate::error::Result;
use crate::http::ApiClient;

/// Default file name for the participations export
pub const PARTICIPATIONS_EXPORT_FILE: &str = "participaciones.xlsx";

/// `/api/export/*`
#[derive(Debug, Clone)]
pub struct ExportService {
    client: ApiClient,
}

impl ExportService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Participations as an `.xlsx` workbook
    pub async fn participations_excel(&self, filters: &ExportFilters) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get_bytes("/api/export/participations/excel", &filters.to_query())
            .await?;
        tracing::info!(bytes = bytes.len(), "Participations exported");
        Ok(bytes)
    }
}
