//! # CCA Ceuta - Domain Model
//!
//! Entities, value objects and enums for the CCA Ceuta loyalty program:
//! associates (merchants), campaigns, tickets with their participations,
//! program users and the dashboard statistics computed by the backend.
//! These types mirror the backend JSON and are shared by the client and the
//! admin tooling.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod de;
pub mod filters;
pub mod format;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use filters::{ExportFilters, StatsFilters, default_date_range};
pub use stats::{
    CampaignMetrics, CampaignStatsEntry, CampaignTopAssociate, CampaignsSummary, DailyAmount,
    DailyCount, DashboardStats, GlobalStats, StatsMetadata, TimeSeries, TopAssociate, TopUser,
};

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination block returned by every list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Page request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_last(&self, request: PageRequest) -> bool {
        u64::from(request.page) >= self.pagination.total_pages
    }
}

// =============================================================================
// ASSOCIATES
// =============================================================================

/// Associate (merchant) record. The backend keeps snake_case keys here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Associate {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub maps_url: Option<String>,
    pub web_texto: Option<String>,
    pub web_url: Option<String>,
    pub rrss_texto: Option<String>,
    pub rrss_url: Option<String>,
    pub imagen: Option<String>,
    pub activo: bool,
    pub responsable: Option<String>,
    pub telefono_interno: Option<String>,
    pub email_interno: Option<String>,
    pub cif_nif: Option<String>,
    pub razon_social: Option<String>,
    pub direccion_fiscal: Option<String>,
}

impl Associate {
    /// Case-insensitive name search. A blank query matches everything.
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        name_matches(&self.nombre, query)
    }
}

/// Label sent with every associate as `rrss_texto`
pub const SOCIAL_LINKS_LABEL: &str = "Instagram | Facebook";

/// Editable associate fields as an operator fills them in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssociateDraft {
    pub nombre: String,
    pub descripcion: String,
    pub contacto: String,
    pub direccion_publica: String,
    pub maps_url: String,
    pub web_texto: String,
    pub web_url: String,
    pub facebook_url: String,
    pub instagram_url: String,
    pub imagen: Option<String>,
    pub activo: bool,
}

/// Create/update body for `/api/associates`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociatePayload {
    pub nombre: String,
    pub descripcion: String,
    pub telefono: String,
    pub direccion: String,
    pub maps_url: String,
    pub web_texto: String,
    pub web_url: String,
    pub rrss_texto: String,
    pub rrss_url: String,
    pub imagen: Option<String>,
    pub activo: bool,
}

impl AssociateDraft {
    /// Prefill a draft from an existing associate, for editing
    #[must_use]
    pub fn from_associate(associate: &Associate) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            nombre: associate.nombre.clone(),
            descripcion: text(&associate.descripcion),
            contacto: text(&associate.telefono),
            direccion_publica: text(&associate.direccion),
            maps_url: text(&associate.maps_url),
            web_texto: text(&associate.web_texto),
            web_url: text(&associate.web_url),
            facebook_url: String::new(),
            instagram_url: text(&associate.rrss_url),
            imagen: associate.imagen.clone(),
            activo: associate.activo,
        }
    }

    /// Check required fields and URL shapes
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.nombre.trim().is_empty() {
            return Err(DomainError::validation("nombre", "El nombre comercial es obligatorio"));
        }
        for (field, value) in [
            ("maps_url", &self.maps_url),
            ("web_url", &self.web_url),
            ("facebook_url", &self.facebook_url),
            ("instagram_url", &self.instagram_url),
        ] {
            if !value.trim().is_empty() && !looks_like_url(value.trim()) {
                return Err(DomainError::validation(field, "Debe ser una URL válida"));
            }
        }
        Ok(())
    }

    /// Build the request body. Instagram wins over Facebook for `rrss_url`.
    #[must_use]
    pub fn payload(&self) -> AssociatePayload {
        let rrss_url = if self.instagram_url.is_empty() {
            self.facebook_url.clone()
        } else {
            self.instagram_url.clone()
        };

        AssociatePayload {
            nombre: self.nombre.clone(),
            descripcion: self.descripcion.clone(),
            telefono: self.contacto.clone(),
            direccion: self.direccion_publica.clone(),
            maps_url: self.maps_url.clone(),
            web_texto: self.web_texto.clone(),
            web_url: self.web_url.clone(),
            rrss_texto: SOCIAL_LINKS_LABEL.to_string(),
            rrss_url,
            imagen: self.imagen.clone(),
            activo: self.activo,
        }
    }
}

fn looks_like_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    rest.is_some_and(|r| {
        let host = r.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !host.contains(char::is_whitespace)
    })
}

// =============================================================================
// CAMPAIGNS
// =============================================================================

/// Campaign record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default, deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Missing when the backend sends no date or one that does not parse
    #[serde(default, deserialize_with = "de::date")]
    pub fecha_inicio: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::date")]
    pub fecha_fin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub imagen_url: Option<String>,
}

impl Campaign {
    /// Lifecycle status at `now`
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> CampaignStatus {
        CampaignStatus::calculate(Some(self), now)
    }

    /// Case-insensitive name search. A blank query matches everything.
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        name_matches(&self.nombre, query)
    }
}

fn name_matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Campaign lifecycle status derived from dates and the active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Preparada,
    Activa,
    Finalizada,
    Archivada,
}

impl CampaignStatus {
    /// Inactive campaigns are archived regardless of dates. A missing
    /// campaign reads as not started yet, and a missing date never bounds
    /// the period.
    #[must_use]
    pub fn calculate(campaign: Option<&Campaign>, now: DateTime<Utc>) -> Self {
        let Some(campaign) = campaign else {
            return Self::Preparada;
        };

        if !campaign.is_active {
            Self::Archivada
        } else if campaign.fecha_inicio.is_some_and(|start| now < start) {
            Self::Preparada
        } else if campaign.fecha_fin.is_some_and(|end| now > end) {
            Self::Finalizada
        } else {
            Self::Activa
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preparada => "Preparada",
            Self::Activa => "Activa",
            Self::Finalizada => "Finalizada",
            Self::Archivada => "Archivada",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create body for `/api/campaigns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub nombre: String,
    pub descripcion: String,
    /// Uploaded file name; the backend builds the public URL
    pub imagen_url: Option<String>,
    pub is_active: bool,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: DateTime<Utc>,
}

impl CampaignDraft {
    /// # Errors
    ///
    /// Returns a validation error for an empty name or a non-increasing date range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.nombre.trim().is_empty() {
            return Err(DomainError::validation("nombre", "El nombre es obligatorio"));
        }
        if self.fecha_fin <= self.fecha_inicio {
            return Err(DomainError::validation(
                "fechaFin",
                "La fecha de fin debe ser posterior a la de inicio",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TICKETS & PARTICIPATIONS
// =============================================================================

/// Purchase receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub numero_ticket: String,
    #[serde(default)]
    pub associate_id: Option<String>,
    #[serde(default)]
    pub fecha_ticket: Option<DateTime<Utc>>,
    #[serde(default)]
    pub importe_total: Option<f64>,
    #[serde(default)]
    pub validated: bool,
}

impl Ticket {
    #[must_use]
    pub const fn status_badge(&self) -> TicketStatusBadge {
        TicketStatusBadge::for_validated(self.validated)
    }
}

/// A user's entry in a campaign, carrying one ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    pub ticket: Ticket,
}

/// Validation badge shown next to a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketStatusBadge {
    pub label: &'static str,
    pub bg: &'static str,
    pub text: &'static str,
}

impl TicketStatusBadge {
    #[must_use]
    pub const fn for_validated(validated: bool) -> Self {
        if validated {
            Self {
                label: "Validado",
                bg: "bg-green-100",
                text: "text-green-800",
            }
        } else {
            Self {
                label: "Pendiente",
                bg: "bg-yellow-100",
                text: "text-yellow-800",
            }
        }
    }
}

// =============================================================================
// USERS & AUTH
// =============================================================================

/// Program participant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub telefono: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl User {
    /// Best human-readable name available
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.nombre, &self.apellidos) {
            (Some(n), Some(a)) if !a.is_empty() => format!("{n} {a}"),
            (Some(n), _) => n.clone(),
            _ => self.email.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Authenticated staff member as returned by `/api/auth/me`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthUser {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Login response. Older backends name the token `accessToken`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub user: Option<AuthUser>,
}

impl LoginResponse {
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or(self.access_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl DomainError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
