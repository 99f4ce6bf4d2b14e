//! Report generation for dashboard and list data.
//!
//! Shapes backend payloads into display rows (formatted numbers, chart
//! points, status labels) and renders them as Markdown.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cca_domain::format::{
    format_change, format_chart_label, format_currency_eur, format_date_range, format_long_date,
    format_number, parse_backend_date,
};
use cca_domain::{
    Associate, Campaign, CampaignStatsEntry, CampaignStatus, CampaignsSummary, DashboardStats,
    GlobalStats, Page, Participation, TimeSeries, TopAssociate, TopUser, User,
};

// =============================================================================
// VIEW MODELS
// =============================================================================

/// Headline metric with its change against the previous period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub change: Option<String>,
}

/// One point of a daily series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: u64,
}

/// Ranking row for users or associates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub name: String,
    pub tickets: String,
    pub amount: String,
}

/// Per-campaign progress block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignProgress {
    pub nombre: String,
    pub periodo: String,
    pub dias_restantes: Option<i64>,
    pub progress: String,
    pub tickets: String,
    pub participations: String,
    pub amount: String,
    pub recent_tickets: String,
}

/// Campaign list row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignRow {
    pub id: String,
    pub nombre: String,
    pub status: CampaignStatus,
    pub periodo: String,
}

/// Ticket list row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRow {
    pub id: String,
    pub numero: String,
    pub fecha: String,
    pub importe: String,
    pub estado: &'static str,
}

// =============================================================================
// SHAPING
// =============================================================================

/// The three headline cards
#[must_use]
pub fn metric_cards(global: &GlobalStats) -> [MetricCard; 3] {
    [
        MetricCard {
            title: "Tickets registrados",
            value: format_number(global.total_tickets),
            change: format_change(global.total_tickets_change, true),
        },
        MetricCard {
            title: "Volumen total registrado",
            value: format!("{}€", format_number(global.total_amount)),
            change: format_change(global.total_amount_change, true),
        },
        MetricCard {
            title: "Participantes únicos",
            value: format_number(global.total_users),
            change: format_change(global.total_users_change, true),
        },
    ]
}

/// Daily ticket counts as chart points; missing counts plot as zero
#[must_use]
pub fn ticket_series(series: Option<&TimeSeries>) -> Vec<ChartPoint> {
    series.map_or_else(Vec::new, |s| {
        s.daily_tickets
            .iter()
            .map(|d| ChartPoint {
                name: format_chart_label(&d.date),
                value: d.count.unwrap_or_default(),
            })
            .collect()
    })
}

/// Daily amounts as chart points; missing amounts plot as zero
#[must_use]
pub fn amount_series(series: Option<&TimeSeries>) -> Vec<ChartPoint> {
    series.map_or_else(Vec::new, |s| {
        s.daily_amount
            .iter()
            .map(|d| ChartPoint {
                name: format_chart_label(&d.date),
                value: d.amount.unwrap_or_default(),
            })
            .collect()
    })
}

#[must_use]
pub fn summary_cards(summary: &CampaignsSummary) -> [SummaryCard; 4] {
    [
        SummaryCard {
            label: "Total Campañas",
            value: summary.total_campaigns,
        },
        SummaryCard {
            label: "Campañas Activas",
            value: summary.active_campaigns,
        },
        SummaryCard {
            label: "Próximas Campañas",
            value: summary.upcoming_campaigns,
        },
        SummaryCard {
            label: "Por Expirar",
            value: summary.expiring_soon,
        },
    ]
}

fn euros(amount: Option<f64>) -> String {
    format!("{}€", format_number(amount))
}

#[must_use]
pub fn top_user_rows(users: &[TopUser]) -> Vec<RankingRow> {
    users
        .iter()
        .enumerate()
        .map(|(i, u)| RankingRow {
            rank: i + 1,
            name: u.user_name.clone(),
            tickets: format_number(u.total_tickets),
            amount: euros(u.total_amount),
        })
        .collect()
}

#[must_use]
pub fn top_associate_rows(associates: &[TopAssociate]) -> Vec<RankingRow> {
    associates
        .iter()
        .enumerate()
        .map(|(i, a)| RankingRow {
            rank: i + 1,
            name: a.associate_name.clone(),
            tickets: format_number(a.total_tickets),
            amount: euros(a.total_amount),
        })
        .collect()
}

#[must_use]
pub fn campaign_progress(entry: &CampaignStatsEntry) -> CampaignProgress {
    let date = |raw: &Option<String>| raw.as_deref().and_then(parse_backend_date);
    CampaignProgress {
        nombre: entry.nombre.clone(),
        periodo: format_date_range(date(&entry.fecha_inicio), date(&entry.fecha_fin)),
        dias_restantes: entry.dias_restantes,
        progress: format!("{:.1}%", entry.stats.progress.unwrap_or_default()),
        tickets: format_number(entry.stats.total_tickets),
        participations: format_number(entry.stats.total_participations),
        amount: euros(entry.stats.total_amount),
        recent_tickets: format_number(entry.stats.recent_tickets),
    }
}

#[must_use]
pub fn campaign_rows(campaigns: &[Campaign], now: DateTime<Utc>) -> Vec<CampaignRow> {
    campaigns
        .iter()
        .map(|c| CampaignRow {
            id: c.id.clone(),
            nombre: c.nombre.clone(),
            status: c.status_at(now),
            periodo: format_date_range(c.fecha_inicio, c.fecha_fin),
        })
        .collect()
}

#[must_use]
pub fn ticket_rows(participations: &[Participation]) -> Vec<TicketRow> {
    participations
        .iter()
        .map(|p| TicketRow {
            id: p.ticket.id.clone(),
            numero: p.ticket.numero_ticket.clone(),
            fecha: format_long_date(p.ticket.fecha_ticket),
            importe: format_currency_eur(p.ticket.importe_total),
            estado: p.ticket.status_badge().label,
        })
        .collect()
}

// =============================================================================
// DASHBOARD REPORT
// =============================================================================

/// Display-ready dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: Option<String>,
    pub metrics: Vec<MetricCard>,
    pub summary: Vec<SummaryCard>,
    pub daily_tickets: Vec<ChartPoint>,
    pub daily_amount: Vec<ChartPoint>,
    pub campaigns: Vec<CampaignProgress>,
    pub top_users: Vec<RankingRow>,
    pub top_associates: Vec<RankingRow>,
}

impl DashboardReport {
    /// Shape a stats payload. Missing sections yield empty parts.
    #[must_use]
    pub fn build(stats: &DashboardStats) -> Self {
        Self {
            generated_at: stats.metadata.as_ref().and_then(|m| m.generated_at.clone()),
            metrics: stats
                .global
                .as_ref()
                .map(|g| metric_cards(g).to_vec())
                .unwrap_or_default(),
            summary: stats
                .campaigns_summary
                .as_ref()
                .map(|s| summary_cards(s).to_vec())
                .unwrap_or_default(),
            daily_tickets: ticket_series(stats.time_series.as_ref()),
            daily_amount: amount_series(stats.time_series.as_ref()),
            campaigns: stats.campaigns.iter().map(campaign_progress).collect(),
            top_users: top_user_rows(&stats.top_users),
            top_associates: top_associate_rows(&stats.top_associates),
        }
    }

    /// Render as Markdown
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Estadísticas CCA Ceuta\n\n");
        if let Some(ref generated_at) = self.generated_at {
            md.push_str(&format!("**Generado:** {generated_at}\n\n"));
        }

        if !self.metrics.is_empty() {
            md.push_str("## Métricas globales\n\n");
            md.push_str("| Métrica | Valor | Cambio |\n");
            md.push_str("|---------|-------|--------|\n");
            for card in &self.metrics {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    card.title,
                    card.value,
                    card.change.as_deref().unwrap_or("-")
                ));
            }
            md.push('\n');
        }

        if !self.summary.is_empty() {
            md.push_str("## Resumen de Campañas\n\n");
            md.push_str("| Indicador | Valor |\n");
            md.push_str("|-----------|-------|\n");
            for card in &self.summary {
                md.push_str(&format!("| {} | {} |\n", card.label, card.value));
            }
            md.push('\n');
        }

        render_series(&mut md, "Tickets por día", &self.daily_tickets);
        render_series(&mut md, "Volumen por día", &self.daily_amount);

        if !self.campaigns.is_empty() {
            md.push_str("## Campañas\n\n");
            md.push_str("| Campaña | Periodo | Días restantes | Progreso | Tickets | Participaciones | Volumen | Recientes |\n");
            md.push_str("|---------|---------|----------------|----------|---------|-----------------|---------|-----------|\n");
            for c in &self.campaigns {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                    c.nombre,
                    c.periodo,
                    c.dias_restantes.map_or_else(|| "-".to_string(), |d| d.to_string()),
                    c.progress,
                    c.tickets,
                    c.participations,
                    c.amount,
                    c.recent_tickets
                ));
            }
            md.push('\n');
        }

        render_ranking(&mut md, "Top usuarios", "Usuario", &self.top_users);
        render_ranking(&mut md, "Top asociados", "Asociado", &self.top_associates);

        md
    }
}

fn render_series(md: &mut String, title: &str, points: &[ChartPoint]) {
    if points.is_empty() {
        return;
    }
    md.push_str(&format!("## {title}\n\n"));
    md.push_str("| Día | Valor |\n");
    md.push_str("|-----|-------|\n");
    for point in points {
        md.push_str(&format!("| {} | {} |\n", point.name, format_number(Some(point.value))));
    }
    md.push('\n');
}

fn render_ranking(md: &mut String, title: &str, column: &str, rows: &[RankingRow]) {
    if rows.is_empty() {
        return;
    }
    md.push_str(&format!("## {title}\n\n"));
    md.push_str(&format!("| # | {column} | Tickets | Volumen |\n"));
    md.push_str("|---|---------|---------|---------|\n");
    for row in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.rank, row.name, row.tickets, row.amount
        ));
    }
    md.push('\n');
}

// =============================================================================
// LIST TABLES
// =============================================================================

fn page_footer<T>(page: &Page<T>) -> String {
    format!(
        "\n{} de {} (páginas: {})\n",
        page.items.len(),
        page.pagination.total,
        page.pagination.total_pages
    )
}

#[must_use]
pub fn campaigns_table(campaigns: &[Campaign], now: DateTime<Utc>) -> String {
    let mut md = String::from("| ID | Nombre | Estado | Periodo |\n|----|--------|--------|---------|\n");
    for row in campaign_rows(campaigns, now) {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.id, row.nombre, row.status, row.periodo
        ));
    }
    md
}

#[must_use]
pub fn campaigns_page(page: &Page<Campaign>, now: DateTime<Utc>) -> String {
    campaigns_table(&page.items, now) + &page_footer(page)
}

#[must_use]
pub fn tickets_page(page: &Page<Participation>) -> String {
    let mut md = String::from("| ID | Ticket | Fecha | Importe | Estado |\n|----|--------|-------|---------|--------|\n");
    for row in ticket_rows(&page.items) {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.id, row.numero, row.fecha, row.importe, row.estado
        ));
    }
    md + &page_footer(page)
}

#[must_use]
pub fn associates_page(page: &Page<Associate>) -> String {
    let mut md = String::from("| ID | Nombre | Teléfono | Activo |\n|----|--------|----------|--------|\n");
    for a in &page.items {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            a.id,
            a.nombre,
            a.telefono.as_deref().unwrap_or("-"),
            if a.activo { "Sí" } else { "No" }
        ));
    }
    md + &page_footer(page)
}

#[must_use]
pub fn users_page(page: &Page<User>) -> String {
    let mut md = String::from("| ID | Nombre | Email |\n|----|--------|-------|\n");
    for u in &page.items {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            u.id,
            u.display_name(),
            u.email.as_deref().unwrap_or("-")
        ));
    }
    md + &page_footer(page)
}
