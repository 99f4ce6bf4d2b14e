//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use cca_client::PARTICIPATIONS_EXPORT_FILE;
use cca_domain::format::parse_backend_date;
use cca_domain::{AssociateDraft, ExportFilters, PageRequest, StatsFilters};

#[derive(Parser, Debug)]
#[command(name = "cca-admin")]
#[command(version, about = "Administration client for the CCA Ceuta loyalty program")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "CCA_API_URL")]
    pub api_url: Option<String>,

    /// File holding the session token
    #[arg(long, global = true, env = "CCA_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CCA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out and forget the session token
    Logout,

    /// Show the logged-in user
    Me,

    /// Password recovery
    Password {
        #[command(subcommand)]
        action: PasswordCommand,
    },

    /// Manage associates
    Associates {
        #[command(subcommand)]
        action: AssociatesCommand,
    },

    /// Manage campaigns
    Campaigns {
        #[command(subcommand)]
        action: CampaignsCommand,
    },

    /// Manage tickets
    Tickets {
        #[command(subcommand)]
        action: TicketsCommand,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersCommand,
    },

    /// Dashboard statistics
    Stats(StatsArgs),

    /// Campaigns and associates available as stats filters
    Filters,

    /// Export participations to a spreadsheet
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
pub enum PasswordCommand {
    /// Email a reset code
    Forgot {
        #[arg(long)]
        email: String,
    },

    /// Check a reset code
    Validate {
        #[arg(long)]
        code: String,
    },

    /// Set a new password with a reset code
    Reset {
        #[arg(long)]
        code: String,

        #[arg(long, env = "CCA_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        Self::new(args.page, args.limit)
    }
}

/// Page of a searchable list
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Keep only rows whose name contains this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

impl ListArgs {
    /// Search text, empty when not given
    #[must_use]
    pub fn query(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

#[derive(Subcommand, Debug)]
pub enum AssociatesCommand {
    List(ListArgs),
    Get { id: String },
    Create(AssociateArgs),
    Update {
        id: String,

        #[command(flatten)]
        fields: AssociateArgs,
    },
    /// Upload a logo and print the stored file name
    Upload { file: PathBuf },
}

/// Associate fields. Omitted fields keep their current value on update.
#[derive(Args, Debug, Clone, Default)]
pub struct AssociateArgs {
    #[arg(long)]
    pub nombre: Option<String>,

    #[arg(long)]
    pub descripcion: Option<String>,

    /// Public contact phone
    #[arg(long)]
    pub contacto: Option<String>,

    /// Public address
    #[arg(long)]
    pub direccion: Option<String>,

    #[arg(long)]
    pub maps_url: Option<String>,

    #[arg(long)]
    pub web_texto: Option<String>,

    #[arg(long)]
    pub web_url: Option<String>,

    #[arg(long)]
    pub facebook_url: Option<String>,

    #[arg(long)]
    pub instagram_url: Option<String>,

    /// Logo to upload
    #[arg(long)]
    pub image: Option<PathBuf>,

    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    #[arg(long)]
    pub inactive: bool,
}

impl AssociateArgs {
    /// Overlay the given fields on `draft`
    pub fn apply(&self, draft: &mut AssociateDraft) {
        let fields = [
            (&self.nombre, &mut draft.nombre),
            (&self.descripcion, &mut draft.descripcion),
            (&self.contacto, &mut draft.contacto),
            (&self.direccion, &mut draft.direccion_publica),
            (&self.maps_url, &mut draft.maps_url),
            (&self.web_texto, &mut draft.web_texto),
            (&self.web_url, &mut draft.web_url),
            (&self.facebook_url, &mut draft.facebook_url),
            (&self.instagram_url, &mut draft.instagram_url),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                value.trim().clone_into(slot);
            }
        }

        if self.active {
            draft.activo = true;
        } else if self.inactive {
            draft.activo = false;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CampaignsCommand {
    List(ListArgs),
    /// Every campaign, unpaginated
    All,
    Active,
    Get { id: String },
    Create(CampaignArgs),
    Delete { id: String },
    /// Public URL of an uploaded image
    ImageUrl { filename: String },
}

#[derive(Args, Debug, Clone)]
pub struct CampaignArgs {
    #[arg(long)]
    pub nombre: String,

    #[arg(long, default_value = "")]
    pub descripcion: String,

    /// Start date (`YYYY-MM-DD` or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub inicio: DateTime<Utc>,

    /// End date (`YYYY-MM-DD` or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub fin: DateTime<Utc>,

    /// Create the campaign archived
    #[arg(long)]
    pub inactive: bool,

    /// Image to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum TicketsCommand {
    List(PageArgs),
    Delete { id: String },
    /// Mark a ticket as validated
    Validate { id: String },
    /// Mark a ticket as pending
    Invalidate { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List(PageArgs),
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Range start, `YYYY-MM-DD` (default: 30 days ago)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end, `YYYY-MM-DD` (default: today)
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub campaign: Option<String>,

    #[arg(long)]
    pub associate: Option<String>,

    #[arg(long)]
    pub top_limit: Option<i64>,

    #[arg(long)]
    pub no_top_users: bool,

    #[arg(long)]
    pub no_top_associates: bool,

    /// Drop the default date range
    #[arg(long)]
    pub all_time: bool,

    /// Print the raw payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    /// Filters for these arguments, starting from the defaults for `today`
    #[must_use]
    pub fn filters(&self, today: chrono::NaiveDate) -> StatsFilters {
        let mut filters = if self.all_time {
            StatsFilters::cleared()
        } else {
            StatsFilters::for_today(today)
        };

        if self.from.is_some() {
            filters.fecha_desde.clone_from(&self.from);
        }
        if self.to.is_some() {
            filters.fecha_hasta.clone_from(&self.to);
        }
        filters.campaign_id.clone_from(&self.campaign);
        filters.associate_id.clone_from(&self.associate);
        if self.top_limit.is_some() {
            filters.top_limit = self.top_limit;
        }
        filters.include_top_users = Some(!self.no_top_users);
        filters.include_top_associates = Some(!self.no_top_associates);
        filters
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub associate: Option<String>,

    #[arg(long)]
    pub from: Option<String>,

    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub ticket: Option<String>,

    #[arg(long, short, default_value = PARTICIPATIONS_EXPORT_FILE)]
    pub output: PathBuf,
}

impl ExportArgs {
    #[must_use]
    pub fn filters(&self) -> ExportFilters {
        ExportFilters {
            user_id: self.user.clone(),
            associate_id: self.associate.clone(),
            fecha_desde: self.from.clone(),
            fecha_hasta: self.to.clone(),
            numero_ticket: self.ticket.clone(),
        }
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_backend_date(raw).ok_or_else(|| format!("'{raw}' is not a date (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_defaults_to_last_30_days() {
        let cli = Cli::try_parse_from(["cca-admin", "stats", "--campaign", "c1", "--no-top-users"]).unwrap();
        let Command::Stats(args) = cli.command else {
            panic!("expected stats");
        };

        let filters = args.filters(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(filters.fecha_desde.as_deref(), Some("2025-12-01"));
        assert_eq!(filters.fecha_hasta.as_deref(), Some("2025-12-31"));
        assert_eq!(filters.campaign_id.as_deref(), Some("c1"));
        assert_eq!(filters.include_top_users, Some(false));
        assert_eq!(filters.include_top_associates, Some(true));
        assert_eq!(filters.top_limit, Some(10));
    }

    #[test]
    fn test_stats_all_time() {
        let cli = Cli::try_parse_from(["cca-admin", "stats", "--all-time", "--top-limit", "0"]).unwrap();
        let Command::Stats(args) = cli.command else {
            panic!("expected stats");
        };

        let filters = args.filters(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(!filters.has_active_filters());
        assert!(!filters.to_query().iter().any(|(k, _)| *k == "topLimit"));
    }

    #[test]
    fn test_campaign_dates_parsed() {
        let cli = Cli::try_parse_from([
            "cca-admin", "campaigns", "create", "--nombre", "Verano", "--inicio", "2026-07-01", "--fin",
            "2026-08-31",
        ])
        .unwrap();
        let Command::Campaigns {
            action: CampaignsCommand::Create(args),
        } = cli.command
        else {
            panic!("expected campaigns create");
        };
        assert!(args.fin > args.inicio);
        assert!(!args.inactive);

        assert!(
            Cli::try_parse_from(["cca-admin", "campaigns", "create", "--nombre", "X", "--inicio", "julio", "--fin", "2026-08-31"])
                .is_err()
        );
    }

    #[test]
    fn test_list_search() {
        let cli = Cli::try_parse_from(["cca-admin", "campaigns", "list", "--page", "2", "--search", "navi"]).unwrap();
        let Command::Campaigns {
            action: CampaignsCommand::List(args),
        } = cli.command
        else {
            panic!("expected campaigns list");
        };
        assert_eq!(PageRequest::from(args.page), PageRequest::new(2, 10));
        assert_eq!(args.query(), "navi");

        let cli = Cli::try_parse_from(["cca-admin", "associates", "list"]).unwrap();
        let Command::Associates {
            action: AssociatesCommand::List(args),
        } = cli.command
        else {
            panic!("expected associates list");
        };
        assert_eq!(args.query(), "");
    }

    #[test]
    fn test_associate_overlay() {
        let mut draft = AssociateDraft {
            nombre: "Antiguo".into(),
            contacto: "956000000".into(),
            activo: true,
            ..AssociateDraft::default()
        };
        let args = AssociateArgs {
            nombre: Some("  Nuevo  ".into()),
            inactive: true,
            ..AssociateArgs::default()
        };

        args.apply(&mut draft);

        assert_eq!(draft.nombre, "Nuevo");
        assert_eq!(draft.contacto, "956000000");
        assert!(!draft.activo);
    }

    #[test]
    fn test_export_default_output() {
        let cli = Cli::try_parse_from(["cca-admin", "export", "--ticket", "A-1"]).unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.output, PathBuf::from("participaciones.xlsx"));
        assert_eq!(args.filters().numero_ticket.as_deref(), Some("A-1"));
    }
}
