//! Command execution.
//!
//! Each subcommand maps to one service call (or the dashboard) and prints
//! its result to stdout.

use std::path::Path;

use chrono::Utc;

use cca_client::{
    ApiClient, AssociatesService, AuthService, CampaignsService, ExportService, TicketsService,
    UsersService,
};
use cca_domain::{AssociateDraft, CampaignDraft};

use crate::cli::{
    AssociatesCommand, CampaignArgs, CampaignsCommand, Command, PasswordCommand, StatsArgs,
    TicketsCommand, UsersCommand,
};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{AdminError, Result};
use crate::report::{self, DashboardReport};

/// Shared handles for command execution
#[derive(Debug)]
pub struct Context {
    pub client: ApiClient,
    pub dashboard: Dashboard,
}

impl Context {
    #[must_use]
    pub fn new(client: ApiClient, config: &Config) -> Self {
        let dashboard = Dashboard::from_client(&client, config.campaigns_cache_ttl);
        Self { client, dashboard }
    }
}

/// Run one command
///
/// # Errors
///
/// Client, file and argument errors from the command.
pub async fn run(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = AuthService::new(ctx.client.clone())
                .login(&email, &password)
                .await?;
            println!("Sesión iniciada como {}", user.email);
        }
        Command::Logout => {
            AuthService::new(ctx.client.clone()).logout().await?;
            println!("Sesión cerrada");
        }
        Command::Me => {
            let user = AuthService::new(ctx.client.clone()).me().await?;
            print_json(&user)?;
        }
        Command::Password { action } => run_password(action, ctx).await?,
        Command::Associates { action } => run_associates(action, ctx).await?,
        Command::Campaigns { action } => run_campaigns(action, ctx).await?,
        Command::Tickets { action } => run_tickets(action, ctx).await?,
        Command::Users { action } => run_users(action, ctx).await?,
        Command::Stats(args) => run_stats(&args, ctx).await?,
        Command::Filters => {
            let options = ctx.dashboard.load_filter_options().await;
            println!("## Campañas\n");
            print!("{}", report::campaigns_table(&options.campaigns, Utc::now()));
            println!("\n## Asociados\n");
            for associate in &options.associates {
                println!("- {} ({})", associate.nombre, associate.id);
            }
        }
        Command::Export(args) => {
            let bytes = ExportService::new(ctx.client.clone())
                .participations_excel(&args.filters())
                .await?;
            tokio::fs::write(&args.output, &bytes)
                .await
                .map_err(|e| AdminError::file(&args.output, e))?;
            println!("{} bytes escritos en {}", bytes.len(), args.output.display());
        }
    }
    Ok(())
}

async fn run_password(action: PasswordCommand, ctx: &Context) -> Result<()> {
    let auth = AuthService::new(ctx.client.clone());
    let response = match action {
        PasswordCommand::Forgot { email } => auth.forgot_password(&email).await?,
        PasswordCommand::Validate { code } => auth.validate_reset_code(&code).await?,
        PasswordCommand::Reset { code, password } => auth.reset_password(&code, &password).await?,
    };
    print_json(&response)
}

async fn run_associates(action: AssociatesCommand, ctx: &Context) -> Result<()> {
    let associates = AssociatesService::new(ctx.client.clone());
    match action {
        AssociatesCommand::List(args) => {
            let mut page = associates.list(args.page.into()).await?;
            page.items.retain(|a| a.matches_name(args.query()));
            print!("{}", report::associates_page(&page));
        }
        AssociatesCommand::Get { id } => print_json(&associates.get(&id).await?)?,
        AssociatesCommand::Create(fields) => {
            let mut draft = AssociateDraft {
                activo: true,
                ..AssociateDraft::default()
            };
            fields.apply(&mut draft);
            draft.validate()?;
            if let Some(ref path) = fields.image {
                let (name, contents) = read_upload(path).await?;
                draft.imagen = Some(associates.upload_image(&name, contents).await?.filename);
            }
            print_json(&associates.create(&draft).await?)?;
        }
        AssociatesCommand::Update { id, fields } => {
            let current = associates.get(&id).await?;
            let mut draft = AssociateDraft::from_associate(&current);
            fields.apply(&mut draft);
            draft.validate()?;
            if let Some(ref path) = fields.image {
                let (name, contents) = read_upload(path).await?;
                draft.imagen = Some(associates.upload_image(&name, contents).await?.filename);
            }
            print_json(&associates.update(&id, &draft).await?)?;
        }
        AssociatesCommand::Upload { file } => {
            let (name, contents) = read_upload(&file).await?;
            println!("{}", associates.upload_image(&name, contents).await?.filename);
        }
    }
    Ok(())
}

async fn run_campaigns(action: CampaignsCommand, ctx: &Context) -> Result<()> {
    let campaigns = CampaignsService::new(ctx.client.clone());
    match action {
        CampaignsCommand::List(args) => {
            let mut page = campaigns.list(args.page.into()).await?;
            page.items.retain(|c| c.matches_name(args.query()));
            print!("{}", report::campaigns_page(&page, Utc::now()));
        }
        CampaignsCommand::All => {
            let all = ctx.dashboard.campaigns().await?;
            print!("{}", report::campaigns_table(&all, Utc::now()));
        }
        CampaignsCommand::Active => {
            let active = campaigns.list_active().await?;
            print!("{}", report::campaigns_table(&active, Utc::now()));
        }
        CampaignsCommand::Get { id } => {
            let campaign = campaigns.get(&id).await?;
            println!("Estado: {}", campaign.status_at(Utc::now()));
            print_json(&campaign)?;
        }
        CampaignsCommand::Create(args) => create_campaign(args, &campaigns, ctx).await?,
        CampaignsCommand::Delete { id } => {
            ctx.dashboard.delete_campaign(&id).await?;
            println!("Campaña {id} eliminada");
        }
        CampaignsCommand::ImageUrl { filename } => match campaigns.image_url(&filename) {
            Some(url) => println!("{url}"),
            None => return Err(AdminError::InvalidArgument("empty file name".to_string())),
        },
    }
    Ok(())
}

async fn create_campaign(
    args: CampaignArgs,
    campaigns: &CampaignsService,
    ctx: &Context,
) -> Result<()> {
    let mut draft = CampaignDraft {
        nombre: args.nombre.trim().to_string(),
        descripcion: args.descripcion,
        imagen_url: None,
        is_active: !args.inactive,
        fecha_inicio: args.inicio,
        fecha_fin: args.fin,
    };
    draft.validate()?;

    if let Some(ref path) = args.image {
        let (name, contents) = read_upload(path).await?;
        draft.imagen_url = Some(campaigns.upload_image(&name, contents).await?.filename);
    }

    print_json(&ctx.dashboard.create_campaign(&draft).await?)
}

async fn run_tickets(action: TicketsCommand, ctx: &Context) -> Result<()> {
    let tickets = TicketsService::new(ctx.client.clone());
    match action {
        TicketsCommand::List(page) => {
            let page = tickets.list(page.into()).await?;
            print!("{}", report::tickets_page(&page));
        }
        TicketsCommand::Delete { id } => {
            tickets.delete(&id).await?;
            println!("Ticket {id} eliminado");
        }
        TicketsCommand::Validate { id } => print_json(&tickets.set_validated(&id, true).await?)?,
        TicketsCommand::Invalidate { id } => print_json(&tickets.set_validated(&id, false).await?)?,
    }
    Ok(())
}

async fn run_users(action: UsersCommand, ctx: &Context) -> Result<()> {
    let users = UsersService::new(ctx.client.clone());
    match action {
        UsersCommand::List(page) => {
            let page = users.list(page.into()).await?;
            print!("{}", report::users_page(&page));
        }
        UsersCommand::Delete { id } => {
            users.delete(&id).await?;
            println!("Usuario {id} eliminado");
        }
    }
    Ok(())
}

async fn run_stats(args: &StatsArgs, ctx: &Context) -> Result<()> {
    let filters = args.filters(Utc::now().date_naive());
    let stats = ctx.dashboard.load_stats(&filters).await?;

    if args.json {
        print_json(&stats)
    } else {
        print!("{}", DashboardReport::build(&stats).to_markdown());
        Ok(())
    }
}

/// File name and contents of a file to upload
async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| AdminError::file(path, e))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AdminError::InvalidArgument(format!("{} has no file name", path.display())))?
        .to_string();
    tracing::debug!(file = %name, bytes = contents.len(), "Read upload");
    Ok((name, contents))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_upload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        let err = tokio_test::block_on(read_upload(&path)).unwrap_err();
        assert!(matches!(err, AdminError::File { .. }));
    }

    #[tokio::test]
    async fn test_read_upload_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        tokio::fs::write(&path, b"png").await.unwrap();

        let (name, contents) = read_upload(&path).await.unwrap();
        assert_eq!(name, "logo.png");
        assert_eq!(contents, b"png");
    }
}
