//! Firebase Hosting commands

use anyhow::{bail, Result};
use console::style;
use fbctl_api::hosting::{HostingClient, Site};
use fbctl_api::resource_manager::ResourceManagerClient;

use crate::cli::{HostingCommands, HostingSitesCommands, HostingSitesCreateArgs};
use crate::output;
use crate::prompt;
use crate::session::Session;

const LOG_TAG: &str = "hosting:sites";

const CREATE_PERMISSIONS: &[&str] = &["firebasehosting.sites.update"];

pub async fn run(command: HostingCommands, session: &Session) -> Result<()> {
    match command {
        HostingCommands::Sites(HostingSitesCommands::Create(args)) => {
            let site = create_site(&args, session).await?;
            if session.json {
                output::json(&site)?;
            }
            Ok(())
        }
    }
}

fn site_id(args: &HostingSitesCreateArgs, session: &Session) -> Result<String> {
    let site_id = match &args.site_id {
        Some(id) => id.clone(),
        None if !session.interactive => {
            bail!("\"siteId\" argument must be provided in a non-interactive environment")
        }
        None => prompt::input_non_empty(
            "Please provide an unique, URL-friendly id for the site (<id>.web.app):",
        )?,
    };
    if site_id.is_empty() {
        bail!("\"siteId\" must not be empty");
    }
    Ok(site_id)
}

async fn create_site(args: &HostingSitesCreateArgs, session: &Session) -> Result<Site> {
    session.require_auth()?;
    let project_id = session.project_id()?;
    ResourceManagerClient::new(&session.origins().resource_manager, &session.client_options)?
        .require_permissions(project_id, CREATE_PERMISSIONS)
        .await?;

    let site_id = site_id(args, session)?;
    let client = HostingClient::new(&session.origins().hosting, &session.client_options)?;
    let site = match client.create_site(project_id, &site_id, args.app.as_deref()).await {
        Ok(site) => site,
        Err(e) if e.status() == Some(409) => {
            return Err(anyhow::Error::new(e).context(format!(
                "Site {} already exists in project {}.",
                style(&site_id).bold(),
                style(project_id).bold()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    output::line("");
    output::labeled_success(
        LOG_TAG,
        &format!(
            "Site {} has been created in project {}.",
            style(&site_id).bold(),
            style(project_id).bold()
        ),
    );
    if let Some(app) = &args.app {
        output::labeled_success(
            LOG_TAG,
            &format!(
                "Site {} has been linked to web app {}",
                style(&site_id).bold(),
                style(app).bold()
            ),
        );
    }
    output::labeled_success(LOG_TAG, &format!("Site URL: {}", site.default_url));
    output::line("");
    output::line(
        "To deploy to this site, follow the guide at https://firebase.google.com/docs/hosting/multisites.",
    );
    Ok(site)
}
