//! Realtime Database commands

use anyhow::Result;
use fbctl_api::database::{DatabaseClient, DatabaseLocation};
use fbctl_api::firedata::FiredataClient;
use fbctl_api::projects::ProjectsClient;
use fbctl_api::resource_manager::ResourceManagerClient;
use fbctl_core::experiments::RTDB_MANAGEMENT;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::cli::{DatabaseCommands, DatabaseInstancesCommands, DatabaseInstancesListArgs};
use crate::output;
use crate::session::Session;

/// Emulator variable that redirects database traffic away from production
const DATABASE_EMULATOR_HOST: &str = "FIREBASE_DATABASE_EMULATOR_HOST";

const LIST_PERMISSIONS: &[&str] = &["firebasedatabase.instances.list"];

pub async fn run(command: DatabaseCommands, session: &Session) -> Result<()> {
    match command {
        DatabaseCommands::Instances(DatabaseInstancesCommands::List(args)) => {
            let listing = list_instances(&args, session).await?;
            if session.json {
                output::json(&listing)?;
            }
            Ok(())
        }
    }
}

/// Instances found by `database instances list`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InstanceListing {
    Managed(Vec<fbctl_api::database::DatabaseInstance>),
    Firedata(Vec<String>),
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Database Instance Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Type")]
    instance_type: String,
    #[tabled(rename = "State")]
    state: String,
}

async fn list_instances(
    args: &DatabaseInstancesListArgs,
    session: &Session,
) -> Result<InstanceListing> {
    session.require_auth()?;
    let project_id = session.project_id()?;

    if let Ok(host) = std::env::var(DATABASE_EMULATOR_HOST) {
        if !host.is_empty() {
            output::labeled_warning(
                "database",
                &format!(
                    "{} is set ({}). This command lists production instances, not emulated ones.",
                    DATABASE_EMULATOR_HOST, host
                ),
            );
        }
    }

    let managed = session.experiment(RTDB_MANAGEMENT);
    let location = if managed {
        DatabaseLocation::parse(args.location.as_deref(), DatabaseLocation::Any)?
    } else {
        if args.location.is_some() {
            debug!("Ignoring --location without the {} experiment", RTDB_MANAGEMENT);
        }
        DatabaseLocation::Any
    };

    ResourceManagerClient::new(&session.origins().resource_manager, &session.client_options)?
        .require_permissions(project_id, LIST_PERMISSIONS)
        .await?;

    let mut message = "Preparing the list of your Firebase Realtime Database instances".to_string();
    if location != DatabaseLocation::Any {
        message.push_str(&format!(" for location: {}", location));
    }
    let spinner = output::spinner(&message);

    if managed {
        let client = DatabaseClient::new(&session.origins().rtdb_management, &session.client_options)?;
        let instances = match client.list_database_instances(project_id, location).await {
            Ok(instances) => instances,
            Err(e) => {
                output::spinner_fail(&spinner);
                return Err(e.into());
            }
        };
        output::spinner_succeed(&spinner);

        if instances.is_empty() {
            output::line("No database instances found.");
            return Ok(InstanceListing::Managed(instances));
        }
        let rows: Vec<InstanceRow> = instances
            .iter()
            .map(|i| InstanceRow {
                name: i.name.clone(),
                location: i.location.clone(),
                instance_type: i.instance_type.clone(),
                state: i.state.clone(),
            })
            .collect();
        output::line(&output::table(&rows));
        output::line(&format!("{} database instance(s) total.", instances.len()));
        return Ok(InstanceListing::Managed(instances));
    }

    let names = match firedata_instances(session, project_id).await {
        Ok(names) => names,
        Err(e) => {
            output::spinner_fail(&spinner);
            return Err(e);
        }
    };
    output::spinner_succeed(&spinner);

    for name in &names {
        output::line(name);
    }
    output::line(&format!(
        "Project {} has {} database instances",
        project_id,
        names.len()
    ));
    Ok(InstanceListing::Firedata(names))
}

async fn firedata_instances(session: &Session, project_id: &str) -> Result<Vec<String>> {
    let projects = ProjectsClient::new(&session.origins().firebase_management, &session.client_options)?;
    let project_number = projects.need_project_number(project_id).await?;
    let firedata = FiredataClient::new(&session.origins().firedata, &session.client_options)?;
    Ok(firedata
        .list_database_instances(&project_number)
        .await?
        .into_iter()
        .map(|i| i.instance)
        .collect())
}
