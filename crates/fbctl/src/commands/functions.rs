//! Cloud Functions secrets commands

use anyhow::{Context, Result};
use fbctl_api::functions::FunctionsClient;
use fbctl_api::projects::ProjectsClient;
use fbctl_api::resource_manager::ResourceManagerClient;
use fbctl_api::secret_manager::{
    is_firebase_managed, to_secret_version_resource_name, SecretManagerClient, SecretVersion,
};
use fbctl_deploy::secrets::{
    endpoint_label, endpoints_using, ensure_secret, ensure_valid_key, update_endpoints,
    EndpointUpdate, SET_PERMISSIONS,
};
use fbctl_deploy::ProjectInfo;
use std::io::{IsTerminal, Read};
use tabled::Tabled;

use crate::cli::{FunctionsCommands, SecretsAccessArgs, SecretsCommands, SecretsGetArgs, SecretsSetArgs};
use crate::output;
use crate::prompt;
use crate::session::Session;

const STDIN_MARKER: &str = "-";

pub async fn run(command: FunctionsCommands, session: &Session) -> Result<()> {
    match command {
        FunctionsCommands::Secrets(secrets) => match secrets {
            SecretsCommands::Set(args) => set(&args, session).await,
            SecretsCommands::Get(args) => {
                let versions = get(&args, session).await?;
                if session.json {
                    output::json(&versions)?;
                }
                Ok(())
            }
            SecretsCommands::Access(args) => {
                output::line(&access(&args, session).await?);
                Ok(())
            }
        },
    }
}

fn secret_manager(session: &Session) -> Result<SecretManagerClient> {
    Ok(SecretManagerClient::new(
        &session.origins().secret_manager,
        &session.client_options,
    )?)
}

fn redeploy_hint() {
    output::bullet(&format!(
        "Please deploy your functions for the change to take effect by running:\n\t{}",
        console::style("fbctl deploy --only functions").bold()
    ));
}

/// Prompt when attached to a terminal, otherwise read the file or stdin
fn read_secret_value(key: &str, data_file: Option<&str>) -> Result<String> {
    let from_stdin = data_file.is_none_or(|f| f == STDIN_MARKER);
    if from_stdin && std::io::stdin().is_terminal() {
        return Ok(prompt::password(&format!("Enter a value for {}", key))?);
    }
    match data_file.filter(|f| *f != STDIN_MARKER) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read secret data from {}", path)),
        None => {
            let mut value = String::new();
            std::io::stdin()
                .read_to_string(&mut value)
                .context("Failed to read secret data from stdin")?;
            Ok(value)
        }
    }
}

/// What `functions secrets set` ended up doing
#[derive(Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// Version added; functions need a manual redeploy
    NeedsRedeploy,
    /// Version added; no function binds the secret
    NoFunctions,
    /// Version added and rolled out to these functions
    Updated(Vec<String>),
}

async fn set(args: &SecretsSetArgs, session: &Session) -> Result<()> {
    set_secret(args, session).await.map(|_| ())
}

async fn set_secret(args: &SecretsSetArgs, session: &Session) -> Result<SetOutcome> {
    session.require_auth()?;
    let project_id = session.project_id()?;
    ResourceManagerClient::new(&session.origins().resource_manager, &session.client_options)?
        .require_permissions(project_id, SET_PERMISSIONS)
        .await?;

    let projects = ProjectsClient::new(&session.origins().firebase_management, &session.client_options)?;
    let info = ProjectInfo {
        project_id: project_id.to_string(),
        project_number: projects.need_project_number(project_id).await?,
    };

    let key = ensure_valid_key(&args.key, args.force, |transformed| {
        Ok(prompt::confirm(
            session.interactive,
            &format!("Would you like to use {} as key instead?", transformed),
            true,
        )?)
    })?;
    let client = secret_manager(session)?;
    let secret = ensure_secret(&client, project_id, &key, args.force, |secret| {
        Ok(prompt::confirm(
            session.interactive,
            &format!(
                "Would you like to have your secret {} managed by Cloud Functions for Firebase?",
                secret.name
            ),
            true,
        )?)
    })
    .await?;

    let value = read_secret_value(&key, args.data_file.as_deref())?;
    let version = client.add_version(project_id, &key, &value).await?;
    output::success(&format!(
        "Created a new secret version {}",
        to_secret_version_resource_name(&version)
    ));

    if !is_firebase_managed(&secret) {
        redeploy_hint();
        return Ok(SetOutcome::NeedsRedeploy);
    }
    roll_out(&info, &version, args.force, session).await
}

async fn roll_out(
    info: &ProjectInfo,
    version: &SecretVersion,
    force: bool,
    session: &Session,
) -> Result<SetOutcome> {
    let functions = FunctionsClient::new(&session.origins().functions, &session.client_options)?;
    let endpoints = functions.list_functions(&info.project_id).await?;
    let stale = endpoints_using(info, &version.secret, &endpoints);
    if stale.is_empty() {
        return Ok(SetOutcome::NoFunctions);
    }

    let labels: Vec<String> = stale.iter().map(|e| endpoint_label(e)).collect();
    output::bullet(&format!(
        "{} functions are using stale version of secret {}:\n\t{}",
        stale.len(),
        version.secret.name,
        labels.join("\n\t")
    ));

    if !force {
        let redeploy = prompt::confirm(
            session.interactive,
            &format!(
                "Do you want to re-deploy the functions and destroy the stale version of secret {}?",
                version.secret.name
            ),
            true,
        )?;
        if !redeploy {
            redeploy_hint();
            return Ok(SetOutcome::NeedsRedeploy);
        }
    }

    let updated = update_endpoints(
        &functions,
        info,
        version,
        &stale,
        &session.poll_options(),
        |event| match event {
            EndpointUpdate::Updating(label) => output::bullet(&format!("Updating function {}...", label)),
            EndpointUpdate::Updated(label) => output::bullet(&format!("Updated function {}.", label)),
        },
    )
    .await?;
    Ok(SetOutcome::Updated(updated.iter().map(endpoint_label).collect()))
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "State")]
    state: String,
}

async fn get(args: &SecretsGetArgs, session: &Session) -> Result<Vec<SecretVersion>> {
    session.require_auth()?;
    let versions = secret_manager(session)?
        .list_secret_versions(session.project_id()?, &args.key)
        .await?;
    let rows: Vec<VersionRow> = versions
        .iter()
        .map(|v| VersionRow {
            version: v.version_id.clone(),
            state: v.state.map(|s| s.to_string()).unwrap_or_default(),
        })
        .collect();
    output::line(&output::table(&rows));
    Ok(versions)
}

/// `KEY` or `KEY@version`; the version defaults to `latest`
fn split_key(key: &str) -> (&str, &str) {
    match key.split_once('@') {
        Some((name, version)) if !version.is_empty() => (name, version),
        Some((name, _)) => (name, "latest"),
        None => (key, "latest"),
    }
}

async fn access(args: &SecretsAccessArgs, session: &Session) -> Result<String> {
    session.require_auth()?;
    let (name, version) = split_key(&args.key);
    Ok(secret_manager(session)?
        .access_secret_version(session.project_id()?, name, version)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::session;
    use serde_json::json;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mock_set_prelude(server: &MockServer, labels: serde_json::Value) {
        mock(
            server,
            "POST",
            "/v1/projects/my-project:testIamPermissions",
            json!({ "permissions": SET_PERMISSIONS }),
        )
        .await;
        mock(
            server,
            "GET",
            "/v1beta1/projects/my-project",
            json!({ "projectId": "my-project", "projectNumber": "42" }),
        )
        .await;
        mock(
            server,
            "GET",
            "/v1/projects/my-project/secrets/API_KEY",
            json!({ "name": "projects/42/secrets/API_KEY", "labels": labels }),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/my-project/secrets/API_KEY:addVersion"))
            .and(body_partial_json(json!({ "payload": { "data": "czNjcjN0" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/42/secrets/API_KEY/versions/2",
                "state": "ENABLED"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn data_file() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "s3cr3t").unwrap();
        file
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("API_KEY"), ("API_KEY", "latest"));
        assert_eq!(split_key("API_KEY@3"), ("API_KEY", "3"));
        assert_eq!(split_key("API_KEY@"), ("API_KEY", "latest"));
    }

    #[tokio::test]
    async fn test_set_unmanaged_secret_needs_redeploy() {
        let server = MockServer::start().await;
        mock_set_prelude(&server, json!({})).await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/my-project/locations/-/functions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let file = data_file();
        let s = session(&server.uri(), "my-project");
        let args = SecretsSetArgs {
            key: "API_KEY".into(),
            data_file: Some(file.path().to_string_lossy().into_owned()),
            force: true,
        };
        assert_eq!(set_secret(&args, &s).await.unwrap(), SetOutcome::NeedsRedeploy);
    }

    #[tokio::test]
    async fn test_set_managed_secret_without_bound_functions() {
        let server = MockServer::start().await;
        mock_set_prelude(&server, json!({ "firebase-managed": "true" })).await;
        mock(
            &server,
            "GET",
            "/v1/projects/my-project/locations/-/functions",
            json!({ "functions": [] }),
        )
        .await;

        let file = data_file();
        let s = session(&server.uri(), "my-project");
        let args = SecretsSetArgs {
            key: "API_KEY".into(),
            data_file: Some(file.path().to_string_lossy().into_owned()),
            force: false,
        };
        assert_eq!(set_secret(&args, &s).await.unwrap(), SetOutcome::NoFunctions);
    }

    #[tokio::test]
    async fn test_set_fails_on_missing_permissions() {
        let server = MockServer::start().await;
        mock(
            &server,
            "POST",
            "/v1/projects/my-project:testIamPermissions",
            json!({ "permissions": ["secretmanager.secrets.get"] }),
        )
        .await;

        let s = session(&server.uri(), "my-project");
        let args = SecretsSetArgs {
            key: "API_KEY".into(),
            data_file: None,
            force: false,
        };
        let err = set_secret(&args, &s).await.unwrap_err().to_string();
        assert!(err.contains("secretmanager.secrets.create"));
        assert!(!err.contains("secretmanager.secrets.get\n"));
    }

    #[tokio::test]
    async fn test_get_lists_versions() {
        let server = MockServer::start().await;
        mock(
            &server,
            "GET",
            "/v1/projects/my-project/secrets/API_KEY/versions",
            json!({ "versions": [
                { "name": "projects/42/secrets/API_KEY/versions/2", "state": "ENABLED" },
                { "name": "projects/42/secrets/API_KEY/versions/1", "state": "DESTROYED" }
            ]}),
        )
        .await;

        let s = session(&server.uri(), "my-project");
        let versions = get(&SecretsGetArgs { key: "API_KEY".into() }, &s).await.unwrap();
        let ids: Vec<&str> = versions.iter().map(|v| v.version_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_access_decodes_payload() {
        let server = MockServer::start().await;
        mock(
            &server,
            "GET",
            "/v1/projects/my-project/secrets/API_KEY/versions/3:access",
            json!({ "payload": { "data": "czNjcjN0" } }),
        )
        .await;

        let s = session(&server.uri(), "my-project");
        let value = access(&SecretsAccessArgs { key: "API_KEY@3".into() }, &s)
            .await
            .unwrap();
        assert_eq!(value, "s3cr3t");
    }
}
