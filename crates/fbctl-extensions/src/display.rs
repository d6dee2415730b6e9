//! Human-readable summary of an extension before it is installed

use crate::error::{ExtensionsError, Result};
use crate::types::{Api, ExtensionSpec, Role, FUNCTIONS_RESOURCE_TYPE};
use fbctl_api::iam::IamClient;
use futures::future::try_join_all;

/// Role granted when an extension reads secrets
pub const SECRET_ROLE: &str = "secretmanager.secretAccessor";
const TASKS_ROLE: &str = "cloudtasks.enqueuer";
const TASKS_API: &str = "cloudtasks.googleapis.com";

/// Markdown lines describing `spec`; role details are fetched from IAM
///
/// Fails when nothing could be said about the extension.
pub async fn display_ext_info(
    iam: &IamClient,
    extension_name: &str,
    publisher: Option<&str>,
    spec: &ExtensionSpec,
    published: bool,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    if let Some(display_name) = &spec.display_name {
        lines.push(format!("**Name**: {}", display_name));
    }
    if let Some(publisher) = publisher {
        lines.push(format!("**Publisher**: {}", publisher));
    }
    if let Some(description) = &spec.description {
        lines.push(format!("**Description**: {}", description));
    }
    if published {
        if let Some(license) = &spec.license {
            lines.push(format!("**License**: {}", license));
        }
        if let Some(source) = &spec.source_url {
            lines.push(format!("**Source code**: {}", source));
        }
    }

    let apis = implied_apis(spec);
    if !apis.is_empty() {
        let entries: Vec<String> = apis
            .iter()
            .map(|a| format!("  {} ({})", a.api_name, a.reason))
            .collect();
        lines.push(format!(
            "**APIs used by this Extension**:\n{}",
            entries.join("\n")
        ));
    }

    let roles = implied_roles(spec);
    if !roles.is_empty() {
        let entries =
            try_join_all(roles.iter().map(|r| retrieve_role_info(iam, &r.role))).await?;
        lines.push(format!(
            "**Roles granted to this Extension**:\n{}",
            entries.join("\n")
        ));
    }

    if lines.is_empty() {
        return Err(ExtensionsError::validation(format!(
            "Error occurred during installation: cannot parse info from source spec for {}",
            extension_name
        )));
    }
    Ok(lines)
}

/// `  Title (description)` for an IAM role
pub async fn retrieve_role_info(iam: &IamClient, role: &str) -> Result<String> {
    let info = iam.get_role(role).await?;
    Ok(format!("  {} ({})", info.title, info.description))
}

pub fn print_source_download_link(uri: &str) -> String {
    format!(
        "Want to review the source code that will be installed? Download it here: {}",
        uri
    )
}

fn uses_tasks(spec: &ExtensionSpec) -> bool {
    spec.resources.iter().any(|r| {
        r.resource_type == FUNCTIONS_RESOURCE_TYPE && r.property("taskQueueTrigger").is_some()
    })
}

fn uses_secrets(spec: &ExtensionSpec) -> bool {
    spec.params.iter().any(|p| p.is_secret())
}

/// Roles the extension needs implicitly, followed by the declared ones
pub fn implied_roles(spec: &ExtensionSpec) -> Vec<Role> {
    let declared = |name: &str| spec.roles.iter().any(|r| r.role == name);
    let mut roles = Vec::new();
    if uses_secrets(spec) && !declared(SECRET_ROLE) {
        roles.push(Role {
            role: SECRET_ROLE.to_string(),
            reason: "Allows the extension to read secret values from Cloud Secret Manager"
                .to_string(),
        });
    }
    if uses_tasks(spec) && !declared(TASKS_ROLE) {
        roles.push(Role {
            role: TASKS_ROLE.to_string(),
            reason: "Allows the extension to enqueue Cloud Tasks".to_string(),
        });
    }
    roles.extend(spec.roles.iter().cloned());
    roles
}

/// APIs the extension needs implicitly, followed by the declared ones
pub fn implied_apis(spec: &ExtensionSpec) -> Vec<Api> {
    let mut apis = Vec::new();
    if uses_tasks(spec) && !spec.apis.iter().any(|a| a.api_name == TASKS_API) {
        apis.push(Api {
            api_name: TASKS_API.to_string(),
            reason: "Allows the extension to enqueue Cloud Tasks".to_string(),
        });
    }
    apis.extend(spec.apis.iter().cloned());
    apis
}
