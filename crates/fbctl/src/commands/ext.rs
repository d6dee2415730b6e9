//! Extension commands: publisher tooling and local extension info

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use console::style;
use fbctl_api::iam::IamClient;
use fbctl_extensions::consent::{prompt_for_publisher_tos, PUBLISHER_TOS_SUMMARY};
use fbctl_extensions::display::{display_ext_info, print_source_download_link};
use fbctl_extensions::emulator_options::{build_options, EmulatorOptionsArgs};
use fbctl_extensions::spec_helper::{find_extension_yaml, read_extension_yaml};
use fbctl_extensions::{Extension, PublisherClient, Ref, LOG_PREFIX};
use serde_json::json;
use tabled::Tabled;

use crate::cli::{
    ExtCommands, ExtDevCommands, ExtDevDeleteArgs, ExtDevEmulatorsCommands, ExtDevListArgs,
    ExtDevRegisterArgs, ExtDevUnpublishArgs, ExtEmulatorArgs, ExtInfoArgs,
};
use crate::output;
use crate::prompt;
use crate::session::Session;
use crate::utils::{current_dir, format_timestamp};

pub async fn run(command: ExtCommands, session: &Session) -> Result<()> {
    match command {
        ExtCommands::Dev(dev) => run_dev(dev, session).await,
        ExtCommands::Info(args) => info(args, session).await,
    }
}

async fn run_dev(command: ExtDevCommands, session: &Session) -> Result<()> {
    match command {
        ExtDevCommands::List(args) => {
            let extensions = list(&args, session).await?;
            if session.json {
                output::json(&json!({ "extensions": extensions }))?;
            }
            Ok(())
        }
        ExtDevCommands::Delete(args) => delete(&args, session).await,
        ExtDevCommands::Unpublish(args) => unpublish(&args, session).await,
        ExtDevCommands::Register(args) => register(&args, session).await,
        ExtDevCommands::Emulators(cmd) => match cmd {
            ExtDevEmulatorsCommands::Start(_) => Err(emulators_deprecated("start", None)?),
            ExtDevEmulatorsCommands::Exec(args) => {
                Err(emulators_deprecated("exec", Some(&args.script))?)
            }
            ExtDevEmulatorsCommands::Config(args) => emulator_config(&args, session),
        },
    }
}

fn publisher_client(session: &Session) -> Result<PublisherClient> {
    Ok(PublisherClient::new(
        &session.origins().extensions,
        &session.client_options,
    )?)
}

#[derive(Tabled)]
struct ExtensionRow {
    #[tabled(rename = "Extension ID")]
    id: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Published")]
    published: String,
}

fn created_at(extension: &Extension) -> Option<DateTime<FixedOffset>> {
    extension
        .create_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
}

/// Newest first; extensions without a creation time sort last
fn sort_by_create_time(extensions: &mut [Extension]) {
    extensions.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

async fn list(args: &ExtDevListArgs, session: &Session) -> Result<Vec<Extension>> {
    session.require_auth()?;
    let mut extensions = publisher_client(session)?
        .list_extensions(&args.publisher_id)
        .await?;

    if extensions.is_empty() {
        bail!(
            "There are no published extensions associated with publisher ID {}. This could happen for two reasons:\n  \
             - The publisher ID doesn't exist or could be misspelled\n  \
             - This publisher has not published any extensions\n\n\
             If you are expecting some extensions to appear, please make sure you have the correct publisher ID and try again.",
            args.publisher_id
        );
    }

    sort_by_create_time(&mut extensions);
    let rows: Vec<ExtensionRow> = extensions
        .iter()
        .map(|e| ExtensionRow {
            id: e
                .extension_ref
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
            version: e.latest_version.clone().unwrap_or_default(),
            published: e
                .create_time
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_default(),
        })
        .collect();

    output::labeled_bullet(
        LOG_PREFIX,
        &format!(
            "list of published extensions for publisher {}:",
            console::style(&args.publisher_id).bold()
        ),
    );
    output::line(&output::table(&rows));
    Ok(extensions)
}

fn warn_permanent(action: &str, past: &str, extension_id: &str) {
    output::labeled_warning(
        LOG_PREFIX,
        &format!(
            "If you {} this extension, developers won't be able to install it. \
             For developers who currently have this extension installed, it will continue to run \
             and will appear as unpublished when listed in the Firebase console or fbctl.",
            action
        ),
    );
    output::labeled_warning(
        "This is a permanent action",
        &format!(
            "Once {}, you may never use the extension name '{}' again.",
            past,
            console::style(extension_id).bold()
        ),
    );
}

fn single_version_error(action: &str, verb: &str) -> anyhow::Error {
    anyhow!(
        "{} a single version is not currently supported. You can only {} ALL versions of an extension. \
         To {} all versions, please remove the version from the reference.",
        action,
        verb,
        verb
    )
}

async fn delete(args: &ExtDevDeleteArgs, session: &Session) -> Result<()> {
    session.require_auth()?;
    session.check_ext_dev_version()?;
    let reference = Ref::parse(&args.extension_ref)?;
    if reference.version.is_some() {
        return Err(single_version_error("Deleting", "delete"));
    }
    warn_permanent("delete", "deleted", &reference.extension_id);

    let client = publisher_client(session)?;
    client.get_extension(&reference).await?;

    let consent = prompt::confirm(
        session.interactive,
        &format!(
            "You are about to delete ALL versions of {}.\nDo you wish to continue?",
            console::style(reference.to_extension_ref()).green()
        ),
        false,
    )?;
    if !consent {
        bail!("deletion cancelled.");
    }

    client.delete_extension(&reference).await?;
    output::labeled_success(LOG_PREFIX, "successfully deleted all versions of this extension.");
    Ok(())
}

/// Non-interactive runs need `--force`; interactive runs always ask
fn confirm_unpublish(reference: &Ref, force: bool, session: &Session) -> Result<bool> {
    if !session.interactive {
        if !force {
            bail!("Pass the --force flag to use this command in non-interactive mode");
        }
        return Ok(true);
    }
    Ok(prompt::confirm(
        true,
        &format!(
            "You are about to unpublish ALL versions of {}.\nDo you wish to continue?",
            console::style(reference.to_extension_ref()).green()
        ),
        false,
    )?)
}

async fn unpublish(args: &ExtDevUnpublishArgs, session: &Session) -> Result<()> {
    session.require_auth()?;
    session.check_ext_dev_version()?;
    let reference = Ref::parse(&args.extension_ref)?;
    warn_permanent("unpublish", "unpublished", &reference.extension_id);
    if reference.version.is_some() {
        return Err(single_version_error("Unpublishing", "unpublish"));
    }

    let client = publisher_client(session)?;
    client.get_extension(&reference).await?;
    if !confirm_unpublish(&reference, args.force, session)? {
        bail!("unpublishing cancelled.");
    }

    client.unpublish_extension(&reference).await?;
    output::labeled_success(
        LOG_PREFIX,
        "successfully unpublished all versions of this extension.",
    );
    Ok(())
}

async fn register(args: &ExtDevRegisterArgs, session: &Session) -> Result<()> {
    session.require_auth()?;
    let project_id = session.project_id()?;

    output::line(PUBLISHER_TOS_SUMMARY);
    prompt_for_publisher_tos(|question| Ok(prompt::confirm(session.interactive, question, false)?))?;

    publisher_client(session)?
        .register_publisher(project_id, &args.publisher_id)
        .await?;
    output::labeled_success(
        LOG_PREFIX,
        &format!(
            "Publisher ID '{}' has been registered to project {}. \
             View and edit your profile at https://console.firebase.google.com/project/{}/publisher",
            console::style(&args.publisher_id).bold(),
            console::style(project_id).bold(),
            project_id
        ),
    );
    Ok(())
}

fn emulators_deprecated(subcommand: &str, script: Option<&str>) -> Result<anyhow::Error> {
    let install = format!("fbctl ext install {}", current_dir()?);
    let emulate = match script {
        Some(script) => format!("fbctl emulators exec '{}'", script),
        None => "fbctl emulators start".to_string(),
    };
    Ok(anyhow!(
        "ext dev emulators {} is no longer supported. Instead, navigate to a Firebase project directory \
         and add this extension to the extensions manifest by running:\n{}\n\
         Then, you can emulate this extension as part of that project by running:\n{}",
        subcommand,
        console::style(install).bold(),
        console::style(emulate).bold()
    ))
}

fn emulator_config(args: &ExtEmulatorArgs, session: &Session) -> Result<()> {
    let test_params = args
        .test_params
        .as_deref()
        .context("Missing required option --test-params")?;
    let cwd = current_dir()?;
    let options = build_options(&EmulatorOptionsArgs {
        cwd: &cwd,
        project_id: session.project_id()?,
        test_params,
        test_config: args.test_config.as_deref(),
    })?;

    output::labeled_bullet(
        LOG_PREFIX,
        &format!(
            "Emulating {} ({} functions, runtime {}) from {}",
            options.spec.name,
            options.triggers.len(),
            options.runtime,
            options.ext_dev_dir
        ),
    );
    output::json(&json!({
        "runtime": options.runtime,
        "env": options.env,
        "triggers": options.triggers,
        "config": options.config.data(),
    }))
}

fn info_header(extension_name: &str) -> String {
    format!("information about '{}':", style(extension_name).bold())
}

/// Extension name and markdown lines for a local extension, plus the source
/// link when it has one
async fn info_lines(args: &ExtInfoArgs, session: &Session) -> Result<(String, Vec<String>)> {
    let start = match &args.directory {
        Some(dir) => dir.clone(),
        None => current_dir()?,
    };
    let dir = find_extension_yaml(&start)?;
    let spec = read_extension_yaml(&dir)?;

    let iam = IamClient::new(&session.origins().iam, &session.client_options)?;
    let mut lines = display_ext_info(&iam, &spec.name, None, &spec, false).await?;
    if let Some(source) = &spec.source_url {
        lines.push(print_source_download_link(source));
    }
    Ok((spec.name, lines))
}

async fn info(args: ExtInfoArgs, session: &Session) -> Result<()> {
    let (name, lines) = info_lines(&args, session).await?;
    output::labeled_bullet(LOG_PREFIX, &info_header(&name));
    for line in &lines {
        if args.markdown {
            output::line(line);
        } else {
            output::line(&output::markdown(line));
        }
    }
    Ok(())
}
