//! Deploy helpers: lifecycle hooks from `firebase.json`

use anyhow::Result;
use fbctl_deploy::{Hook, HookEvent, HookRunner};

use crate::cli::{DeployCommands, DeployHooksArgs, HookArg};
use crate::output;
use crate::session::Session;

/// Products that may declare hooks, in deploy order
const TARGETS: &[&str] = &[
    "database",
    "firestore",
    "functions",
    "hosting",
    "storage",
    "remoteconfig",
];

impl From<HookArg> for Hook {
    fn from(arg: HookArg) -> Self {
        match arg {
            HookArg::Predeploy => Hook::Predeploy,
            HookArg::Postdeploy => Hook::Postdeploy,
        }
    }
}

pub async fn run(command: DeployCommands, session: &Session) -> Result<()> {
    match command {
        DeployCommands::Hooks(args) => run_hooks(&args, session).await,
    }
}

async fn run_hooks(args: &DeployHooksArgs, session: &Session) -> Result<()> {
    let config = session.project.need_config()?;
    let project_id = session.project_id()?;
    let hook = Hook::from(args.hook);
    let runner = HookRunner::new(config, project_id).only(args.only.as_deref());

    for target in TARGETS {
        runner
            .run(target, hook, |event| match event {
                HookEvent::Running { command } => {
                    output::bullet(&format!("Running command: {}", command))
                }
                HookEvent::Finished { id, hook } => {
                    output::success(&format!("{}: Finished running {} script.", id, hook))
                }
            })
            .await?;
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::session::testing::session;
    use fbctl_core::ProjectConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn session_with_config(dir: &TempDir, data: serde_json::Value) -> Session {
        let mut s = session("http://127.0.0.1:9", "my-project");
        let project_dir = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        s.project.config = Some(ProjectConfig::from_value(data, project_dir));
        s
    }

    #[tokio::test]
    async fn test_hooks_run_in_target_order() {
        let dir = TempDir::new().unwrap();
        let s = session_with_config(
            &dir,
            json!({
                "hosting": { "predeploy": "echo hosting >> order.txt" },
                "functions": { "predeploy": ["echo functions >> order.txt"] }
            }),
        );
        let args = DeployHooksArgs {
            hook: HookArg::Predeploy,
            only: None,
        };
        run_hooks(&args, &s).await.unwrap();

        let order = std::fs::read_to_string(dir.path().join("order.txt")).unwrap();
        assert_eq!(order, "functions\nhosting\n");
    }

    #[tokio::test]
    async fn test_failing_hook_names_target() {
        let dir = TempDir::new().unwrap();
        let s = session_with_config(&dir, json!({ "storage": { "postdeploy": "exit 3" } }));
        let args = DeployHooksArgs {
            hook: HookArg::Postdeploy,
            only: Some("storage".into()),
        };
        let err = run_hooks(&args, &s).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "storage postdeploy error: Command terminated with non-zero exit code 3"
        );
    }

    #[tokio::test]
    async fn test_missing_config_is_an_error() {
        let s = session("http://127.0.0.1:9", "my-project");
        let args = DeployHooksArgs {
            hook: HookArg::Predeploy,
            only: None,
        };
        assert!(run_hooks(&args, &s).await.is_err());
    }
}
