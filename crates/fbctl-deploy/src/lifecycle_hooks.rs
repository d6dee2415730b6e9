//! Predeploy and postdeploy scripts from `firebase.json`
//!
//! Every product section (`hosting`, `functions`, ...) may carry a
//! `predeploy` or `postdeploy` entry holding one command or a list of
//! commands. Commands run one after another through the platform shell,
//! in the project directory, with the parent environment plus:
//!
//! - `GCLOUD_PROJECT`: the active project
//! - `PROJECT_DIR`: the directory holding `firebase.json`
//! - `RESOURCE_DIR`: the directory of the deployed resource

use crate::error::{DeployError, Result};
use camino::Utf8PathBuf;
use fbctl_core::ProjectConfig;
use serde_json::Value;
use std::fmt;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, info};

/// When a hook runs relative to the deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Predeploy,
    Postdeploy,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predeploy => "predeploy",
            Self::Postdeploy => "postdeploy",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress reported while hooks run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// A command is about to start
    Running { command: String },

    /// Every command of one config finished successfully
    Finished { id: String, hook: Hook },
}

/// Runs the lifecycle hooks of one project
#[derive(Debug, Clone)]
pub struct HookRunner<'a> {
    config: &'a ProjectConfig,
    project_id: &'a str,
    only: Option<&'a str>,
}

impl<'a> HookRunner<'a> {
    pub fn new(config: &'a ProjectConfig, project_id: &'a str) -> Self {
        Self {
            config,
            project_id,
            only: None,
        }
    }

    /// Restrict to an `--only` selection such as `hosting:blog,functions`
    pub fn only(mut self, only: Option<&'a str>) -> Self {
        self.only = only.filter(|o| !o.is_empty());
        self
    }

    /// The configs of `target` selected by `--only`
    ///
    /// A single object counts as a one-element list. When `--only` names
    /// `target:name` entries, configs without a `target` key still run.
    pub fn relevant_configs(&self, target: &str) -> Vec<Value> {
        let configs = match self.config.get(target) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(other) => vec![other.clone()],
        };

        let Some(only) = self.only else {
            return configs;
        };
        let selected: Vec<&str> = only.split(',').map(str::trim).collect();
        if selected.contains(&target) {
            return configs;
        }

        let prefix = format!("{}:", target);
        let names: Vec<&str> = selected
            .iter()
            .filter_map(|s| s.strip_prefix(prefix.as_str()))
            .collect();

        configs
            .into_iter()
            .filter(|c| match c.get("target").and_then(Value::as_str) {
                None => true,
                Some(name) => names.contains(&name),
            })
            .collect()
    }

    /// Run `hook` for every relevant config of `target`
    ///
    /// Stops at the first failing command.
    pub async fn run<F>(&self, target: &str, hook: Hook, mut on_event: F) -> Result<()>
    where
        F: FnMut(HookEvent),
    {
        for config in self.relevant_configs(target) {
            let commands = hook_commands(&config, hook);
            if commands.is_empty() {
                continue;
            }

            let id = match config.get("target").and_then(Value::as_str) {
                Some(name) => format!("{}[{}]", target, name),
                None => target.to_string(),
            };
            let resource_dir = self.resource_dir(target, &config);

            for command in &commands {
                on_event(HookEvent::Running {
                    command: command.clone(),
                });
                info!("Running command: {}", command);
                self.run_command(command, &resource_dir)
                    .await
                    .map_err(|message| DeployError::Hook {
                        id: id.clone(),
                        hook: hook.to_string(),
                        message,
                    })?;
            }

            on_event(HookEvent::Finished { id, hook });
        }
        Ok(())
    }

    fn resource_dir(&self, target: &str, config: &Value) -> Utf8PathBuf {
        let key = match target {
            "hosting" => config
                .get("public")
                .or_else(|| config.get("source"))
                .and_then(Value::as_str),
            "functions" => config.get("source").and_then(Value::as_str),
            _ => None,
        };
        match key {
            Some(dir) => self.config.path(dir),
            None => self.config.project_dir().to_path_buf(),
        }
    }

    async fn run_command(
        &self,
        command: &str,
        resource_dir: &Utf8PathBuf,
    ) -> std::result::Result<(), String> {
        let mut cmd = shell_command(command);
        cmd.current_dir(self.config.project_dir())
            .env("GCLOUD_PROJECT", self.project_id)
            .env("PROJECT_DIR", self.config.project_dir().as_str())
            .env("RESOURCE_DIR", resource_dir.as_str());

        debug!("Spawning hook in {}", self.config.project_dir());
        let status = cmd
            .status()
            .await
            .map_err(|e| format!("Failed to run command: {}", e))?;
        check_status(status)
    }
}

fn hook_commands(config: &Value, hook: Hook) -> Vec<String> {
    match config.get(hook.as_str()) {
        Some(Value::String(command)) => vec![command.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn check_status(status: ExitStatus) -> std::result::Result<(), String> {
    if status.success() {
        return Ok(());
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(format!("Command terminated with signal {}", signal_name(signal)));
        }
    }
    Err(format!(
        "Command terminated with non-zero exit code {}",
        status.code().unwrap_or(-1)
    ))
}

#[cfg(unix)]
fn signal_name(signal: i32) -> String {
    let name = match signal {
        1 => "SIGHUP",
        2 => "SIGINT",
        3 => "SIGQUIT",
        4 => "SIGILL",
        6 => "SIGABRT",
        8 => "SIGFPE",
        9 => "SIGKILL",
        11 => "SIGSEGV",
        13 => "SIGPIPE",
        14 => "SIGALRM",
        15 => "SIGTERM",
        _ => return signal.to_string(),
    };
    name.to_string()
}
