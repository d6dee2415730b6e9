//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// fbctl - manage Firebase-style projects from the command line
#[derive(Parser, Debug)]
#[command(name = "fbctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project id or alias to use
    #[arg(short = 'P', long, global = true)]
    pub project: Option<String>,

    /// Path to firebase.json (default: search upwards from the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// OAuth access token (default: FBCTL_TOKEN or GOOGLE_OAUTH_ACCESS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Never prompt; fail or take defaults instead
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Print the command result as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Realtime Database management
    #[command(subcommand)]
    Database(DatabaseCommands),

    /// Extensions
    #[command(subcommand)]
    Ext(ExtCommands),

    /// Cloud Functions
    #[command(subcommand)]
    Functions(FunctionsCommands),

    /// Firebase Hosting
    #[command(subcommand)]
    Hosting(HostingCommands),

    /// Deploy helpers
    #[command(subcommand)]
    Deploy(DeployCommands),

    /// Local emulator helpers
    #[command(subcommand)]
    Emulators(EmulatorsCommands),
}

// Database commands
#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Realtime Database instances
    #[command(subcommand)]
    Instances(DatabaseInstancesCommands),
}

#[derive(Subcommand, Debug)]
pub enum DatabaseInstancesCommands {
    /// List Realtime Database instances, optionally filtered by location
    List(DatabaseInstancesListArgs),
}

#[derive(Args, Debug)]
pub struct DatabaseInstancesListArgs {
    /// Location of the instances (requires the rtdbmanagement experiment)
    #[arg(short, long)]
    pub location: Option<String>,
}

// Extension commands
#[derive(Subcommand, Debug)]
pub enum ExtCommands {
    /// Extension publisher commands
    #[command(subcommand)]
    Dev(ExtDevCommands),

    /// Show information about a local extension
    Info(ExtInfoArgs),
}

#[derive(Subcommand, Debug)]
pub enum ExtDevCommands {
    /// List all published extensions associated with a publisher ID
    List(ExtDevListArgs),

    /// Delete an extension
    Delete(ExtDevDeleteArgs),

    /// Unpublish an extension
    Unpublish(ExtDevUnpublishArgs),

    /// Register a publisher ID for the active project
    Register(ExtDevRegisterArgs),

    /// Emulator commands for extension authors
    #[command(subcommand)]
    Emulators(ExtDevEmulatorsCommands),
}

#[derive(Args, Debug)]
pub struct ExtDevListArgs {
    /// Publisher ID
    pub publisher_id: String,
}

#[derive(Args, Debug)]
pub struct ExtDevDeleteArgs {
    /// Extension reference, `<publisherId>/<extensionId>`
    pub extension_ref: String,
}

#[derive(Args, Debug)]
pub struct ExtDevUnpublishArgs {
    /// Extension reference, `<publisherId>/<extensionId>`
    pub extension_ref: String,

    /// Skip confirmation (required in non-interactive mode)
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ExtDevRegisterArgs {
    /// Publisher ID to claim
    pub publisher_id: String,
}

#[derive(Subcommand, Debug)]
pub enum ExtDevEmulatorsCommands {
    /// Deprecated: use `emulators start` in a project directory
    Start(ExtEmulatorArgs),

    /// Deprecated: use `emulators exec` in a project directory
    Exec(ExtEmulatorExecArgs),

    /// Print the emulator configuration derived from the extension in the current directory
    Config(ExtEmulatorArgs),
}

#[derive(Args, Debug)]
pub struct ExtEmulatorArgs {
    /// Env file holding param values
    #[arg(long)]
    pub test_params: Option<Utf8PathBuf>,

    /// firebase.json-style file with emulator settings
    #[arg(long)]
    pub test_config: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExtEmulatorExecArgs {
    /// Script to run once the emulators are up
    pub script: String,

    #[command(flatten)]
    pub emulator: ExtEmulatorArgs,
}

#[derive(Args, Debug)]
pub struct ExtInfoArgs {
    /// Extension directory (default: search upwards from the current directory)
    pub directory: Option<Utf8PathBuf>,

    /// Print the raw markdown instead of styled text
    #[arg(long)]
    pub markdown: bool,
}

// Functions commands
#[derive(Subcommand, Debug)]
pub enum FunctionsCommands {
    /// Secrets used by Cloud Functions
    #[command(subcommand)]
    Secrets(SecretsCommands),
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommands {
    /// Create or update a secret for use in Cloud Functions
    Set(SecretsSetArgs),

    /// Get metadata for a secret and its versions
    Get(SecretsGetArgs),

    /// Access a secret value; defaults to the latest version
    Access(SecretsAccessArgs),
}

#[derive(Args, Debug)]
pub struct SecretsSetArgs {
    /// Secret key
    pub key: String,

    /// File to read the secret value from; "-" reads stdin
    #[arg(long)]
    pub data_file: Option<String>,

    /// Update functions using the secret without asking
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct SecretsGetArgs {
    /// Secret key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SecretsAccessArgs {
    /// Secret key, optionally `KEY@version`
    pub key: String,
}

// Hosting commands
#[derive(Subcommand, Debug)]
pub enum HostingCommands {
    /// Hosting sites
    #[command(subcommand)]
    Sites(HostingSitesCommands),
}

#[derive(Subcommand, Debug)]
pub enum HostingSitesCommands {
    /// Create a Hosting site
    Create(HostingSitesCreateArgs),
}

#[derive(Args, Debug)]
pub struct HostingSitesCreateArgs {
    /// Site id (`<id>.web.app`)
    pub site_id: Option<String>,

    /// Existing web app id to link the site to
    #[arg(long)]
    pub app: Option<String>,
}

// Deploy commands
#[derive(Subcommand, Debug)]
pub enum DeployCommands {
    /// Run the predeploy or postdeploy scripts from firebase.json
    Hooks(DeployHooksArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum HookArg {
    Predeploy,
    Postdeploy,
}

#[derive(Args, Debug)]
pub struct DeployHooksArgs {
    /// Which hook to run
    #[arg(value_enum)]
    pub hook: HookArg,

    /// Only these targets, e.g. `hosting:blog,functions`
    #[arg(long)]
    pub only: Option<String>,
}

// Emulator commands
#[derive(Subcommand, Debug)]
pub enum EmulatorsCommands {
    /// Show the rules files the Storage emulator would load
    StorageRules,
}
