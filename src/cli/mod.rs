//! CLI for the Gitea provisioner
//!
//! - `serve`: HTTP provisioning service
//! - `reap`: delete expired repositories and temporary users
//! - `newcontributor`: create a permanent admin contributor
//! - `wait` / `pre`: environment setup helpers
//! - `newuser`: prestep client posting a request to a running service

pub mod context;
pub mod contributor;
pub mod error;
pub mod prestep;
pub mod reap;
pub mod serve;
pub mod setup;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

pub use context::Context;
pub use error::CliError;

/// Provisions short-lived Gitea users, SSH credentials and repositories
#[derive(Debug, Parser)]
#[command(name = "gitea-provisioner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root URL for all Gitea requests
    #[arg(long = "root-url", env = "GITEA_ROOT_URL", global = true)]
    pub root_url: Option<String>,

    /// Include debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the provisioning API
    Serve(ServeArgs),

    /// Delete expired user guide repositories and temporary users
    Reap(ReapArgs),

    /// Create a permanent contributor account and print an access token
    #[command(name = "newcontributor")]
    NewContributor(ContributorArgs),

    /// Wait for the Gitea API to come up
    Wait(WaitArgs),

    /// Wait for the Gitea API, then create the user guides organisation
    Pre(WaitArgs),

    /// Post a provisioning request read from stdin to a running service
    #[command(name = "newuser")]
    NewUser(NewUserArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port on which to listen
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct ReapArgs {
    /// Age beyond which users and repositories are reaped (e.g. 3h, 90m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub age: Option<Duration>,
}

#[derive(Debug, Args)]
pub struct ContributorArgs {
    /// New contributor email address
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub email: String,

    /// New contributor full name
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub fullname: String,

    /// New contributor username
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub username: String,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Max time to wait for the API server
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub wait: Duration,
}

#[derive(Debug, Args)]
pub struct NewUserArgs {
    /// Base URL of the provisioning service
    #[arg(long, env = "GITEA_PRESTEP_ENDPOINT")]
    pub endpoint: String,
}

/// Load configuration, initialise logging and run the selected command
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let context = Context::load(cli.root_url.as_deref(), cli.debug)?;

    match cli.command {
        Command::Serve(args) => serve::run(&context, args).await,
        Command::Reap(args) => reap::run(&context, args).await,
        Command::NewContributor(args) => contributor::run(&context, args).await,
        Command::Wait(args) => setup::wait(&context, args).await,
        Command::Pre(args) => setup::pre(&context, args).await,
        Command::NewUser(args) => prestep::run(args).await,
    }
}
