//! cask - validate, resolve and plan cask manifests

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cask_cli::cmd;
use cask_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let arch = cli.arch();
    debug!(command = ?cli.command, %arch, "running command");

    match cli.command {
        Commands::Check { path } => cmd::check::check(&path),
        Commands::Validate { dir, json } => cmd::validate::validate(&dir, json).await,
        Commands::Resolve {
            path,
            version,
            json,
        } => cmd::resolve::resolve(&path, arch, version.as_deref(), json),
        Commands::Plan {
            path,
            intent,
            appdir,
            version,
            expand_home,
            json,
        } => cmd::plan::plan(
            &path,
            intent,
            arch,
            &cmd::plan::PlanArgs {
                appdir,
                version,
                expand_home,
                json,
            },
        ),
        Commands::Info { path } => cmd::info::info(&path),
        Commands::Hash { files } => cmd::hash::hash(&files),
        Commands::Verify { path, download } => cmd::verify::verify(&path, &download, arch),
        Commands::LivecheckExtract { path, url, body } => {
            cmd::livecheck::extract(&path, &url, body.as_deref())
        }
        Commands::Bump {
            path,
            version,
            write,
        } => cmd::bump::bump(&path, &version, write),
    }
}
