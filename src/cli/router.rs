//! Command routing and execution

use crate::cli::args::{ClientArgs, Commands};
use crate::cli::help::{generate_command_help, generate_help};
use crate::config::ClientConfig;
use crate::error::LintError;
use crate::lint::{LintInvocation, ModeSelector};
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Option<Commands>, verbose: u8) -> Result<()> {
    match command {
        Some(Commands::Lint {
            paths,
            strict,
            client,
        }) => run_lint(paths, strict, client, verbose).await,
        None => {
            println!("{}", generate_help());
            Ok(())
        }
    }
}

async fn run_lint(paths: Vec<PathBuf>, strict: bool, client: ClientArgs, verbose: u8) -> Result<()> {
    if paths.is_empty() {
        println!("{}", generate_command_help("lint")?);
        return Err(LintError::NoPaths.into());
    }

    let config = client_config(client)?;
    debug!(
        "Linting {} path(s), strict={}, remote={}, namespace={}, verbosity={}",
        paths.len(),
        strict,
        config.is_remote(),
        config.namespace,
        verbose
    );

    let invocation = LintInvocation::new(paths, strict, &config);
    ModeSelector::new(&invocation, &config).run().await?;
    Ok(())
}

/// Resolve the client configuration once; nothing downstream reads the
/// environment again.
pub fn client_config(args: ClientArgs) -> Result<ClientConfig> {
    let namespace = ClientConfig::resolve_namespace(args.namespace)?;
    Ok(ClientConfig {
        server: args.server.filter(|s| !s.trim().is_empty()),
        namespace,
        token: args.token,
        secure: args.secure,
        insecure_skip_verify: args.insecure_skip_verify,
        base_href: args.base_href,
    })
}
