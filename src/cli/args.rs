//! CLI argument structures
//!
//! The top-level CLI with its global verbosity flag, the `lint` subcommand and
//! the flattened client options shared with the workflow server.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lint workflow template manifests locally or against a workflow server
#[derive(Parser)]
#[command(name = "wftlint")]
#[command(about = "wftlint - Validate workflow template manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a directory or a list of workflow template files
    #[command(name = "lint")]
    #[command(override_usage = "wftlint lint [OPTIONS] (DIRECTORY | FILE1 FILE2 FILE3...)")]
    Lint {
        /// A single directory, or one or more manifest files
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Reject unknown fields while parsing
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            default_value_t = true,
            default_missing_value = "true",
            action = clap::ArgAction::Set
        )]
        strict: bool,

        #[command(flatten)]
        client: ClientArgs,
    },
}

/// Connection options for server-side linting
#[derive(Args, Debug, Clone, Default)]
pub struct ClientArgs {
    /// Workflow server address (host:port or URL); enables server-side linting
    #[arg(long = "argo-server", env = "ARGO_SERVER", value_name = "ADDRESS")]
    pub server: Option<String>,

    /// Use https for a bare host:port server address
    #[arg(long, env = "ARGO_SECURE")]
    pub secure: bool,

    /// Skip TLS certificate verification
    #[arg(long, env = "ARGO_INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Bearer token sent to the workflow server
    #[arg(long = "argo-token", env = "ARGO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path prefix the workflow server is served under
    #[arg(long = "argo-base-href", env = "ARGO_BASE_HREF", default_value = "")]
    pub base_href: String,

    /// Namespace to lint in (defaults to the kubeconfig context, then "default")
    #[arg(short = 'n', long, env = "ARGO_NAMESPACE")]
    pub namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lint_args(args: &[&str]) -> (Vec<PathBuf>, bool, ClientArgs) {
        let mut argv = vec!["wftlint", "lint"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Lint {
                paths,
                strict,
                client,
            }) => (paths, strict, client),
            None => panic!("expected lint command"),
        }
    }

    #[test]
    fn test_strict_defaults_to_true() {
        let (paths, strict, _) = lint_args(&["templates/"]);
        assert!(strict);
        assert_eq!(paths, vec![PathBuf::from("templates/")]);
    }

    #[test]
    fn test_strict_accepts_explicit_value() {
        let (_, strict, _) = lint_args(&["--strict=false", "a.yaml"]);
        assert!(!strict);
        let (paths, strict, _) = lint_args(&["--strict", "a.yaml", "b.yaml"]);
        assert!(strict);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_paths_may_be_empty() {
        let (paths, _, _) = lint_args(&[]);
        assert!(paths.is_empty());
    }

    #[test]
    fn test_client_flags() {
        let (_, _, client) = lint_args(&[
            "--argo-server",
            "localhost:2746",
            "--secure",
            "-n",
            "argo",
            "--argo-base-href",
            "/argo",
            "a.yaml",
        ]);
        assert_eq!(client.server.as_deref(), Some("localhost:2746"));
        assert!(client.secure);
        assert!(!client.insecure_skip_verify);
        assert_eq!(client.namespace.as_deref(), Some("argo"));
        assert_eq!(client.base_href, "/argo");
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["wftlint", "lint", "-vv", "a.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
