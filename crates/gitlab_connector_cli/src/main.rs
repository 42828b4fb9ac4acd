//! GitLab connector CLI - drive listings and membership mutations.

mod commands;
mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use gitlab_connector::connector::Connector;
use gitlab_connector::gitlab::GitlabClient;
use gitlab_connector::resource::ResourceKind;
use tracing_subscriber::EnvFilter;

use crate::commands::list::OutputFormat;
use crate::commands::{parse_resource_ref, resource_stub};

#[derive(Parser)]
#[command(name = "gitlab-connector")]
#[command(version)]
#[command(about = "GitLab identity-governance connector")]
#[command(
    long_about = "Surfaces GitLab groups, projects, and memberships as resources, \
entitlements, and grants, and applies or revokes memberships. Listings are paged: \
each call returns one page plus the cursor for the next."
)]
#[command(after_long_help = r#"EXAMPLES
    List the first page of groups:
        $ gitlab-connector resources group

    Continue with the cursor the previous page printed:
        $ gitlab-connector resources group --cursor 2

    List the projects of a group:
        $ gitlab-connector resources project --parent group:348/Engineering

    Enumerate a group's entitlements:
        $ gitlab-connector entitlements group:348/Engineering

    Grant a user Developer on a group, then revoke it:
        $ gitlab-connector grant group:348/Engineering:Developer 99
        $ gitlab-connector revoke group:348/Engineering:Developer 99

CONFIGURATION
    gitlab-connector reads configuration from:
      1. ~/.config/gitlab-connector/config.toml (or $XDG_CONFIG_HOME/gitlab-connector/config.toml)
      2. ./gitlab-connector.toml
      3. Environment variables (GITLAB_CONNECTOR_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITLAB_CONNECTOR_ACCESS_TOKEN    GitLab personal access token (required)
    GITLAB_CONNECTOR_BASE_URL        GitLab instance URL (default: https://gitlab.com/)
"#)]
struct Cli {
    /// GitLab personal access token (overrides config file and env)
    #[arg(long, global = true)]
    access_token: Option<String>,

    /// GitLab instance URL (default: https://gitlab.com/)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of resources of a kind
    Resources {
        /// Resource kind: group, project, or user
        kind: ResourceKind,

        /// Parent resource reference, e.g. "group:348/Engineering"
        /// (required meaningfully for project and user listings)
        #[arg(short, long)]
        parent: Option<String>,

        /// Continuation cursor from a previous page (empty for the first page)
        #[arg(short, long, default_value = "")]
        cursor: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Enumerate the entitlements a resource offers
    Entitlements {
        /// Resource reference, e.g. "group:348/Engineering" or "project:17"
        resource: String,

        /// Display name used in entitlement wording (defaults to the
        /// name embedded in group ids, or the raw id otherwise)
        #[arg(long)]
        display_name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List one page of the grants held against a resource
    Grants {
        /// Resource reference, e.g. "group:348/Engineering" or "project:17"
        resource: String,

        /// Display name used in entitlement wording
        #[arg(long)]
        display_name: Option<String>,

        /// Continuation cursor from a previous page (empty for the first page)
        #[arg(short, long, default_value = "")]
        cursor: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Grant a user an entitlement (add the membership)
    Grant {
        /// Entitlement id, e.g. "group:348/Engineering:Developer"
        entitlement: String,

        /// Numeric GitLab user id
        user_id: u64,
    },
    /// Revoke a user's entitlement (remove the membership)
    Revoke {
        /// Entitlement id, e.g. "group:348/Engineering:Developer"
        entitlement: String,

        /// Numeric GitLab user id
        user_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("gitlab_connector=info,gitlab_connector_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let mut config = config::Config::load();
    let cli = Cli::parse();

    // CLI flags take precedence over config file and environment.
    if let Some(token) = cli.access_token {
        config.access_token = Some(token);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let token = config.access_token()?;
    let client = GitlabClient::new(&config.base_url, token)?;
    let connector = Connector::new(Arc::new(client));

    match cli.command {
        Commands::Resources {
            kind,
            parent,
            cursor,
            output,
        } => {
            let parent = parent.as_deref().map(parse_resource_ref).transpose()?;
            commands::list::handle_resources(&connector, kind, parent.as_ref(), &cursor, output)
                .await?;
        }
        Commands::Entitlements {
            resource,
            display_name,
            output,
        } => {
            let id = parse_resource_ref(&resource)?;
            let resource = resource_stub(id, display_name);
            commands::list::handle_entitlements(&connector, &resource, output).await?;
        }
        Commands::Grants {
            resource,
            display_name,
            cursor,
            output,
        } => {
            let id = parse_resource_ref(&resource)?;
            let resource = resource_stub(id, display_name);
            commands::list::handle_grants(&connector, &resource, &cursor, output).await?;
        }
        Commands::Grant {
            entitlement,
            user_id,
        } => {
            commands::provision::handle_grant(&connector, &entitlement, user_id).await?;
        }
        Commands::Revoke {
            entitlement,
            user_id,
        } => {
            commands::provision::handle_revoke(&connector, &entitlement, user_id).await?;
        }
    }

    Ok(())
}
