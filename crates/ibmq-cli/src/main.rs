//! IBM Q Experience command-line interface.
//!
//! Manages the stored account and inspects the providers and backends it
//! grants access to.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{account, backends, providers, status};

/// IBM Q Experience account and backend tool
#[derive(Parser)]
#[command(name = "ibmq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// List the providers of the stored account
    Providers {
        #[command(flatten)]
        selector: ProviderSelector,
    },

    /// List the backends of a provider
    Backends {
        #[command(flatten)]
        selector: ProviderSelector,

        /// Only simulators
        #[arg(long, conflicts_with = "device")]
        simulator: bool,

        /// Only devices
        #[arg(long)]
        device: bool,

        /// Only operational backends
        #[arg(long)]
        operational: bool,
    },

    /// Show the live status of a backend
    Status {
        /// Backend name (display names and deprecated names are accepted)
        backend: String,

        #[command(flatten)]
        selector: ProviderSelector,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Store credentials on disk
    Save {
        /// API token
        #[arg(short, long, env = "QE_TOKEN", hide_env_values = true)]
        token: String,

        /// Authentication URL
        #[arg(short, long, default_value = ibmq_account::QX_AUTH_URL)]
        url: String,

        /// Proxy for HTTPS requests
        #[arg(long)]
        proxy_https: Option<String>,

        /// Proxy for HTTP requests
        #[arg(long)]
        proxy_http: Option<String>,

        /// Hub
        #[arg(long)]
        hub: Option<String>,

        /// Group
        #[arg(long)]
        group: Option<String>,

        /// Project
        #[arg(long)]
        project: Option<String>,

        /// Skip TLS certificate verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Show the stored credentials (token masked)
    Show,

    /// Delete the stored credentials
    Delete,
}

/// Hub/group/project selection shared by provider-scoped commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderSelector {
    /// Hub
    #[arg(long)]
    pub hub: Option<String>,

    /// Group
    #[arg(long)]
    pub group: Option<String>,

    /// Project
    #[arg(long)]
    pub project: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG overrides -v
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Account { action } => match action {
            AccountAction::Save {
                token,
                url,
                proxy_https,
                proxy_http,
                hub,
                group,
                project,
                no_verify,
            } => account::execute_save(account::SaveOptions {
                token,
                url,
                proxy_https,
                proxy_http,
                hub,
                group,
                project,
                verify: !no_verify,
            }),
            AccountAction::Show => account::execute_show(),
            AccountAction::Delete => account::execute_delete(),
        },

        Commands::Providers { selector } => providers::execute(&selector).await,

        Commands::Backends {
            selector,
            simulator,
            device,
            operational,
        } => {
            let kind = match (simulator, device) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            backends::execute(&selector, kind, operational).await
        }

        Commands::Status { backend, selector } => status::execute(&backend, &selector).await,
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
