//! Status command implementation.
//!
//! Query the live status of a backend.

use anyhow::Result;
use console::style;

use super::common::{load_provider, spinner};
use crate::ProviderSelector;

/// Execute the status command.
pub async fn execute(backend: &str, selector: &ProviderSelector) -> Result<()> {
    let (_factory, provider) = load_provider(selector).await?;

    let spinner = spinner(format!("Querying {backend}..."));
    let status = async {
        let backend = provider.get_backend(backend).await?;
        let status = backend.status().await?;
        Ok::<_, ibmq_account::AccountError>((backend, status))
    }
    .await;
    spinner.finish_and_clear();
    let (backend, status) = status?;

    let state = if status.operational {
        style("operational").green()
    } else {
        style("offline").red()
    };

    println!(
        "{} {} ({})",
        style("→").cyan().bold(),
        style(backend.name()).bold(),
        state
    );
    if !status.backend_version.is_empty() {
        println!("  Version: {}", status.backend_version);
    }
    println!("  Pending jobs: {}", style(status.pending_jobs).yellow());
    if !status.status_msg.is_empty() {
        println!("  Message: {}", status.status_msg);
    }

    Ok(())
}
