//! Providers command implementation.

use anyhow::Result;
use console::style;

use super::common::{load_account, provider_filter};
use crate::ProviderSelector;

/// Execute the providers command.
pub async fn execute(selector: &ProviderSelector) -> Result<()> {
    let factory = load_account().await?;
    let filter = provider_filter(selector);
    let providers = factory.providers(&filter);

    if let Some(account) = factory.active_account() {
        println!(
            "{} Account enabled at {}\n",
            style("→").cyan().bold(),
            style(&account.url).yellow()
        );
    }

    if providers.is_empty() {
        println!("No providers match {filter}.");
        return Ok(());
    }

    println!(
        "  {:<20}  {:<20}  {}",
        style("HUB").bold(),
        style("GROUP").bold(),
        style("PROJECT").bold()
    );
    println!("  {}", "-".repeat(60));

    for provider in &providers {
        let key = provider.key();
        println!("  {:<20}  {:<20}  {}", key.hub, key.group, key.project);
    }

    println!("\n  {} provider(s)", providers.len());
    Ok(())
}
