//! Shared helpers for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use ibmq_account::{AccountFactory, AccountProvider, FileCredentialStore, ProviderFilter};
use ibmq_adapter_http::HttpAuthenticator;

use crate::ProviderSelector;

/// Create a factory over the default credential store and the HTTPS
/// transport.
pub fn open_factory() -> Result<AccountFactory> {
    let store = FileCredentialStore::at_default_location()
        .context("Failed to locate the credential store")?;
    debug!("Using account file {}", store.path().display());
    Ok(AccountFactory::new(
        Arc::new(store),
        Arc::new(HttpAuthenticator::new()),
    ))
}

/// Provider filter from command-line flags.
pub fn provider_filter(selector: &ProviderSelector) -> ProviderFilter {
    ProviderFilter {
        hub: selector.hub.clone(),
        group: selector.group.clone(),
        project: selector.project.clone(),
    }
}

/// Start a spinner with `message`.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load the stored account.
pub async fn load_account() -> Result<AccountFactory> {
    let mut factory = open_factory()?;

    let spinner = spinner("Authenticating...");
    let loaded = factory.load_account().await;
    spinner.finish_and_clear();
    loaded?;

    Ok(factory)
}

/// Load the stored account and select a provider.
///
/// Without a selection, the account's default provider is used.
pub async fn load_provider(
    selector: &ProviderSelector,
) -> Result<(AccountFactory, Arc<AccountProvider>)> {
    let mut factory = open_factory()?;

    let spinner = spinner("Authenticating...");
    let loaded = factory.load_account().await;
    spinner.finish_and_clear();
    let default = loaded?;

    let filter = provider_filter(selector);
    let provider = if filter.is_empty() {
        default.ok_or_else(|| anyhow::anyhow!("The account has no providers"))?
    } else {
        factory.get_provider(&filter)?
    };
    Ok((factory, provider))
}

/// Mask all but the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefghijkl"), "********ijkl");
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_provider_filter_from_selector() {
        let selector = ProviderSelector {
            hub: Some("ibm-q".into()),
            group: None,
            project: Some("main".into()),
        };
        let filter = provider_filter(&selector);
        assert_eq!(filter, ProviderFilter::any().hub("ibm-q").project("main"));
        assert!(provider_filter(&ProviderSelector::default()).is_empty());
    }
}
