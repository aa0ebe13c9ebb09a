//! Account command implementation.
//!
//! Save, show and delete the credentials kept in the account file.

use anyhow::Result;
use console::style;

use ibmq_account::{Credential, ProxyConfiguration, classify_url};

use super::common::{mask_token, open_factory};

/// Options of `ibmq account save`.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub token: String,
    pub url: String,
    pub proxy_https: Option<String>,
    pub proxy_http: Option<String>,
    pub hub: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
    pub verify: bool,
}

impl SaveOptions {
    /// Build the credential to store.
    pub fn credential(&self) -> Credential {
        let mut credential = Credential::new(&self.token, &self.url).with_verify(self.verify);

        let mut proxies = ProxyConfiguration::new();
        if let Some(url) = &self.proxy_https {
            proxies = proxies.with_url("https", url);
        }
        if let Some(url) = &self.proxy_http {
            proxies = proxies.with_url("http", url);
        }
        if !proxies.is_empty() {
            credential = credential.with_proxies(proxies);
        }

        credential.hub = self.hub.clone();
        credential.group = self.group.clone();
        credential.project = self.project.clone();
        credential
    }
}

/// Execute the account save subcommand.
pub fn execute_save(options: SaveOptions) -> Result<()> {
    let factory = open_factory()?;
    let credential = options.credential();

    let class = classify_url(&credential.url);
    if !class.is_auth() {
        println!(
            "{} {} is not an auth URL ({}); the account can be saved but not enabled",
            style("!").yellow().bold(),
            credential.url,
            class
        );
    }

    factory.save_account(&credential)?;

    println!("{} Account saved", style("✓").green().bold());
    println!("  URL:   {}", style(&credential.url).yellow());
    println!("  Token: {}", mask_token(&credential.token));
    Ok(())
}

/// Execute the account show subcommand.
pub fn execute_show() -> Result<()> {
    let factory = open_factory()?;

    let Some(credential) = factory.stored_account()? else {
        println!("No stored account.");
        println!(
            "  Run {} to store one.",
            style("ibmq account save --token <token>").dim()
        );
        return Ok(());
    };

    println!("{} Stored account:\n", style("→").cyan().bold());
    println!("  URL:     {}", style(&credential.url).yellow());
    println!("  Token:   {}", mask_token(&credential.token));
    if let Some(key) = credential.provider_key() {
        println!("  Provider: {}", style(key).green());
    } else {
        for (name, value) in [
            ("Hub", &credential.hub),
            ("Group", &credential.group),
            ("Project", &credential.project),
        ] {
            if let Some(value) = value {
                println!("  {name}: {}", style(value).green());
            }
        }
    }
    if let Some(proxies) = &credential.proxies {
        for (scheme, url) in &proxies.urls {
            println!("  Proxy ({scheme}): {url}");
        }
    }
    if !credential.verify {
        println!("  TLS verification: {}", style("disabled").red());
    }
    Ok(())
}

/// Execute the account delete subcommand.
pub fn execute_delete() -> Result<()> {
    let factory = open_factory()?;

    if factory.delete_account()? {
        println!("{} Stored account deleted", style("✓").green().bold());
    } else {
        println!("No stored account.");
    }
    Ok(())
}
