//! Account lifecycle.
//!
//! ```text
//!                 enable_account / load_account
//!   NoAccount ───────────────────────────────────→ Enabled
//!       ↑                                             │
//!       └──────────────── disable_account ────────────┘
//! ```
//!
//! A failed transition never changes state: the URL is classified before
//! any network call, and the provider registry is only committed once
//! authentication and provider selection have succeeded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{Session, SessionAuthenticator};
use crate::credentials::{ActiveAccount, Credential, EnvCredentials, ProviderFilter};
use crate::error::{AccountError, AccountResult};
use crate::provider::AccountProvider;
use crate::registry::ProviderRegistry;
use crate::store::{CredentialStore, StoredAccount};
use crate::url::{classify_url, project_url, strip_hub_suffix};

struct ActiveSession {
    credential: Credential,
    session: Session,
    registry: ProviderRegistry,
}

enum AccountState {
    NoAccount,
    Enabled(ActiveSession),
}

/// Owner of the session's active credential.
///
/// At most one account is enabled at a time. Transitions take `&mut self`;
/// wrap the factory in a lock to share it between tasks.
pub struct AccountFactory {
    store: Arc<dyn CredentialStore>,
    authenticator: Arc<dyn SessionAuthenticator>,
    env: EnvCredentials,
    state: AccountState,
}

impl AccountFactory {
    /// Create a factory with no enabled account.
    ///
    /// `load_account` reads credentials from the process environment first
    /// and from `store` second.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        authenticator: Arc<dyn SessionAuthenticator>,
    ) -> Self {
        Self {
            store,
            authenticator,
            env: EnvCredentials::process(),
            state: AccountState::NoAccount,
        }
    }

    /// Replace the environment credential source.
    pub fn with_env(mut self, env: EnvCredentials) -> Self {
        self.env = env;
        self
    }

    /// Enable an account for this session.
    ///
    /// Returns the default provider: the one named by the credential's
    /// hub/group/project, otherwise the first in the hub catalog. An account
    /// with an empty catalog is enabled without a provider.
    pub async fn enable_account(
        &mut self,
        credential: Credential,
    ) -> AccountResult<Option<Arc<AccountProvider>>> {
        if matches!(self.state, AccountState::Enabled(_)) {
            return Err(AccountError::AlreadyEnabled);
        }
        if credential.token.trim().is_empty() {
            return Err(AccountError::EmptyToken);
        }

        let class = classify_url(&credential.url);
        if !class.is_auth() {
            return Err(AccountError::InvalidAuthUrl {
                url: credential.url.clone(),
                class,
            });
        }

        let credential = with_hub_suffix_applied(credential);

        let session = self.authenticator.authenticate(&credential).await?;
        debug!(
            "authenticated against {}: {} hubs",
            credential.url,
            session.hubs.len()
        );

        let registry = self.build_registry(&session, &credential).await?;

        let filter = credential.provider_filter();
        let provider = if filter.is_empty() {
            registry.first()
        } else {
            Some(registry.get_provider(&filter)?)
        };
        if provider.is_none() {
            warn!("No hub/group/project available for this account");
        }

        info!(
            "Enabled account for {} ({} providers)",
            credential.url,
            registry.len()
        );
        self.state = AccountState::Enabled(ActiveSession {
            credential,
            session,
            registry,
        });
        Ok(provider)
    }

    async fn build_registry(
        &self,
        session: &Session,
        credential: &Credential,
    ) -> AccountResult<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        for key in &session.hubs {
            let scoped = credential.for_provider(key, project_url(&session.urls.http, key));
            let api = self.authenticator.connect(session, &scoped).await?;
            registry.insert(AccountProvider::new(key.clone(), scoped, api));
        }
        Ok(registry)
    }

    /// Disable the enabled account and drop its providers.
    pub fn disable_account(&mut self) -> AccountResult<()> {
        match std::mem::replace(&mut self.state, AccountState::NoAccount) {
            AccountState::Enabled(active) => {
                info!("Disabled account for {}", active.credential.url);
                Ok(())
            }
            AccountState::NoAccount => Err(AccountError::NoActiveAccount),
        }
    }

    /// Token and URL of the enabled account.
    pub fn active_account(&self) -> Option<ActiveAccount> {
        match &self.state {
            AccountState::Enabled(active) => Some(ActiveAccount {
                token: active.credential.token.clone(),
                url: active.credential.url.clone(),
            }),
            AccountState::NoAccount => None,
        }
    }

    /// Session of the enabled account.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AccountState::Enabled(active) => Some(&active.session),
            AccountState::NoAccount => None,
        }
    }

    /// Persist a credential, replacing any stored one.
    pub fn save_account(&self, credential: &Credential) -> AccountResult<()> {
        if credential.token.trim().is_empty() {
            return Err(AccountError::EmptyToken);
        }
        self.store.write(&StoredAccount::from(credential))?;
        info!("Saved account credentials for {}", credential.url);
        Ok(())
    }

    /// The stored credential, if any.
    pub fn stored_account(&self) -> AccountResult<Option<Credential>> {
        Ok(self.store.read()?.map(|account| account.to_credential()))
    }

    /// Remove the stored credential. Returns whether one existed.
    pub fn delete_account(&self) -> AccountResult<bool> {
        let removed = self.store.delete()?;
        if removed {
            info!("Deleted stored account credentials");
        }
        Ok(removed)
    }

    /// Enable the account found in the environment or, failing that, in
    /// the credential store.
    pub async fn load_account(&mut self) -> AccountResult<Option<Arc<AccountProvider>>> {
        if matches!(self.state, AccountState::Enabled(_)) {
            return Err(AccountError::AlreadyEnabled);
        }

        let credential = match self.env.read() {
            Some(credential) => {
                debug!("loading account credentials from the environment");
                credential
            }
            None => self
                .stored_account()?
                .ok_or(AccountError::NoStoredAccount)?,
        };
        self.enable_account(credential).await
    }

    /// Providers of the enabled account matching `filter`.
    pub fn providers(&self, filter: &ProviderFilter) -> Vec<Arc<AccountProvider>> {
        match &self.state {
            AccountState::Enabled(active) => active.registry.providers(filter),
            AccountState::NoAccount => Vec::new(),
        }
    }

    /// The single provider matching `filter`.
    pub fn get_provider(&self, filter: &ProviderFilter) -> AccountResult<Arc<AccountProvider>> {
        match &self.state {
            AccountState::Enabled(active) => active.registry.get_provider(filter),
            AccountState::NoAccount => Err(AccountError::ProviderNotFound(filter.to_string())),
        }
    }
}

/// Move a `/Hubs/<h>/Groups/<g>/Projects/<p>` URL suffix into the
/// credential's provider fields. Fields already set on the credential win.
fn with_hub_suffix_applied(mut credential: Credential) -> Credential {
    let Some((base, key)) = strip_hub_suffix(&credential.url) else {
        return credential;
    };
    debug!("authentication URL names provider {key}");
    credential.url = base;
    if credential.hub.is_none() && credential.group.is_none() && credential.project.is_none() {
        credential.hub = Some(key.hub);
        credential.group = Some(key.group);
        credential.project = Some(key.project);
    }
    credential
}

impl std::fmt::Debug for AccountFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountFactory")
            .field("active_account", &self.active_account())
            .field("providers", &self.providers(&ProviderFilter::any()).len())
            .finish_non_exhaustive()
    }
}
