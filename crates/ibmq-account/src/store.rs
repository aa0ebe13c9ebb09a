//! Credential persistence.
//!
//! A store holds at most one account record. The file-backed store writes a
//! YAML document with a single `ibmq` section:
//!
//! ```yaml
//! ibmq:
//!   token: <token>
//!   url: https://auth.quantum-computing.ibm.com/api
//!   proxies:
//!     urls:
//!       https: https://proxy.example.com:8080
//!   verify: true
//! ```

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::credentials::{Credential, ProxyConfiguration};
use crate::error::AccountResult;

/// Environment variable overriding the store location.
pub const ENV_ACCOUNT_RC: &str = "IBMQ_ACCOUNT_RC";

/// On-disk representation of an account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAccount {
    /// API token.
    pub token: String,
    /// Authentication URL.
    pub url: String,
    /// Proxy settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxies: Option<ProxyConfiguration>,
    /// Hub name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<String>,
    /// Group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Verify TLS certificates.
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

impl StoredAccount {
    /// Rebuild the credential this record was saved from.
    pub fn to_credential(&self) -> Credential {
        Credential {
            token: self.token.clone(),
            url: self.url.clone(),
            proxies: self.proxies.clone(),
            hub: self.hub.clone(),
            group: self.group.clone(),
            project: self.project.clone(),
            verify: self.verify,
        }
    }
}

impl From<&Credential> for StoredAccount {
    fn from(credential: &Credential) -> Self {
        Self {
            token: credential.token.clone(),
            url: credential.url.clone(),
            proxies: credential.proxies.clone(),
            hub: credential.hub.clone(),
            group: credential.group.clone(),
            project: credential.project.clone(),
            verify: credential.verify,
        }
    }
}

impl fmt::Debug for StoredAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAccount")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .field("proxies", &self.proxies)
            .field("hub", &self.hub)
            .field("group", &self.group)
            .field("project", &self.project)
            .field("verify", &self.verify)
            .finish()
    }
}

/// Persistence for a single account record.
pub trait CredentialStore: Send + Sync {
    /// Write the record, replacing any previous one.
    fn write(&self, account: &StoredAccount) -> AccountResult<()>;

    /// Read the record, if any.
    fn read(&self) -> AccountResult<Option<StoredAccount>>;

    /// Remove the record. Returns whether one existed.
    fn delete(&self) -> AccountResult<bool>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ibmq: Option<StoredAccount>,
}

/// YAML file store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default location.
    pub fn at_default_location() -> AccountResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// `$IBMQ_ACCOUNT_RC`, or `~/.ibmq/accountrc.yaml`.
    pub fn default_path() -> AccountResult<PathBuf> {
        if let Ok(path) = std::env::var(ENV_ACCOUNT_RC) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            )
        })?;
        Ok(home.join(".ibmq").join("accountrc.yaml"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn write(&self, account: &StoredAccount) -> AccountResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = AccountFile {
            ibmq: Some(account.clone()),
        };
        let yaml = serde_yaml_ng::to_string(&file)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options.open(&self.path)?;

        // An existing file keeps its mode on open.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            out.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        out.write_all(yaml.as_bytes())?;

        tracing::debug!("stored account credentials in {}", self.path.display());
        Ok(())
    }

    fn read(&self) -> AccountResult<Option<StoredAccount>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let file: AccountFile = serde_yaml_ng::from_str(&content)?;
        Ok(file.ibmq)
    }

    fn delete(&self) -> AccountResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("removed stored credentials {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    account: RwLock<Option<StoredAccount>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn write(&self, account: &StoredAccount) -> AccountResult<()> {
        let mut slot = self.account.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(account.clone());
        Ok(())
    }

    fn read(&self) -> AccountResult<Option<StoredAccount>> {
        let slot = self.account.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn delete(&self) -> AccountResult<bool> {
        let mut slot = self.account.write().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.take().is_some())
    }
}
