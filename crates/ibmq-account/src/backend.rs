//! Remote backends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::{
    BackendConfiguration, BackendProperties, BackendStatus, JobPayload, ProviderApi,
    PulseDefaults,
};
use crate::error::AccountResult;
use crate::job::RemoteJob;

/// A backend reachable through a provider.
#[derive(Clone)]
pub struct RemoteBackend {
    configuration: BackendConfiguration,
    api: Arc<dyn ProviderApi>,
}

impl RemoteBackend {
    /// Wrap a backend configuration.
    pub fn new(configuration: BackendConfiguration, api: Arc<dyn ProviderApi>) -> Self {
        Self { configuration, api }
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.configuration.backend_name
    }

    /// Static configuration.
    pub fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    /// Whether this is a simulator.
    pub fn is_simulator(&self) -> bool {
        self.configuration.simulator
    }

    /// Live status.
    pub async fn status(&self) -> AccountResult<BackendStatus> {
        Ok(self.api.backend_status(self.name()).await?)
    }

    /// Calibration properties.
    ///
    /// Simulators have none. With `as_of`, returns the latest properties not
    /// newer than that instant.
    pub async fn properties(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> AccountResult<Option<BackendProperties>> {
        if self.is_simulator() {
            return Ok(None);
        }
        Ok(self.api.backend_properties(self.name(), as_of).await?)
    }

    /// Pulse defaults, only for pulse-enabled backends.
    pub async fn defaults(&self) -> AccountResult<Option<PulseDefaults>> {
        if !self.configuration.open_pulse {
            return Ok(None);
        }
        Ok(self.api.backend_defaults(self.name()).await?)
    }

    /// Submit a payload.
    pub async fn run(&self, payload: &JobPayload) -> AccountResult<RemoteJob> {
        let info = self.api.submit_job(self.name(), payload).await?;
        debug!("submitted job {} to {}", info.id, self.name());
        Ok(RemoteJob::new(info, self.name(), Arc::clone(&self.api)))
    }
}

impl PartialEq for RemoteBackend {
    fn eq(&self, other: &Self) -> bool {
        self.configuration.backend_name == other.configuration.backend_name
            && self.configuration.backend_version == other.configuration.backend_version
    }
}

impl std::fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("name", &self.configuration.backend_name)
            .field("simulator", &self.configuration.simulator)
            .field("n_qubits", &self.configuration.n_qubits)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for RemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
