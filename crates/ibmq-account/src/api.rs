//! Provider-scoped service interface and its data types.
//!
//! [`ProviderApi`] is the seam between the account core and the transport.
//! The HTTPS adapter implements it against the remote service; tests use
//! in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Static configuration of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    /// Canonical backend name.
    pub backend_name: String,
    /// Backend version.
    #[serde(default)]
    pub backend_version: String,
    /// Number of qubits.
    #[serde(default)]
    pub n_qubits: usize,
    /// Basis gates.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Coupling map (pairs of connected qubits).
    #[serde(default)]
    pub coupling_map: Option<Vec<[usize; 2]>>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Whether the backend runs locally.
    #[serde(default)]
    pub local: bool,
    /// Whether the backend accepts pulse schedules.
    #[serde(default)]
    pub open_pulse: bool,
    /// Whether conditional operations are supported.
    #[serde(default)]
    pub conditional: bool,
    /// Whether per-shot memory is supported.
    #[serde(default)]
    pub memory: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
    /// Maximum number of experiments per job.
    #[serde(default)]
    pub max_experiments: Option<u32>,
    /// Remaining fields, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfiguration {
    /// Minimal configuration for a named backend.
    pub fn new(backend_name: impl Into<String>, n_qubits: usize) -> Self {
        Self {
            backend_name: backend_name.into(),
            backend_version: String::new(),
            n_qubits,
            basis_gates: Vec::new(),
            coupling_map: None,
            simulator: false,
            local: false,
            open_pulse: false,
            conditional: false,
            memory: false,
            max_shots: None,
            max_experiments: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Mark the backend as a simulator.
    pub fn simulator(mut self) -> Self {
        self.simulator = true;
        self
    }

    /// Mark the backend as pulse-enabled.
    pub fn with_open_pulse(mut self) -> Self {
        self.open_pulse = true;
        self
    }
}

/// Live status of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend name.
    pub backend_name: String,
    /// Backend version.
    pub backend_version: String,
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Jobs waiting in the queue.
    pub pending_jobs: u32,
    /// Status message.
    pub status_msg: String,
}

/// Calibration properties of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperties {
    /// Backend name.
    pub backend_name: String,
    /// Backend version.
    #[serde(default)]
    pub backend_version: String,
    /// When the properties were last updated.
    pub last_update_date: DateTime<Utc>,
    /// Per-qubit parameters.
    #[serde(default)]
    pub qubits: Vec<serde_json::Value>,
    /// Per-gate parameters.
    #[serde(default)]
    pub gates: Vec<serde_json::Value>,
    /// Device-wide parameters.
    #[serde(default)]
    pub general: Vec<serde_json::Value>,
}

/// Pulse defaults of a pulse-enabled device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseDefaults {
    /// Estimated qubit frequencies (GHz).
    #[serde(default)]
    pub qubit_freq_est: Vec<f64>,
    /// Estimated measurement frequencies (GHz).
    #[serde(default)]
    pub meas_freq_est: Vec<f64>,
    /// Samples between pulses.
    #[serde(default)]
    pub buffer: Option<u32>,
    /// Pulse library.
    #[serde(default)]
    pub pulse_library: Vec<serde_json::Value>,
    /// Command definitions.
    #[serde(default)]
    pub cmd_def: Vec<serde_json::Value>,
}

/// Compiled job payload (a Qobj). Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPayload(pub serde_json::Value);

impl JobPayload {
    /// Wrap a JSON document.
    pub fn new(qobj: serde_json::Value) -> Self {
        Self(qobj)
    }

    /// The payload header, if present.
    pub fn header(&self) -> Option<&serde_json::Value> {
        self.0.get("header")
    }
}

/// Job record as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Job ID.
    pub id: String,
    /// Raw service status (e.g. `QUEUED`, `COMPLETED`, `ERROR_RUNNING_JOB`).
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Provider-scoped service operations.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Configurations of every backend visible to the provider.
    async fn list_backends(&self) -> Result<Vec<BackendConfiguration>, TransportError>;

    /// Live status of a backend.
    async fn backend_status(&self, backend: &str) -> Result<BackendStatus, TransportError>;

    /// Latest properties, or the latest not newer than `as_of`.
    ///
    /// `None` when the service has no properties for the backend.
    async fn backend_properties(
        &self,
        backend: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<BackendProperties>, TransportError>;

    /// Pulse defaults, if the service has any for the backend.
    async fn backend_defaults(&self, backend: &str)
    -> Result<Option<PulseDefaults>, TransportError>;

    /// Submit a payload to a backend.
    async fn submit_job(
        &self,
        backend: &str,
        payload: &JobPayload,
    ) -> Result<JobInfo, TransportError>;

    /// Current job record.
    async fn job_status(&self, job_id: &str) -> Result<JobInfo, TransportError>;

    /// Result document of a completed job.
    async fn job_result(&self, job_id: &str) -> Result<serde_json::Value, TransportError>;

    /// Cancel a job.
    async fn cancel_job(&self, job_id: &str) -> Result<(), TransportError>;
}
