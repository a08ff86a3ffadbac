use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Default timeout handed to the transport, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// How server host keys are checked during the SSH handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostKeyPolicy {
    /// Accept any host key
    #[default]
    AcceptAny,
    /// Verify against an OpenSSH known_hosts file
    KnownHosts {
        path: PathBuf,
        /// Record keys of hosts not yet in the file instead of rejecting them
        #[serde(default)]
        learn_unknown: bool,
    },
}

/// Per-session settings shared by every operation of an `SftpSession`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Connect, handshake and inactivity timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Kept for callers migrating from FTP clients; SFTP has no passive mode
    #[serde(default = "default_true")]
    pub passive_mode: bool,
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            passive_mode: true,
            host_key_policy: HostKeyPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_passive_mode(mut self, passive_mode: bool) -> Self {
        self.passive_mode = passive_mode;
        self
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Reject settings no connection attempt could succeed with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError {
                field: "timeout".to_string(),
                message: "Timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
