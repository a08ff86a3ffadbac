use std::path::{Path, PathBuf};

use russh::keys::{self, HashAlg, PublicKey};

use crate::error::SshError;

/// Result of checking a host key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyStatus {
    /// Key matches a stored key
    Known,
    /// No entry for this host
    Unknown {
        fingerprint: String,
        key_type: String,
    },
    /// Host is listed with a different key (potential MITM)
    Changed {
        line: usize,
        fingerprint: String,
        key_type: String,
    },
}

/// A single OpenSSH known_hosts file
#[derive(Debug, Clone)]
pub struct KnownHosts {
    path: PathBuf,
}

impl KnownHosts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the SHA-256 fingerprint of a public key
    pub fn fingerprint(key: &PublicKey) -> String {
        key.fingerprint(HashAlg::Sha256).to_string()
    }

    /// Check a server key against the file. A missing file knows no hosts.
    pub fn check(&self, host: &str, port: u16, key: &PublicKey) -> Result<HostKeyStatus, SshError> {
        let fingerprint = Self::fingerprint(key);
        let key_type = key.algorithm().as_str().to_string();

        if !self.path.exists() {
            return Ok(HostKeyStatus::Unknown {
                fingerprint,
                key_type,
            });
        }

        let entries = keys::known_hosts::known_host_keys_path(host, port, &self.path)
            .map_err(|e| {
                SshError::HostKeyVerification(format!(
                    "Failed to read known_hosts {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        if entries.iter().any(|(_, known)| known == key) {
            return Ok(HostKeyStatus::Known);
        }

        match entries.first() {
            Some((line, _)) => Ok(HostKeyStatus::Changed {
                line: *line,
                fingerprint,
                key_type,
            }),
            None => Ok(HostKeyStatus::Unknown {
                fingerprint,
                key_type,
            }),
        }
    }

    /// Append a host key to the file, creating it if needed
    pub fn learn(&self, host: &str, port: u16, key: &PublicKey) -> Result<(), SshError> {
        keys::known_hosts::learn_known_hosts_path(host, port, key, &self.path).map_err(|e| {
            SshError::HostKeyVerification(format!(
                "Failed to write known_hosts {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
