use std::future::Future;

use russh::client::Handler;
use russh::keys::PublicKey;

use crate::config::HostKeyPolicy;
use crate::error::SshError;
use crate::security_log;

use super::known_hosts::{HostKeyStatus, KnownHosts};

/// SSH client handler that applies the session's host key policy
pub struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl ClientHandler {
    pub fn new(host: String, port: u16, policy: HostKeyPolicy) -> Self {
        Self { host, port, policy }
    }
}

/// Decide whether to trust `key`, learning it when the policy allows.
pub(crate) fn verify_host_key(
    policy: &HostKeyPolicy,
    host: &str,
    port: u16,
    key: &PublicKey,
) -> Result<bool, SshError> {
    let (path, learn_unknown) = match policy {
        HostKeyPolicy::AcceptAny => {
            tracing::debug!(
                "Accepting host key {} for {}:{} without verification",
                KnownHosts::fingerprint(key),
                host,
                port
            );
            return Ok(true);
        }
        HostKeyPolicy::KnownHosts {
            path,
            learn_unknown,
        } => (path, *learn_unknown),
    };

    let known_hosts = KnownHosts::new(path);
    match known_hosts.check(host, port, key)? {
        HostKeyStatus::Known => {
            tracing::debug!("Host key verified for {}:{}", host, port);
            Ok(true)
        }
        HostKeyStatus::Unknown { fingerprint, .. } if learn_unknown => {
            known_hosts.learn(host, port, key)?;
            security_log::log_host_key_learned(host, port, &fingerprint);
            Ok(true)
        }
        HostKeyStatus::Unknown {
            fingerprint,
            key_type,
        } => {
            security_log::log_host_key_rejected(host, port, &fingerprint, "unknown host");
            Err(SshError::HostKeyVerification(format!(
                "No known_hosts entry for {}:{} ({} {})",
                host, port, key_type, fingerprint
            )))
        }
        HostKeyStatus::Changed {
            line,
            fingerprint,
            key_type,
        } => {
            security_log::log_host_key_rejected(host, port, &fingerprint, "key changed");
            Err(SshError::HostKeyVerification(format!(
                "{} host key for {}:{} ({}) does not match {} line {}",
                key_type,
                host,
                port,
                fingerprint,
                known_hosts.path().display(),
                line
            )))
        }
    }
}

impl Handler for ClientHandler {
    type Error = SshError;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        let host = self.host.clone();
        let port = self.port;
        let policy = self.policy.clone();
        let key = server_public_key.clone();

        async move {
            tokio::task::spawn_blocking(move || verify_host_key(&policy, &host, port, &key))
                .await
                .map_err(|e| {
                    SshError::HostKeyVerification(format!("Host key check failed: {}", e))
                })?
        }
    }
}
