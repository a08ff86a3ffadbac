//! Security event logging for audit trails.
//!
//! All events are emitted with `target: "security"` so they can be routed or
//! filtered separately from operational logs:
//!
//! ```bash
//! RUST_LOG=security=info
//! ```
//!
//! Passwords are never passed to these functions.

use tracing::{info, warn};

/// Log an SSH authentication attempt.
pub fn log_auth_attempt(host: &str, port: u16, username: &str) {
    info!(
        target: "security",
        event = "auth_attempt",
        host = %host,
        port = port,
        username = %username,
        method = "password",
        "SSH authentication attempt"
    );
}

pub fn log_auth_success(host: &str, port: u16, username: &str) {
    info!(
        target: "security",
        event = "auth_success",
        host = %host,
        port = port,
        username = %username,
        method = "password",
        "SSH authentication succeeded"
    );
}

pub fn log_auth_failure(host: &str, port: u16, username: &str, reason: &str) {
    warn!(
        target: "security",
        event = "auth_failure",
        host = %host,
        port = port,
        username = %username,
        method = "password",
        reason = %reason,
        "SSH authentication failed"
    );
}

/// Log an SFTP subsystem becoming ready on an authenticated connection.
pub fn log_sftp_connect(host: &str, port: u16, username: &str) {
    info!(
        target: "security",
        event = "sftp_connect",
        host = %host,
        port = port,
        username = %username,
        "SFTP connection established"
    );
}

/// Log the end of an SFTP connection. `clean` is false when teardown failed.
pub fn log_sftp_disconnect(host: &str, port: u16, clean: bool) {
    info!(
        target: "security",
        event = "sftp_disconnect",
        host = %host,
        port = port,
        clean = clean,
        "SFTP connection closed"
    );
}

/// Log a host key recorded into known_hosts on first contact.
pub fn log_host_key_learned(host: &str, port: u16, fingerprint: &str) {
    warn!(
        target: "security",
        event = "host_key_learned",
        host = %host,
        port = port,
        fingerprint = %fingerprint,
        "Learned new host key"
    );
}

pub fn log_host_key_rejected(host: &str, port: u16, fingerprint: &str, reason: &str) {
    warn!(
        target: "security",
        event = "host_key_rejected",
        host = %host,
        port = port,
        fingerprint = %fingerprint,
        reason = %reason,
        "Host key rejected"
    );
}
