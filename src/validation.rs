//! Input validation for connection parameters.
//!
//! Runs once when [`Credentials`](crate::config::Credentials) are built so
//! that malformed hosts and ports are rejected before any network activity.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Validation error with field context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

static DNS_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]([a-zA-Z0-9_-]{0,61}[a-zA-Z0-9_])?$").unwrap());

/// Longest username accepted; OpenSSH servers reject anything near this anyway.
const MAX_USERNAME_LEN: usize = 256;

/// Validate a hostname (DNS name or IP address).
///
/// Accepts IPv4 and IPv6 literals and RFC 1123 DNS hostnames. Underscores are
/// allowed in labels since resolvers (and container service names) use them.
///
/// # Errors
///
/// Returns `ValidationError` if the hostname is empty, too long, or malformed.
pub fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    let hostname = hostname.trim();

    if hostname.is_empty() {
        return Err(ValidationError::new("hostname", "Hostname is required"));
    }

    // DNS max is 253 characters
    if hostname.len() > 253 {
        return Err(ValidationError::new(
            "hostname",
            "Hostname exceeds maximum length of 253 characters",
        ));
    }

    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    validate_dns_hostname(hostname)
}

fn validate_dns_hostname(hostname: &str) -> Result<(), ValidationError> {
    // A trailing dot marks a fully-qualified name
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);

    for label in hostname.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(ValidationError::new(
                "hostname",
                "Hostname labels must be 1-63 characters",
            ));
        }

        if !DNS_LABEL_REGEX.is_match(label) {
            return Err(ValidationError::new(
                "hostname",
                format!(
                    "Invalid hostname label '{}': must start and end with alphanumeric or underscore, may contain hyphens",
                    label
                ),
            ));
        }
    }

    Ok(())
}

/// Validate a port number.
///
/// # Errors
///
/// Returns `ValidationError` for port 0.
pub fn validate_port(port: u16) -> Result<u16, ValidationError> {
    if port == 0 {
        return Err(ValidationError::new(
            "port",
            "Port must be between 1 and 65535",
        ));
    }
    Ok(port)
}

/// Parse and validate a port number given as text.
///
/// # Errors
///
/// Returns `ValidationError` if the string is not a number in range 1-65535.
pub fn parse_port(port_str: &str) -> Result<u16, ValidationError> {
    let port_str = port_str.trim();

    match port_str.parse::<u16>() {
        Ok(port) => validate_port(port),
        Err(_) => Err(ValidationError::new(
            "port",
            format!("Invalid port number: '{}'", port_str),
        )),
    }
}

/// Validate a username for SFTP connections.
///
/// Empty usernames are accepted since some servers allow anonymous access.
/// Spaces are allowed (Windows OpenSSH accounts); control characters are not.
///
/// # Errors
///
/// Returns `ValidationError` if the username is too long or contains
/// characters no SSH server accepts.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Ok(());
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(ValidationError::new(
            "username",
            format!(
                "Username exceeds maximum length of {} characters",
                MAX_USERNAME_LEN
            ),
        ));
    }

    if username.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "username",
            "Username must not contain control characters",
        ));
    }

    Ok(())
}
