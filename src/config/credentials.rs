use secrecy::{ExposeSecret, SecretString};

use crate::validation::{self, ValidationError};

/// Address and password login for one SFTP endpoint.
///
/// Immutable once built. The password only leaves its `SecretString` at the
/// point of authentication and is redacted from `Debug` output.
pub struct Credentials {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Build validated credentials.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty or malformed host, port 0, or a
    /// username containing control characters.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Result<Self, ValidationError> {
        let host = host.into().trim().to_string();
        let username = username.into();

        validation::validate_hostname(&host)?;
        validation::validate_port(port)?;
        validation::validate_username(&username)?;

        Ok(Self {
            host,
            port,
            username,
            password: password.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// `host:port`, bracketing IPv6 literals
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
