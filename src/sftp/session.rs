//! Per-operation SFTP session facade

use std::path::Path;

use secrecy::SecretString;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::config::{Credentials, SessionConfig};
use crate::error::SftpError;

use super::client::SshConnector;
use super::transport::{Connection, Connector};

/// SFTP endpoint configuration with upload/download/list/delete operations.
///
/// Holds no connection. Every operation connects, performs its one action and
/// disconnects before returning, on success and on failure alike. Clones and
/// concurrent calls therefore never share a transport.
#[derive(Debug, Clone)]
pub struct SftpSession<C = SshConnector> {
    credentials: Credentials,
    config: SessionConfig,
    connector: C,
}

impl SftpSession<SshConnector> {
    /// Create a session using the russh transport.
    ///
    /// # Errors
    ///
    /// Returns `SftpError::Validation` if the configuration is unusable.
    pub fn new(credentials: Credentials, config: SessionConfig) -> Result<Self, SftpError> {
        Self::with_connector(credentials, config, SshConnector::new())
    }

    /// Create a session from raw parameters with the default configuration
    /// (20 s timeout, passive mode on, any host key accepted).
    pub fn from_params(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<SecretString>,
        port: u16,
    ) -> Result<Self, SftpError> {
        let credentials = Credentials::new(host, port, username, password)?;
        Self::new(credentials, SessionConfig::default())
    }
}

impl<C: Connector> SftpSession<C> {
    /// Create a session over a custom transport.
    pub fn with_connector(
        credentials: Credentials,
        config: SessionConfig,
        connector: C,
    ) -> Result<Self, SftpError> {
        config.validate()?;
        Ok(Self {
            credentials,
            config,
            connector,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn passive_mode(&self) -> bool {
        self.config.passive_mode
    }

    /// Upload a local file, creating or replacing `remote_path`.
    ///
    /// Returns the number of bytes written.
    pub async fn upload(
        &self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<u64, SftpError> {
        let local_path = local_path.as_ref();
        let mut conn = self.open().await?;
        let result = upload_on(&mut conn, remote_path, local_path).await;
        let bytes = self.close(conn, result).await?;

        tracing::debug!(
            "Uploaded {} to {} ({} bytes)",
            local_path.display(),
            remote_path,
            bytes
        );
        Ok(bytes)
    }

    /// Download `remote_path` into a local file.
    ///
    /// Returns `false` without touching `local_path` when the remote file does
    /// not exist. A failed transfer can leave a partial local file behind.
    pub async fn download(
        &self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<bool, SftpError> {
        let local_path = local_path.as_ref();
        let mut conn = self.open().await?;
        let result = download_on(&mut conn, remote_path, local_path).await;
        let downloaded = self.close(conn, result).await?;

        match downloaded {
            Some(bytes) => {
                tracing::debug!(
                    "Downloaded {} to {} ({} bytes)",
                    remote_path,
                    local_path.display(),
                    bytes
                );
                Ok(true)
            }
            None => {
                tracing::debug!("Remote file {} does not exist", remote_path);
                Ok(false)
            }
        }
    }

    /// List the names of all entries in a remote directory, in server order.
    pub async fn list_files(&self, remote_dir: &str) -> Result<Vec<String>, SftpError> {
        let mut conn = self.open().await?;
        let result = conn.list_directory(remote_dir).await;
        let entries = self.close(conn, result).await?;

        let names: Vec<String> = entries
            .into_iter()
            .filter(|entry| !entry.is_dot_entry())
            .map(|entry| entry.name)
            .collect();

        tracing::debug!("Listed {} entries in {}", names.len(), remote_dir);
        Ok(names)
    }

    /// Delete a remote file.
    pub async fn delete_file(&self, remote_path: &str) -> Result<(), SftpError> {
        let mut conn = self.open().await?;
        let result = conn.delete_file(remote_path).await;
        self.close(conn, result).await?;

        tracing::debug!("Deleted {}", remote_path);
        Ok(())
    }

    async fn open(&self) -> Result<C::Connection, SftpError> {
        tracing::debug!(
            "Opening SFTP connection to {} as {}",
            self.credentials.address(),
            self.credentials.username()
        );
        self.connector.connect(&self.credentials, &self.config).await
    }

    /// Disconnect and combine the teardown outcome with the action's result.
    ///
    /// A teardown failure is only returned when the action succeeded.
    async fn close<T>(
        &self,
        conn: C::Connection,
        result: Result<T, SftpError>,
    ) -> Result<T, SftpError> {
        let teardown = conn.disconnect().await;
        tracing::debug!("Closed SFTP connection to {}", self.credentials.address());

        match (result, teardown) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(teardown_err)) => Err(teardown_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(teardown_err)) => {
                tracing::warn!(
                    "Disconnect from {} failed after an earlier error: {}",
                    self.credentials.address(),
                    teardown_err
                );
                Err(err)
            }
        }
    }
}

async fn upload_on<T: Connection>(
    conn: &mut T,
    remote_path: &str,
    local_path: &Path,
) -> Result<u64, SftpError> {
    let mut local = File::open(local_path)
        .await
        .map_err(|e| SftpError::local_file(local_path, e))?;

    conn.upload_from(&mut local, remote_path).await
}

/// `None` when the remote file is absent.
async fn download_on<T: Connection>(
    conn: &mut T,
    remote_path: &str,
    local_path: &Path,
) -> Result<Option<u64>, SftpError> {
    if !conn.exists(remote_path).await? {
        return Ok(None);
    }
    if conn.is_dir(remote_path).await? {
        return Err(SftpError::Path(format!("{} is a directory", remote_path)));
    }

    let mut local = {
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            options.mode(0o600);
        }
        options
            .open(local_path)
            .await
            .map_err(|e| SftpError::local_file(local_path, e))?
    };

    let bytes = conn.download_to(remote_path, &mut local).await?;
    local
        .flush()
        .await
        .map_err(|e| SftpError::local_file(local_path, e))?;
    Ok(Some(bytes))
}
