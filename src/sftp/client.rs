//! russh-backed SFTP transport

use std::sync::Arc;
use std::time::Duration;

use russh::Disconnect;
use russh::client::{self, Config};
use russh_sftp::client::SftpSession as RusshSftpSession;
use russh_sftp::client::error::Error as RusshSftpError;
use russh_sftp::protocol::{OpenFlags, StatusCode};
use secrecy::ExposeSecret;
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::{Credentials, SessionConfig};
use crate::error::SftpError;
use crate::security_log;
use crate::ssh::ClientHandler;

use super::transport::{Connection, Connector};
use super::types::RemoteEntry;

/// Connects to SFTP servers over russh with password authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl SshConnector {
    pub fn new() -> Self {
        Self
    }

    /// Handshake, authenticate and start the SFTP subsystem on a TCP stream
    async fn establish_sftp_session(
        &self,
        credentials: &Credentials,
        config: &SessionConfig,
        stream: TcpStream,
    ) -> Result<SshConnection, SftpError> {
        let host = credentials.host();
        let port = credentials.port();

        let russh_config = Config {
            inactivity_timeout: Some(config.timeout()),
            ..Default::default()
        };

        let handler = ClientHandler::new(host.to_string(), port, config.host_key_policy.clone());

        let mut handle = client::connect_stream(Arc::new(russh_config), stream, handler)
            .await
            .map_err(|e| {
                SftpError::Connection(format!(
                    "SSH handshake failed for {}: {}",
                    credentials.address(),
                    e
                ))
            })?;

        match open_sftp(&mut handle, credentials).await {
            Ok(sftp) => {
                sftp.set_timeout(request_timeout_secs(config.timeout())).await;
                security_log::log_sftp_connect(host, port, credentials.username());
                Ok(SshConnection {
                    handle,
                    sftp,
                    host: host.to_string(),
                    port,
                })
            }
            Err(e) => {
                // The SSH session is up; close it before reporting the failure
                if let Err(close_err) = handle
                    .disconnect(Disconnect::ByApplication, "", "en")
                    .await
                {
                    tracing::debug!(
                        "Failed to close SSH session after setup error: {}",
                        close_err
                    );
                }
                Err(e)
            }
        }
    }
}

impl Connector for SshConnector {
    type Connection = SshConnection;

    async fn connect(
        &self,
        credentials: &Credentials,
        config: &SessionConfig,
    ) -> Result<SshConnection, SftpError> {
        let addr = credentials.address();
        let connection_timeout = config.timeout();

        tracing::debug!("Connecting to {} (timeout {:?})", addr, connection_timeout);

        let stream = timeout(
            connection_timeout,
            TcpStream::connect((credentials.host(), credentials.port())),
        )
        .await
        .map_err(|_| SftpError::Connection(format!("Connection timed out to {}", addr)))?
        .map_err(|e| SftpError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        match timeout(
            connection_timeout,
            self.establish_sftp_session(credentials, config, stream),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SftpError::Connection(format!(
                "SFTP session setup timed out for {}",
                addr
            ))),
        }
    }
}

async fn open_sftp(
    handle: &mut client::Handle<ClientHandler>,
    credentials: &Credentials,
) -> Result<RusshSftpSession, SftpError> {
    authenticate(handle, credentials).await?;

    let channel = handle
        .channel_open_session()
        .await
        .map_err(|e| SftpError::Connection(format!("Failed to open channel: {}", e)))?;

    channel
        .request_subsystem(false, "sftp")
        .await
        .map_err(|e| {
            SftpError::Connection(format!("Failed to request SFTP subsystem: {}", e))
        })?;

    RusshSftpSession::new(channel.into_stream())
        .await
        .map_err(|e| SftpError::Connection(format!("Failed to initialize SFTP session: {}", e)))
}

async fn authenticate(
    handle: &mut client::Handle<ClientHandler>,
    credentials: &Credentials,
) -> Result<(), SftpError> {
    let host = credentials.host();
    let port = credentials.port();
    let username = credentials.username();

    security_log::log_auth_attempt(host, port, username);

    // Use expose_secret() only at the point of authentication
    let auth_result = match handle
        .authenticate_password(username, credentials.password().expose_secret())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            let reason = format!("Password auth failed: {}", e);
            security_log::log_auth_failure(host, port, username, &reason);
            return Err(SftpError::Connection(reason));
        }
    };

    if !auth_result.success() {
        let reason = "Authentication rejected by server";
        security_log::log_auth_failure(host, port, username, reason);
        return Err(SftpError::Connection(reason.to_string()));
    }

    security_log::log_auth_success(host, port, username);
    Ok(())
}

/// Whole seconds for russh-sftp's per-request timeout, rounded up
fn request_timeout_secs(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 || secs == 0 {
        secs + 1
    } else {
        secs
    }
}

/// Map an SFTP protocol error, treating "no such file" as a path error
fn map_sftp_error(action: &str, path: &str, err: RusshSftpError) -> SftpError {
    if is_not_found(&err) {
        return SftpError::Path(format!("{} does not exist", path));
    }
    SftpError::Transfer(format!("Failed to {} {}: {}", action, path, err))
}

fn is_not_found(err: &RusshSftpError) -> bool {
    matches!(
        err,
        RusshSftpError::Status(status) if status.status_code == StatusCode::NoSuchFile
    )
}

/// Authenticated SSH connection with an SFTP channel open
pub struct SshConnection {
    handle: client::Handle<ClientHandler>,
    sftp: RusshSftpSession,
    host: String,
    port: u16,
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl Connection for SshConnection {
    async fn exists(&mut self, path: &str) -> Result<bool, SftpError> {
        self.sftp
            .try_exists(path.to_string())
            .await
            .map_err(|e| map_sftp_error("check", path, e))
    }

    async fn is_dir(&mut self, path: &str) -> Result<bool, SftpError> {
        let metadata = self
            .sftp
            .metadata(path.to_string())
            .await
            .map_err(|e| map_sftp_error("stat", path, e))?;
        Ok(metadata.is_dir())
    }

    async fn download_to<W>(&mut self, remote_path: &str, sink: &mut W) -> Result<u64, SftpError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut remote = self
            .sftp
            .open(remote_path.to_string())
            .await
            .map_err(|e| map_sftp_error("open", remote_path, e))?;

        io::copy(&mut remote, sink).await.map_err(|e| {
            SftpError::Transfer(format!("Failed to download {}: {}", remote_path, e))
        })
    }

    async fn upload_from<R>(&mut self, source: &mut R, remote_path: &str) -> Result<u64, SftpError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut remote = self
            .sftp
            .open_with_flags(
                remote_path.to_string(),
                OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            )
            .await
            .map_err(|e| map_sftp_error("open", remote_path, e))?;

        let bytes = io::copy(source, &mut remote).await.map_err(|e| {
            SftpError::Transfer(format!("Failed to upload to {}: {}", remote_path, e))
        })?;

        // Closing the handle waits for outstanding writes to be acknowledged
        remote.shutdown().await.map_err(|e| {
            SftpError::Transfer(format!("Failed to finish upload to {}: {}", remote_path, e))
        })?;

        Ok(bytes)
    }

    async fn list_directory(&mut self, path: &str) -> Result<Vec<RemoteEntry>, SftpError> {
        if !self.is_dir(path).await? {
            return Err(SftpError::Path(format!("{} is not a directory", path)));
        }

        let read_dir = self
            .sftp
            .read_dir(path.to_string())
            .await
            .map_err(|e| map_sftp_error("read directory", path, e))?;

        Ok(read_dir
            .map(|entry| {
                let metadata = entry.metadata();
                RemoteEntry {
                    name: entry.file_name(),
                    is_dir: metadata.is_dir(),
                    size: metadata.size,
                }
            })
            .collect())
    }

    async fn delete_file(&mut self, path: &str) -> Result<(), SftpError> {
        // Do not follow symlinks: removing a link to a directory is allowed
        let metadata = self
            .sftp
            .symlink_metadata(path.to_string())
            .await
            .map_err(|e| map_sftp_error("stat", path, e))?;
        if metadata.is_dir() {
            return Err(SftpError::Path(format!("{} is a directory", path)));
        }

        self.sftp
            .remove_file(path.to_string())
            .await
            .map_err(|e| map_sftp_error("remove", path, e))
    }

    async fn disconnect(self) -> Result<(), SftpError> {
        let SshConnection {
            handle,
            sftp,
            host,
            port,
        } = self;

        // Dropping the SFTP session closes its channel
        drop(sftp);

        let result = handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| {
                SftpError::Connection(format!("Failed to disconnect from {}:{}: {}", host, port, e))
            });

        security_log::log_sftp_disconnect(&host, port, result.is_ok());
        result
    }
}
