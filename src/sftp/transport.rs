//! Seam between [`SftpSession`](super::SftpSession) and the SSH/SFTP client
//! library doing the actual protocol work.
//!
//! A [`Connector`] opens one authenticated [`Connection`] per call; the
//! session consumes it with [`Connection::disconnect`] when the operation is
//! done. Implementations map their own failures onto [`SftpError`]:
//! missing remote paths as `Path`, mid-transfer failures as `Transfer`,
//! handshake/authentication/teardown failures as `Connection`.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{Credentials, SessionConfig};
use crate::error::SftpError;

use super::types::RemoteEntry;

/// Opens transport connections
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Establish and authenticate a connection, bounded by `config.timeout()`.
    fn connect(
        &self,
        credentials: &Credentials,
        config: &SessionConfig,
    ) -> impl Future<Output = Result<Self::Connection, SftpError>> + Send;
}

/// An open, authenticated SFTP connection
pub trait Connection: Send + Sized {
    fn exists(&mut self, path: &str) -> impl Future<Output = Result<bool, SftpError>> + Send;

    /// Whether `path` is a directory; a missing path is a `Path` error.
    fn is_dir(&mut self, path: &str) -> impl Future<Output = Result<bool, SftpError>> + Send;

    /// Stream the remote file at `remote_path` into `sink`, returning bytes copied.
    fn download_to<W>(
        &mut self,
        remote_path: &str,
        sink: &mut W,
    ) -> impl Future<Output = Result<u64, SftpError>> + Send
    where
        W: AsyncWrite + Unpin + Send;

    /// Create or truncate `remote_path` and fill it from `source`.
    fn upload_from<R>(
        &mut self,
        source: &mut R,
        remote_path: &str,
    ) -> impl Future<Output = Result<u64, SftpError>> + Send
    where
        R: AsyncRead + Unpin + Send;

    fn list_directory(
        &mut self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<RemoteEntry>, SftpError>> + Send;

    /// Remove a regular file; directories are a `Path` error.
    fn delete_file(&mut self, path: &str) -> impl Future<Output = Result<(), SftpError>> + Send;

    fn disconnect(self) -> impl Future<Output = Result<(), SftpError>> + Send;
}
