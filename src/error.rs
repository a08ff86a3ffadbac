use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// SFTP-related errors
#[derive(Error, Debug)]
pub enum SftpError {
    /// Transport establishment, host key check or authentication failed
    #[error("SFTP connection failed: {0}")]
    Connection(String),

    #[error("Local file error on '{path}': {source}")]
    LocalFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The session was connected but a transfer failed part way
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// Remote path is missing or has the wrong type for the operation
    #[error("Remote path error: {0}")]
    Path(String),

    #[error("Invalid connection parameter: {0}")]
    Validation(#[from] ValidationError),
}

/// Category of an [`SftpError`], for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    LocalFile,
    Transfer,
    Path,
    Validation,
}

impl SftpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SftpError::Connection(_) => ErrorKind::Connection,
            SftpError::LocalFile { .. } => ErrorKind::LocalFile,
            SftpError::Transfer(_) => ErrorKind::Transfer,
            SftpError::Path(_) => ErrorKind::Path,
            SftpError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub(crate) fn local_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SftpError::LocalFile {
            path: path.into(),
            source,
        }
    }
}

/// SSH transport errors raised inside the russh client handler
#[derive(Error, Debug)]
pub enum SshError {
    #[error("Host key verification failed: {0}")]
    HostKeyVerification(String),

    #[error("russh error: {0}")]
    Russh(String),
}

impl From<russh::Error> for SshError {
    fn from(err: russh::Error) -> Self {
        SshError::Russh(err.to_string())
    }
}

impl From<SshError> for SftpError {
    fn from(err: SshError) -> Self {
        SftpError::Connection(err.to_string())
    }
}
