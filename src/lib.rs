//! Per-operation SFTP client
//!
//! [`SftpSession`] holds connection parameters only. Each of its operations
//! (upload, download, list, delete) opens its own SSH connection, performs a
//! single action over the SFTP subsystem and disconnects before returning.
//!
//! ```no_run
//! # async fn run() -> Result<(), sftp_session::SftpError> {
//! use sftp_session::SftpSession;
//!
//! let session = SftpSession::from_params("files.example.com", "deploy", "secret", 22)?;
//! session.upload("/incoming/report.csv", "report.csv").await?;
//! for name in session.list_files("/incoming").await? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sftp;
pub mod ssh;
pub mod validation;

pub(crate) mod security_log;

pub use config::{Credentials, HostKeyPolicy, SessionConfig};
pub use error::{ErrorKind, SftpError};
pub use sftp::{Connection, Connector, RemoteEntry, SftpSession, SshConnector};
