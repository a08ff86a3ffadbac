//! SFTP client facade
//!
//! Provides per-operation upload, download, list and delete.

pub mod client;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{SshConnection, SshConnector};
pub use session::SftpSession;
pub use transport::{Connection, Connector};
pub use types::RemoteEntry;
