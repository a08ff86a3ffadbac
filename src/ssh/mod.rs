//! SSH layer beneath the SFTP subsystem
//!
//! Host key checking for the russh client handshake.

pub mod handler;
pub mod known_hosts;

pub use handler::ClientHandler;
pub use known_hosts::{HostKeyStatus, KnownHosts};
