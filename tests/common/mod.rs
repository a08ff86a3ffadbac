//! Common test utilities
//!
//! An in-memory SFTP server behind the `Connector`/`Connection` traits, with
//! connect/disconnect counters and fault injection.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use sftp_session::config::{Credentials, SessionConfig};
use sftp_session::{Connection, Connector, RemoteEntry, SftpError, SftpSession};

/// Install a test-writer tracing subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Where the next operation should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    /// Refuse connections
    Connect,
    /// Fail mid-transfer after writing/reading half the data
    Transfer,
    /// Fail every directory or delete request
    Action,
    /// Fail the disconnect
    Disconnect,
}

#[derive(Debug, Default)]
pub struct ServerState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub connects: usize,
    pub disconnects: usize,
    pub fault: Fault,
}

impl ServerState {
    pub fn open_connections(&self) -> usize {
        self.connects - self.disconnects
    }
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((parent, _)) => parent,
        None => ".",
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// In-memory SFTP server shared by every connection it hands out
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    state: Arc<Mutex<ServerState>>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector {
    /// A server with an empty root directory
    pub fn new() -> Self {
        let mut state = ServerState::default();
        state.dirs.insert("/".to_string());
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("server state lock")
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.state().dirs.insert(path.to_string());
        self
    }

    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        self.state().files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn set_fault(&self, fault: Fault) {
        self.state().fault = fault;
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    pub fn open_connections(&self) -> usize {
        self.state().open_connections()
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(
        &self,
        _credentials: &Credentials,
        _config: &SessionConfig,
    ) -> Result<MemoryConnection, SftpError> {
        let mut state = self.state();
        if state.fault == Fault::Connect {
            return Err(SftpError::Connection("connection refused".to_string()));
        }
        state.connects += 1;
        Ok(MemoryConnection {
            state: self.state.clone(),
        })
    }
}

pub struct MemoryConnection {
    state: Arc<Mutex<ServerState>>,
}

impl MemoryConnection {
    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("server state lock")
    }
}

impl Connection for MemoryConnection {
    async fn exists(&mut self, path: &str) -> Result<bool, SftpError> {
        let state = self.state();
        Ok(state.files.contains_key(path) || state.dirs.contains(path))
    }

    async fn is_dir(&mut self, path: &str) -> Result<bool, SftpError> {
        let state = self.state();
        if state.dirs.contains(path) {
            return Ok(true);
        }
        if state.files.contains_key(path) {
            return Ok(false);
        }
        Err(SftpError::Path(format!("{} does not exist", path)))
    }

    async fn download_to<W>(&mut self, remote_path: &str, sink: &mut W) -> Result<u64, SftpError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let (content, fault) = {
            let state = self.state();
            if state.dirs.contains(remote_path) {
                return Err(SftpError::Path(format!("{} is a directory", remote_path)));
            }
            let content = state
                .files
                .get(remote_path)
                .cloned()
                .ok_or_else(|| SftpError::Path(format!("{} does not exist", remote_path)))?;
            (content, state.fault)
        };

        if fault == Fault::Transfer {
            let half = &content[..content.len() / 2];
            sink.write_all(half)
                .await
                .map_err(|e| SftpError::Transfer(e.to_string()))?;
            sink.flush()
                .await
                .map_err(|e| SftpError::Transfer(e.to_string()))?;
            return Err(SftpError::Transfer("connection reset".to_string()));
        }

        sink.write_all(&content)
            .await
            .map_err(|e| SftpError::Transfer(e.to_string()))?;
        sink.flush()
            .await
            .map_err(|e| SftpError::Transfer(e.to_string()))?;
        Ok(content.len() as u64)
    }

    async fn upload_from<R>(&mut self, source: &mut R, remote_path: &str) -> Result<u64, SftpError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut content = Vec::new();
        source
            .read_to_end(&mut content)
            .await
            .map_err(|e| SftpError::Transfer(e.to_string()))?;

        let mut state = self.state();
        if !state.dirs.contains(parent_of(remote_path)) {
            return Err(SftpError::Path(format!(
                "{} does not exist",
                parent_of(remote_path)
            )));
        }
        if state.dirs.contains(remote_path) {
            return Err(SftpError::Path(format!("{} is a directory", remote_path)));
        }
        if state.fault == Fault::Transfer {
            let half = content[..content.len() / 2].to_vec();
            state.files.insert(remote_path.to_string(), half);
            return Err(SftpError::Transfer("connection reset".to_string()));
        }

        let len = content.len() as u64;
        state.files.insert(remote_path.to_string(), content);
        Ok(len)
    }

    async fn list_directory(&mut self, path: &str) -> Result<Vec<RemoteEntry>, SftpError> {
        let state = self.state();
        if state.fault == Fault::Action {
            return Err(SftpError::Transfer("channel closed".to_string()));
        }
        if !state.dirs.contains(path) {
            return Err(SftpError::Path(format!("{} does not exist", path)));
        }

        // Servers commonly report the dot entries first
        let mut entries = vec![RemoteEntry::dir("."), RemoteEntry::dir("..")];
        entries.extend(
            state
                .dirs
                .iter()
                .filter(|dir| dir.as_str() != "/" && parent_of(dir) == path)
                .map(|dir| RemoteEntry::dir(name_of(dir))),
        );
        entries.extend(
            state
                .files
                .iter()
                .filter(|(file, _)| parent_of(file) == path)
                .map(|(file, content)| RemoteEntry::file(name_of(file), content.len() as u64)),
        );
        Ok(entries)
    }

    async fn delete_file(&mut self, path: &str) -> Result<(), SftpError> {
        let mut state = self.state();
        if state.fault == Fault::Action {
            return Err(SftpError::Transfer("channel closed".to_string()));
        }
        if state.dirs.contains(path) {
            return Err(SftpError::Path(format!("{} is a directory", path)));
        }
        match state.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(SftpError::Path(format!("{} does not exist", path))),
        }
    }

    async fn disconnect(self) -> Result<(), SftpError> {
        let mut state = self.state();
        state.disconnects += 1;
        if state.fault == Fault::Disconnect {
            return Err(SftpError::Connection("disconnect failed".to_string()));
        }
        Ok(())
    }
}

/// Session over `connector` with throwaway credentials
pub fn session(connector: &MemoryConnector) -> SftpSession<MemoryConnector> {
    init_tracing();
    let credentials =
        Credentials::new("sftp.test", 22, "tester", "tester-pw").expect("test credentials");
    SftpSession::with_connector(credentials, SessionConfig::default(), connector.clone())
        .expect("test session")
}
