//! SFTP directory listing types

/// One entry of a remote directory listing, as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: Option<u64>,
}

impl RemoteEntry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            size: Some(size),
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            size: None,
        }
    }

    /// Check if this is the `.` or `..` pseudo-entry some servers return
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}
