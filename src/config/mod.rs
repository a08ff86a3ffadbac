pub mod credentials;
pub mod settings;

pub use credentials::Credentials;
pub use settings::{DEFAULT_TIMEOUT_MS, HostKeyPolicy, SessionConfig};
