pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::storage::{LocalStorage, MemoryStorage};
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::executor::FetchExecutor;
pub use crate::core::inspector::PageInspector;
pub use crate::core::relay::RelayChannel;
pub use crate::core::viewer::ProfileViewer;
pub use crate::domain::platform::{PlatformConfig, PlatformId, PlatformRegistry};
pub use crate::utils::error::{Result, ViewerError};

use tokio::task::JoinHandle;

/// Builds the HTTP client, spawns a [`FetchExecutor`] and returns the
/// channel that talks to it.
pub fn start_relay(
    timeout: Option<std::time::Duration>,
) -> Result<(RelayChannel, JoinHandle<()>)> {
    let client = crate::adapters::http::build_client()?;
    let (relay, inbox) = crate::core::relay::channel(timeout);
    let handle = FetchExecutor::new(client).spawn(inbox);
    Ok((relay, handle))
}
