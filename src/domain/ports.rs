use crate::domain::platform::PlatformRegistry;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Asynchronous key-value persistence.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn read_entry(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_entry(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn storage_path(&self) -> &str;
    fn relay_timeout(&self) -> Option<Duration>;
    fn registry(&self) -> Result<PlatformRegistry>;
}

/// Reputation check for a URL against an external threat list.
#[async_trait]
pub trait ThreatLookup: Send + Sync {
    async fn is_flagged(&self, url: &str) -> Result<bool>;
}
