use crate::core::profiles;
use crate::core::relay::RelayChannel;
use crate::core::render::{self, DisplayRecord, PlatformReport};
use crate::core::store::UsernameStore;
use crate::domain::platform::{PlatformId, PlatformRegistry};
use crate::domain::ports::Storage;
use crate::domain::profile::ProfileData;
use crate::utils::error::Result;
use chrono::Utc;

/// Binds the static platform table, the username store and the relay.
pub struct ProfileViewer<S: Storage> {
    registry: PlatformRegistry,
    store: UsernameStore<S>,
    relay: RelayChannel,
}

impl<S: Storage> ProfileViewer<S> {
    pub fn new(registry: PlatformRegistry, storage: S, relay: RelayChannel) -> Self {
        let store = UsernameStore::new(storage, registry.ids());
        Self {
            registry,
            store,
            relay,
        }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn store(&self) -> &UsernameStore<S> {
        &self.store
    }

    pub async fn load(&self) -> Result<()> {
        self.store.load().await.inspect_err(|e| {
            tracing::error!("Failed to load saved usernames: {}", e);
        })
    }

    /// Adds and persists a username; callers re-render the platform afterwards.
    pub async fn add_username(&self, platform: PlatformId, username: &str) -> Result<String> {
        self.registry.get(platform)?;
        self.store.add(platform, username).await
    }

    pub async fn remove_username(&self, platform: PlatformId, username: &str) -> Result<()> {
        self.registry.get(platform)?;
        self.store.remove(platform, username).await
    }

    pub async fn usernames(&self, platform: PlatformId) -> Vec<String> {
        self.store.usernames(platform).await
    }

    pub async fn fetch_for_platform(&self, platform: PlatformId, username: &str) -> Result<ProfileData> {
        let config = self.registry.get(platform)?;
        profiles::fetch_profile(&self.relay, config, username).await
    }

    /// Fetches every saved user of `platform` in insertion order. A failure
    /// for one user becomes an error record and the rest still render.
    pub async fn render_platform(&self, platform: PlatformId) -> Result<PlatformReport> {
        let config = self.registry.get(platform)?;
        let usernames = self.store.usernames(platform).await;

        let mut records = Vec::with_capacity(usernames.len());
        for username in &usernames {
            match profiles::fetch_profile(&self.relay, config, username).await {
                Ok(data) => records.push(DisplayRecord::Profile(render::project(config, username, &data))),
                Err(e) => {
                    let message = e.detail();
                    tracing::error!("{}", render::error_line(username, &message));
                    records.push(DisplayRecord::Error {
                        username: username.clone(),
                        message,
                    });
                }
            }
        }

        Ok(PlatformReport {
            platform,
            usernames: render::username_links(config, &usernames),
            records,
            generated_at: Utc::now(),
        })
    }

    pub async fn render_all(&self) -> Vec<PlatformReport> {
        let mut reports = Vec::new();
        for id in self.registry.ids() {
            match self.render_platform(id).await {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Skipping {}: {}", id, e),
            }
        }
        reports
    }
}
