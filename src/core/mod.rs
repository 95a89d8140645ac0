pub mod executor;
pub mod inspector;
pub mod profiles;
pub mod relay;
pub mod render;
pub mod store;
pub mod viewer;

pub use crate::domain::model::{Payload, PersistedState, RelayRequest, RelayResponse};
pub use crate::domain::ports::{ConfigProvider, Storage, ThreatLookup};
pub use crate::utils::error::Result;
