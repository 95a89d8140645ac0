// Domain layer: platform table, relay/persistence models, response schemas and ports.

pub mod model;
pub mod platform;
pub mod ports;
pub mod profile;
