//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod address_store;
pub mod event_bus;
pub mod hub_channel;
pub mod metrics;

pub use address_store::AddressStore;
pub use event_bus::EventPublisher;
pub use hub_channel::HubChannel;
pub use metrics::{Gauge, MetricsSink};
