//! Address store port: persistence of the discovered hub identity.

use std::future::Future;

use neohub_domain::error::HubError;
use neohub_domain::identity::HubIdentity;

/// Persists the last discovered hub so the next start can skip discovery.
pub trait AddressStore {
    /// Load the persisted identity, if any.
    fn load(&self) -> impl Future<Output = Result<Option<HubIdentity>, HubError>> + Send;

    /// Persist `identity`, replacing any previous one.
    fn save(&self, identity: HubIdentity) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Forget the persisted identity. Deleting an absent entry succeeds.
    fn delete(&self) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: AddressStore + Send + Sync> AddressStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Option<HubIdentity>, HubError>> + Send {
        (**self).load()
    }

    fn save(&self, identity: HubIdentity) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).save(identity)
    }

    fn delete(&self) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).delete()
    }
}
