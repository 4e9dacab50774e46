//! TOML file implementation of [`AddressStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::{Table, Value};

use neohub_app::ports::AddressStore;
use neohub_domain::error::HubError;
use neohub_domain::identity::HubIdentity;

use crate::error::StoreError;

const ADDRESS_KEY: &str = "address";
const DEVICE_ID_KEY: &str = "device_id";
const DEFAULT_FILE_NAME: &str = ".neohub.toml";

/// Location of the address file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    /// `~/.neohub.toml`, or the working directory when `HOME` is unset.
    fn default() -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        Self {
            path: home.join(DEFAULT_FILE_NAME),
        }
    }
}

/// Stores the hub identity as top-level `address` and `device_id` keys.
///
/// A missing file, or an empty `address`, reads as "nothing persisted".
#[derive(Debug, Clone)]
pub struct TomlAddressStore {
    path: PathBuf,
}

impl TomlAddressStore {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self { path: config.path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<Table, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content.parse::<Table>().map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Table::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write through a sibling temporary file so readers never see a
    /// truncated document.
    async fn write_table(&self, table: &Table) -> Result<(), StoreError> {
        let content = toml::to_string(table)?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&staging, content).await.map_err(io_err)?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(io_err)
    }

    async fn load_identity(&self) -> Result<Option<HubIdentity>, StoreError> {
        let table = self.read_table().await?;
        let Some(address) = non_empty(&table, ADDRESS_KEY) else {
            return Ok(None);
        };
        let device_id = non_empty(&table, DEVICE_ID_KEY).unwrap_or_default();
        Ok(Some(HubIdentity::new(address, device_id)))
    }

    async fn save_identity(&self, identity: HubIdentity) -> Result<(), StoreError> {
        let mut table = self.read_table().await?;
        table.insert(ADDRESS_KEY.to_string(), Value::String(identity.address));
        table.insert(DEVICE_ID_KEY.to_string(), Value::String(identity.device_id));
        self.write_table(&table).await?;
        tracing::debug!(path = %self.path.display(), "persisted hub address");
        Ok(())
    }

    async fn delete_identity(&self) -> Result<(), StoreError> {
        let mut table = self.read_table().await?;
        let had_address = table.remove(ADDRESS_KEY).is_some();
        let had_device_id = table.remove(DEVICE_ID_KEY).is_some();
        if had_address || had_device_id {
            self.write_table(&table).await?;
            tracing::debug!(path = %self.path.display(), "forgot hub address");
        }
        Ok(())
    }
}

fn non_empty(table: &Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl AddressStore for TomlAddressStore {
    fn load(&self) -> impl Future<Output = Result<Option<HubIdentity>, HubError>> + Send {
        async move { Ok(self.load_identity().await?) }
    }

    fn save(&self, identity: HubIdentity) -> impl Future<Output = Result<(), HubError>> + Send {
        async move { Ok(self.save_identity(identity).await?) }
    }

    fn delete(&self) -> impl Future<Output = Result<(), HubError>> + Send {
        async move { Ok(self.delete_identity().await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TomlAddressStore {
        TomlAddressStore::new(StoreConfig {
            path: dir.path().join("neohub.toml"),
        })
    }

    #[test]
    fn should_default_to_hidden_file() {
        assert!(StoreConfig::default().path.ends_with(".neohub.toml"));
    }

    #[tokio::test]
    async fn should_return_none_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_load_saved_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let hub = HubIdentity::new("192.168.1.20", "hub-1");

        store.save(hub.clone()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(hub));
    }

    #[tokio::test]
    async fn should_forget_identity_and_keep_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "address = '10.0.0.2'\ndevice_id = 'hub-1'\nnote = 'kept'\n")
            .unwrap();

        store.delete().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("note = \"kept\""));
        assert!(!content.contains("address"));
    }

    #[tokio::test]
    async fn should_succeed_deleting_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.delete().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn should_treat_empty_address_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "address = ''\ndevice_id = ''\n").unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_surface_parse_error_as_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "address = [unterminated").unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, HubError::Storage(_)));
    }
}
