//! `netactuate_sshkey` data source

use crate::provider::{ClientSlot, api_error, attribute};
use crate::state::{int, set};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tf_provider::value::Value;
use tf_provider::{DataSource, Diagnostics, map};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::ValueEmpty;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshKeyLookup {
    pub id: Value<String>,
    pub sshkey_id: Value<i64>,
    pub name: Value<String>,
    pub key: Value<String>,
    pub fingerprint: Value<String>,
}

#[derive(Debug, Clone)]
pub struct SshKeyDataSource {
    client: Arc<ClientSlot>,
}

impl SshKeyDataSource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for SshKeyDataSource {
    type State<'a> = SshKeyLookup;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, Required};
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("Look up an SSH key on the NetActuate account"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, Computed, "SSH key id"),
                    "sshkey_id" => attribute(AttributeType::Number, Required, "Key to look up"),
                    "name" => attribute(AttributeType::String, Computed, "Key name"),
                    "key" => attribute(AttributeType::String, Computed, "Public key material"),
                    "fingerprint" => attribute(AttributeType::String, Computed, "Key fingerprint"),
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let key = match client.get_ssh_key(int(&config.sshkey_id)).await {
            Ok(key) => key,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };

        Some(SshKeyLookup {
            id: set(key.id.to_string()),
            sshkey_id: config.sshkey_id,
            name: set(key.name),
            key: set(key.key),
            fingerprint: set(key.fingerprint),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netactuate_cloud::builders::test_ssh_key;
    use netactuate_cloud::{ApiError, MockClient};

    fn lookup(sshkey_id: i64) -> SshKeyLookup {
        SshKeyLookup {
            sshkey_id: set(sshkey_id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_read_key() {
        let mock = Arc::new(MockClient::new().with_get_ssh_key(|id| Ok(test_ssh_key(id, "ops"))));
        let data_source = SshKeyDataSource::new(Arc::new(ClientSlot::new(mock.clone())));

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, lookup(12), ValueEmpty::default())
            .await
            .unwrap();
        assert_eq!(state.id, set("12".to_string()));
        assert_eq!(state.sshkey_id, set(12));
        assert_eq!(state.name, set("ops".to_string()));
        assert_eq!(mock.calls(), vec!["GetSSHKey(12)"]);
    }

    #[tokio::test]
    async fn test_read_error() {
        let mock = MockClient::new().with_get_ssh_key(|id| Err(ApiError::ssh_key_not_found(id)));
        let data_source = SshKeyDataSource::new(Arc::new(ClientSlot::new(Arc::new(mock))));

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, lookup(12), ValueEmpty::default())
            .await;
        assert!(state.is_none());
        assert_eq!(diags.errors[0].summary, "ssh key 12 not found");
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let data_source = SshKeyDataSource::new(Arc::new(ClientSlot::default()));

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, lookup(12), ValueEmpty::default())
            .await;
        assert!(state.is_none());
        assert_eq!(diags.errors[0].summary, "Provider not configured");
    }
}
