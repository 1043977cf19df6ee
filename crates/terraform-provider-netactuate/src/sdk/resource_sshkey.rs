//! `netactuate_sshkey` resource

use crate::provider::{ClientSlot, api_error, attribute};
use crate::state::{changed, set, string};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics, Resource, map};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::ValueEmpty;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshKeyState {
    pub id: Value<String>,
    pub name: Value<String>,
    pub key: Value<String>,
    pub fingerprint: Value<String>,
}

impl SshKeyState {
    fn key_id(&self, diags: &mut Diagnostics) -> Option<i64> {
        let id = string(&self.id);
        match id.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                diags.root_error("Invalid SSH key id", format!("{:?} is not a numeric id", id));
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SshKeyResource {
    client: Arc<ClientSlot>,
}

impl SshKeyResource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for SshKeyResource {
    type State<'a> = SshKeyState;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, Required};
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain(
                    "An SSH public key stored on the NetActuate account",
                ),
                attributes: map! {
                    "id" => attribute(AttributeType::String, Computed, "SSH key id"),
                    "name" => attribute(AttributeType::String, Required, "Key name"),
                    "key" => attribute(AttributeType::String, Required, "Public key material"),
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
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let id = state.key_id(diags)?;

        let key = match client.get_ssh_key(id).await {
            Ok(key) => key,
            Err(e) if e.is_not_found() => {
                tracing::warn!(ssh_key_id = id, "SSH key not found, removing from state");
                return None;
            }
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };

        let state = SshKeyState {
            id: set(key.id.to_string()),
            name: set(key.name),
            key: set(key.key),
            fingerprint: set(key.fingerprint),
        };
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let planned = SshKeyState {
            id: Value::Unknown,
            fingerprint: Value::Unknown,
            ..proposed_state
        };
        Some((planned, ValueEmpty::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        // Keys cannot be edited in place
        let mut replace = Vec::new();
        if changed(&prior_state.name, &proposed_state.name) {
            replace.push(AttributePath::new("name"));
        }
        if changed(&prior_state.key, &proposed_state.key) {
            replace.push(AttributePath::new("key"));
        }
        Some((proposed_state, prior_private_state, replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(ValueEmpty::default())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let name = string(&planned_state.name);
        let key = match client.create_ssh_key(name, string(&planned_state.key)).await {
            Ok(key) => key,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        tracing::info!(ssh_key_id = key.id, name = %name, "Created SSH key");

        let state = SshKeyState {
            id: set(key.id.to_string()),
            ..planned_state
        };
        self.read(diags, state, planned_private_state, provider_meta_state)
            .await
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        self.read(diags, planned_state, planned_private_state, provider_meta_state)
            .await
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;
        let id = prior_state.key_id(diags)?;
        match client.delete_ssh_key(id).await {
            Ok(()) => tracing::info!(ssh_key_id = id, "Deleted SSH key"),
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = SshKeyState {
            id: set(id),
            ..Default::default()
        };
        Some((state, ValueEmpty::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netactuate_cloud::builders::SshKeyBuilder;
    use netactuate_cloud::{ApiError, FakeClient, MockClient, NetActuateApi, Operation};

    fn resource(client: Arc<dyn NetActuateApi>) -> SshKeyResource {
        SshKeyResource::new(Arc::new(ClientSlot::new(client)))
    }

    fn config(name: &str, key: &str) -> SshKeyState {
        SshKeyState {
            name: set(name.to_string()),
            key: set(key.to_string()),
            ..Default::default()
        }
    }

    fn id(value: &str) -> SshKeyState {
        SshKeyState {
            id: set(value.to_string()),
            ..Default::default()
        }
    }

    async fn plan_and_create(
        resource: &SshKeyResource,
        config: SshKeyState,
    ) -> (Diagnostics, Option<SshKeyState>) {
        let mut diags = Diagnostics::default();
        let (planned, private) = resource
            .plan_create(&mut diags, config.clone(), config.clone(), ValueEmpty::default())
            .await
            .unwrap();
        let created = resource
            .create(&mut diags, planned, config, private, ValueEmpty::default())
            .await
            .map(|(state, _)| state);
        (diags, created)
    }

    async fn read(
        resource: &SshKeyResource,
        state: SshKeyState,
    ) -> (Diagnostics, Option<SshKeyState>) {
        let mut diags = Diagnostics::default();
        let read = resource
            .read(&mut diags, state, ValueEmpty::default(), ValueEmpty::default())
            .await
            .map(|(state, _)| state);
        (diags, read)
    }

    async fn destroy(resource: &SshKeyResource, state: SshKeyState) -> Diagnostics {
        let mut diags = Diagnostics::default();
        resource
            .destroy(&mut diags, state, ValueEmpty::default(), ValueEmpty::default())
            .await;
        diags
    }

    #[test]
    fn test_schema() {
        let schema = resource(Arc::new(FakeClient::new()))
            .schema(&mut Diagnostics::default())
            .unwrap();
        let attributes = &schema.block.attributes;
        assert_eq!(attributes.len(), 4);
        assert!(matches!(attributes["name"].constraint, AttributeConstraint::Required));
        assert!(matches!(attributes["key"].constraint, AttributeConstraint::Required));
        assert!(matches!(attributes["fingerprint"].constraint, AttributeConstraint::Computed));
    }

    #[tokio::test]
    async fn test_create_read_delete() {
        let fake = Arc::new(FakeClient::new());
        let resource = resource(fake.clone());

        let (diags, state) =
            plan_and_create(&resource, config("deploy", "ssh-ed25519 AAAA deploy@example")).await;
        assert!(diags.errors.is_empty());
        let state = state.unwrap();
        assert_eq!(state.id, set("100".to_string()));
        assert_eq!(state.fingerprint, set("SHA256:fake-fingerprint-100".to_string()));

        let (_, refreshed) = read(&resource, state.clone()).await;
        assert_eq!(refreshed, Some(state.clone()));

        assert!(destroy(&resource, state).await.errors.is_empty());

        assert_eq!(
            fake.calls(),
            vec![
                "CreateSSHKey(deploy)",
                "GetSSHKey(100)",
                "GetSSHKey(100)",
                "DeleteSSHKey(100)",
            ]
        );
    }

    #[tokio::test]
    async fn test_key_change_replaces() {
        let fake = Arc::new(FakeClient::new());
        let resource = resource(fake.clone());
        let (_, state) = plan_and_create(&resource, config("deploy", "ssh-ed25519 AAAA")).await;
        let state = state.unwrap();

        let rotated = config("deploy", "ssh-ed25519 BBBB");
        let proposed = SshKeyState {
            id: state.id.clone(),
            fingerprint: state.fingerprint.clone(),
            ..rotated.clone()
        };
        let mut diags = Diagnostics::default();
        let (_, _, replace) = resource
            .plan_update(
                &mut diags,
                state.clone(),
                proposed,
                rotated.clone(),
                ValueEmpty::default(),
                ValueEmpty::default(),
            )
            .await
            .unwrap();
        assert_eq!(replace, vec![AttributePath::new("key")]);

        assert!(destroy(&resource, state).await.errors.is_empty());
        let (diags, replacement) = plan_and_create(&resource, rotated).await;
        assert!(diags.errors.is_empty());

        let replacement = replacement.unwrap();
        assert_eq!(replacement.id, set("101".to_string()));
        assert_eq!(replacement.key, set("ssh-ed25519 BBBB".to_string()));
        assert!(fake.get_ssh_key(100).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rename_replaces() {
        let resource = resource(Arc::new(FakeClient::new()));
        let prior = SshKeyState {
            id: set("100".to_string()),
            fingerprint: set("SHA256:x".to_string()),
            ..config("deploy", "ssh-ed25519 AAAA")
        };
        let proposed = SshKeyState {
            name: set("ops".to_string()),
            ..prior.clone()
        };

        let (_, _, replace) = resource
            .plan_update(
                &mut Diagnostics::default(),
                prior,
                proposed.clone(),
                proposed,
                ValueEmpty::default(),
                ValueEmpty::default(),
            )
            .await
            .unwrap();
        assert_eq!(replace, vec![AttributePath::new("name")]);
    }

    #[tokio::test]
    async fn test_read_refreshes_from_api() {
        let fake = Arc::new(FakeClient::new());
        fake.add_ssh_key(
            SshKeyBuilder::new()
                .with_id(9)
                .with_name("renamed")
                .with_fingerprint("SHA256:abc")
                .build(),
        );
        let prior = SshKeyState {
            name: set("old".to_string()),
            ..id("9")
        };

        let (_, state) = read(&resource(fake), prior).await;
        let state = state.unwrap();
        assert_eq!(state.name, set("renamed".to_string()));
        assert_eq!(state.fingerprint, set("SHA256:abc".to_string()));
    }

    #[tokio::test]
    async fn test_read_removes_missing_key() {
        let (diags, state) = read(&resource(Arc::new(FakeClient::new())), id("404")).await;
        assert!(state.is_none());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let mock = MockClient::new().with_delete_ssh_key(|id| Err(ApiError::ssh_key_not_found(id)));
        let diags = destroy(&resource(Arc::new(mock)), id("3")).await;
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure() {
        let fake = Arc::new(FakeClient::new());
        fake.set_error(Operation::CreateSshKey, ApiError::Api("invalid key".to_string()));

        let (diags, state) = plan_and_create(&resource(fake), config("bad", "not-a-key")).await;
        assert!(state.is_none());
        assert_eq!(diags.errors[0].summary, "API error: invalid key");
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let fake = Arc::new(FakeClient::new());
        let (diags, _) = read(&resource(fake.clone()), id("abc")).await;
        assert_eq!(diags.errors[0].summary, "Invalid SSH key id");
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_import() {
        let resource = resource(Arc::new(FakeClient::new()));
        let mut diags = Diagnostics::default();
        let (state, _) = resource.import(&mut diags, "100".to_string()).await.unwrap();
        assert_eq!(state, id("100"));
        assert!(diags.errors.is_empty());
    }
}
