//! `netactuate_bgp_sessions` resource
//!
//! Requests a BGP session group for a server. The API has no way to look up
//! or remove a single request, so the resource is keyed by the server's
//! `mbpkgid` and read and delete only touch local state.

use crate::provider::{ClientSlot, api_error, attribute};
use crate::state::{changed, flag, int, set, with_default};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics, Resource, map};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::ValueEmpty;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BgpSessionsState {
    pub id: Value<String>,
    pub mbpkgid: Value<i64>,
    pub group_id: Value<i64>,
    pub ipv6: Value<bool>,
    pub redundant: Value<bool>,
}

#[derive(Debug, Clone)]
pub struct BgpSessionsResource {
    client: Arc<ClientSlot>,
}

impl BgpSessionsResource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for BgpSessionsResource {
    type State<'a> = BgpSessionsState;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, OptionalComputed, Required};
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("BGP sessions for a NetActuate server"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, Computed, "Server id"),
                    "mbpkgid" => attribute(AttributeType::Number, Required, "Server id"),
                    "group_id" => attribute(AttributeType::Number, Required, "BGP group id"),
                    "ipv6" => attribute(
                        AttributeType::Bool,
                        OptionalComputed,
                        "Request IPv6 sessions. Defaults to true.",
                    ),
                    "redundant" => attribute(
                        AttributeType::Bool,
                        OptionalComputed,
                        "Request redundant sessions. Defaults to false.",
                    ),
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
        _diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let planned = BgpSessionsState {
            id: Value::Unknown,
            ipv6: with_default(proposed_state.ipv6, true),
            redundant: with_default(proposed_state.redundant, false),
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
        let planned = BgpSessionsState {
            ipv6: with_default(proposed_state.ipv6, true),
            redundant: with_default(proposed_state.redundant, false),
            ..proposed_state
        };

        let mut replace = Vec::new();
        if changed(&prior_state.mbpkgid, &planned.mbpkgid) {
            replace.push(AttributePath::new("mbpkgid"));
        }
        if changed(&prior_state.group_id, &planned.group_id) {
            replace.push(AttributePath::new("group_id"));
        }
        if changed(&prior_state.ipv6, &planned.ipv6) {
            replace.push(AttributePath::new("ipv6"));
        }
        if changed(&prior_state.redundant, &planned.redundant) {
            replace.push(AttributePath::new("redundant"));
        }
        Some((planned, prior_private_state, replace))
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
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let server_id = int(&planned_state.mbpkgid);
        let group_id = int(&planned_state.group_id);
        let ipv6 = flag(&planned_state.ipv6, true);
        let redundant = flag(&planned_state.redundant, false);

        let session = match client
            .create_bgp_sessions(server_id, group_id, ipv6, redundant)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        tracing::info!(
            server_id,
            group_id,
            session_id = session.id,
            customer_ip = %session.customer_ip,
            "Created BGP sessions"
        );

        let state = BgpSessionsState {
            id: set(server_id.to_string()),
            ipv6: set(ipv6),
            redundant: set(redundant),
            ..planned_state
        };
        Some((state, planned_private_state))
    }

    async fn update<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        Some((planned_state, planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        tracing::debug!(server_id = int(&prior_state.mbpkgid), "Forgetting BGP sessions");
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = BgpSessionsState {
            id: set(id),
            ..Default::default()
        };
        Some((state, ValueEmpty::default()))
    }
}
