//! `netactuate_bgp_sessions` data source

use crate::provider::{ClientSlot, api_error, attribute};
use crate::state::{int, set};
use async_trait::async_trait;
use netactuate_cloud::BgpSession;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tf_provider::value::Value;
use tf_provider::{DataSource, Diagnostics, map};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::ValueEmpty;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BgpSessionsLookup {
    pub id: Value<String>,
    pub mbpkgid: Value<i64>,
    pub sessions: Value<Vec<SessionState>>,
}

/// One element of `sessions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: i64,
    pub customer_ip: String,
    pub provider_peer_ip: String,
    pub provider_ip_type: String,
    pub group_id: i64,
    pub group_name: String,
    pub location: String,
    pub state: String,
    pub provider_asn: i64,
    pub customer_asn: i64,
    pub routes_received: i64,
}

impl From<&BgpSession> for SessionState {
    fn from(session: &BgpSession) -> Self {
        Self {
            id: session.id,
            customer_ip: session.customer_ip.clone(),
            provider_peer_ip: session.provider_peer_ip.clone(),
            provider_ip_type: session.provider_ip_type.clone(),
            group_id: session.group_id,
            group_name: session.group_name.clone(),
            location: session.location.clone(),
            state: session.state.clone(),
            provider_asn: session.provider_asn,
            customer_asn: session.customer_asn,
            routes_received: session.routes_received,
        }
    }
}

fn session_type() -> AttributeType {
    let fields = [
        ("id", AttributeType::Number),
        ("customer_ip", AttributeType::String),
        ("provider_peer_ip", AttributeType::String),
        ("provider_ip_type", AttributeType::String),
        ("group_id", AttributeType::Number),
        ("group_name", AttributeType::String),
        ("location", AttributeType::String),
        ("state", AttributeType::String),
        ("provider_asn", AttributeType::Number),
        ("customer_asn", AttributeType::Number),
        ("routes_received", AttributeType::Number),
    ];
    AttributeType::Object(
        fields
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct BgpSessionsDataSource {
    client: Arc<ClientSlot>,
}

impl BgpSessionsDataSource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for BgpSessionsDataSource {
    type State<'a> = BgpSessionsLookup;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, Required};
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("BGP sessions configured for a NetActuate server"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, Computed, "Server id"),
                    "mbpkgid" => attribute(AttributeType::Number, Required, "Server id to look up"),
                    "sessions" => attribute(
                        AttributeType::List(Box::new(session_type())),
                        Computed,
                        "Sessions of the server",
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
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let server_id = int(&config.mbpkgid);
        let sessions = match client.get_bgp_sessions(server_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        tracing::debug!(server_id, count = sessions.len(), "Read BGP sessions");

        Some(BgpSessionsLookup {
            id: set(server_id.to_string()),
            mbpkgid: config.mbpkgid,
            sessions: set(sessions.iter().map(|s| SessionState::from(s.as_ref())).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netactuate_cloud::builders::BgpSessionBuilder;
    use netactuate_cloud::{FakeClient, NetActuateApi};

    fn data_source(client: Arc<dyn NetActuateApi>) -> BgpSessionsDataSource {
        BgpSessionsDataSource::new(Arc::new(ClientSlot::new(client)))
    }

    fn lookup(mbpkgid: i64) -> BgpSessionsLookup {
        BgpSessionsLookup {
            mbpkgid: set(mbpkgid),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_read_sessions() {
        let fake = Arc::new(FakeClient::new());
        fake.add_bgp_session(42, BgpSessionBuilder::new().with_id(510).build());
        fake.add_bgp_session(42, BgpSessionBuilder::new().with_id(511).with_ipv6().build());

        let mut diags = Diagnostics::default();
        let state = data_source(fake)
            .read(&mut diags, lookup(42), ValueEmpty::default())
            .await
            .unwrap();
        assert!(diags.errors.is_empty());
        assert_eq!(state.id, set("42".to_string()));

        let Value::Value(sessions) = state.sessions else {
            panic!("sessions should be known");
        };
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, 510);
        assert_eq!(sessions[1].provider_ip_type, "IPv6");
        assert_eq!(sessions[1].customer_ip, "2001:db8:bgp::10");
    }

    #[tokio::test]
    async fn test_no_sessions_is_empty_list() {
        let state = data_source(Arc::new(FakeClient::new()))
            .read(&mut Diagnostics::default(), lookup(7), ValueEmpty::default())
            .await
            .unwrap();
        assert_eq!(state.sessions, set(Vec::new()));
    }

    #[test]
    fn test_session_type_covers_every_field() {
        let AttributeType::Object(fields) = session_type() else {
            panic!("sessions should be objects");
        };
        let session = serde_json::to_value(SessionState::default()).unwrap();
        let keys = session.as_object().unwrap();
        assert_eq!(fields.len(), keys.len());
        assert!(keys.keys().all(|key| fields.contains_key(key)));
    }
}
