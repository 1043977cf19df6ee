//! `netactuate_server` data source

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
pub struct ServerLookup {
    pub id: Value<String>,
    pub mbpkgid: Value<i64>,
    pub hostname: Value<String>,
    pub plan: Value<String>,
    pub location: Value<String>,
    pub location_id: Value<i64>,
    pub image: Value<String>,
    pub image_id: Value<i64>,
    pub status: Value<String>,
    pub primary_ipv4: Value<String>,
    pub primary_ipv6: Value<String>,
    pub package_billing: Value<String>,
    pub package_billing_contract_id: Value<String>,
    pub ipv4_addresses: Value<Vec<String>>,
    pub ipv6_addresses: Value<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ServerDataSource {
    client: Arc<ClientSlot>,
}

impl ServerDataSource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ServerDataSource {
    type State<'a> = ServerLookup;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, Required};
        use AttributeType as Ty;
        let addresses = || Ty::List(Box::new(Ty::String));
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("Look up an existing NetActuate server"),
                attributes: map! {
                    "id" => attribute(Ty::String, Computed, "Server id"),
                    "mbpkgid" => attribute(Ty::Number, Required, "Server id to look up"),
                    "hostname" => attribute(Ty::String, Computed, "Server hostname"),
                    "plan" => attribute(Ty::String, Computed, "Plan name"),
                    "location" => attribute(Ty::String, Computed, "Location name"),
                    "location_id" => attribute(Ty::Number, Computed, "Location id"),
                    "image" => attribute(Ty::String, Computed, "OS image name"),
                    "image_id" => attribute(Ty::Number, Computed, "OS image id"),
                    "status" => attribute(Ty::String, Computed, "Server status"),
                    "primary_ipv4" => attribute(Ty::String, Computed, "Primary IPv4 address"),
                    "primary_ipv6" => attribute(Ty::String, Computed, "Primary IPv6 address"),
                    "package_billing" => attribute(Ty::String, Computed, "Billing type"),
                    "package_billing_contract_id" => attribute(
                        Ty::String,
                        Computed,
                        "Billing contract id",
                    ),
                    "ipv4_addresses" => attribute(addresses(), Computed, "All IPv4 addresses"),
                    "ipv6_addresses" => attribute(addresses(), Computed, "All IPv6 addresses"),
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
        let id = int(&config.mbpkgid);

        let server = match client.get_server(id).await {
            Ok(server) => server,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        let ips = match client.get_ips(id).await {
            Ok(ips) => ips,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };

        Some(ServerLookup {
            id: set(server.id.to_string()),
            mbpkgid: config.mbpkgid,
            hostname: set(server.name),
            plan: set(server.package),
            location: set(server.location),
            location_id: set(server.location_id),
            image: set(server.os),
            image_id: set(server.os_id),
            status: set(server.server_status),
            primary_ipv4: set(server.primary_ipv4),
            primary_ipv6: set(server.primary_ipv6),
            package_billing: set(server.package_billing),
            package_billing_contract_id: set(server.package_billing_contract_id),
            ipv4_addresses: set(ips.ipv4.into_iter().map(|ip| ip.address).collect()),
            ipv6_addresses: set(ips.ipv6.into_iter().map(|ip| ip.address).collect()),
        })
    }
}
