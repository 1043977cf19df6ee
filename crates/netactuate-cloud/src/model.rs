//! NetActuate API data model
//!
//! Field names on the wire follow the NetActuate API; Rust names follow the
//! provider's attribute names where the two differ.

use serde::{Deserialize, Serialize};

/// Server status reported while the server is provisioned and up
pub const STATUS_RUNNING: &str = "RUNNING";

/// Server status after a soft delete
pub const STATUS_TERMINATED: &str = "TERMINATED";

/// A provisioned server (the API calls it a package, keyed by `mbpkgid`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(rename = "mbpkgid")]
    pub id: i64,

    #[serde(rename = "fqdn")]
    pub name: String,

    pub os: String,

    pub os_id: i64,

    pub primary_ipv4: String,

    pub primary_ipv6: String,

    pub plan_id: i64,

    pub package: String,

    pub package_billing: String,

    pub package_billing_contract_id: String,

    #[serde(rename = "city")]
    pub location: String,

    pub location_id: i64,

    #[serde(rename = "status")]
    pub server_status: String,

    #[serde(rename = "state")]
    pub power_status: String,

    pub installed: i64,

    #[serde(default)]
    pub cloud_pool: String,
}

impl Server {
    pub fn is_running(&self) -> bool {
        self.server_status == STATUS_RUNNING
    }

    pub fn is_terminated(&self) -> bool {
        self.server_status == STATUS_TERMINATED
    }
}

/// Parameters for provisioning a new server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServerRequest {
    pub plan: String,
    pub location: i64,
    pub image: i64,
    pub fqdn: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub ssh_key_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub package_billing: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub package_billing_contract_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cloud_config: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script_content: String,
}

/// Parameters for rebuilding an existing server in place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildServerRequest {
    pub location: i64,
    pub image: i64,
    pub fqdn: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub ssh_key_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub package_billing: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub package_billing_contract_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cloud_config: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script_content: String,
}

/// Acknowledgement of a create or rebuild request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerBuild {
    #[serde(rename = "mbpkgid")]
    pub server_id: i64,
    pub status: String,
    pub build: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshKey {
    pub id: i64,
    pub name: String,
    #[serde(rename = "ssh_key")]
    pub key: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BgpSession {
    pub id: i64,
    pub customer_ip: String,
    pub group_id: i64,
    #[serde(default)]
    pub locked: i64,
    #[serde(default)]
    pub description: String,
    pub state: String,
    #[serde(default)]
    pub routes_received: i64,
    #[serde(default)]
    pub config_status: i64,
    #[serde(default)]
    pub provider_peer_ip: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub group_name: String,
    pub provider_ip_type: String,
    pub provider_asn: i64,
    pub customer_asn: i64,
}

/// Addresses allocated to a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ips {
    #[serde(rename = "IPv4", default)]
    pub ipv4: Vec<Ip>,
    #[serde(rename = "IPv6", default)]
    pub ipv6: Vec<Ip>,
}

impl Ips {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ip {
    pub id: i64,
    #[serde(rename = "ip")]
    pub address: String,
    pub primary: i64,
    #[serde(default)]
    pub reverse: String,
    #[serde(default)]
    pub broadcast: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub netmask: String,
}

impl Ip {
    pub fn is_primary(&self) -> bool {
        self.primary == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub iata_code: String,
    pub continent: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub disabled: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Os {
    pub id: i64,
    #[serde(rename = "os")]
    pub name: String,
    #[serde(rename = "type")]
    pub os_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub bits: String,
    #[serde(default)]
    pub tech: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
