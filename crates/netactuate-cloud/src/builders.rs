//! Test-data builders
//!
//! Fluent constructors for model values with realistic defaults, used to seed
//! [`FakeClient`](crate::FakeClient) and to answer
//! [`MockClient`](crate::MockClient) hooks.
//!
//! ```ignore
//! let server = ServerBuilder::new()
//!     .with_id(123)
//!     .with_name("test.example.com")
//!     .with_status("RUNNING")
//!     .build();
//! ```

use crate::model::{
    BgpSession, Ip, Ips, Location, Os, STATUS_RUNNING, STATUS_TERMINATED, Server, SshKey,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ServerBuilder {
    server: Server,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            server: Server {
                id: 1000,
                name: "test-server.example.com".to_string(),
                os: "Ubuntu 22.04 LTS".to_string(),
                os_id: 1,
                primary_ipv4: "192.0.2.100".to_string(),
                primary_ipv6: "2001:db8::100".to_string(),
                plan_id: 1,
                package: "test-plan".to_string(),
                package_billing: "usage".to_string(),
                package_billing_contract_id: String::new(),
                location: "AMS Amsterdam".to_string(),
                location_id: 1,
                server_status: STATUS_RUNNING.to_string(),
                power_status: "on".to_string(),
                installed: 1,
                cloud_pool: String::new(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.server.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server.name = name.into();
        self
    }

    pub fn with_os(mut self, name: impl Into<String>, id: i64) -> Self {
        self.server.os = name.into();
        self.server.os_id = id;
        self
    }

    pub fn with_location(mut self, name: impl Into<String>, id: i64) -> Self {
        self.server.location = name.into();
        self.server.location_id = id;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.server.server_status = status.into();
        self
    }

    pub fn with_ipv4(mut self, ip: impl Into<String>) -> Self {
        self.server.primary_ipv4 = ip.into();
        self
    }

    pub fn with_ipv6(mut self, ip: impl Into<String>) -> Self {
        self.server.primary_ipv6 = ip.into();
        self
    }

    pub fn with_package_billing(
        mut self,
        billing: impl Into<String>,
        contract_id: impl Into<String>,
    ) -> Self {
        self.server.package_billing = billing.into();
        self.server.package_billing_contract_id = contract_id.into();
        self
    }

    pub fn with_cloud_pool(mut self, pool: impl Into<String>) -> Self {
        self.server.cloud_pool = pool.into();
        self
    }

    /// A server that was never installed has no hostname or OS yet.
    pub fn not_installed(mut self) -> Self {
        self.server.installed = 0;
        self.server.name.clear();
        self.server.os.clear();
        self
    }

    pub fn build(self) -> Server {
        self.server
    }
}

#[derive(Debug, Clone)]
pub struct SshKeyBuilder {
    key: SshKey,
}

impl Default for SshKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SshKeyBuilder {
    pub fn new() -> Self {
        Self {
            key: SshKey {
                id: 100,
                name: "test-key".to_string(),
                key: "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQC... test@example.com".to_string(),
                fingerprint: "SHA256:test-fingerprint-hash".to_string(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.key.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.key.name = name.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key.key = key.into();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.key.fingerprint = fingerprint.into();
        self
    }

    pub fn build(self) -> SshKey {
        self.key
    }
}

#[derive(Debug, Clone)]
pub struct BgpSessionBuilder {
    session: BgpSession,
}

impl Default for BgpSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BgpSessionBuilder {
    pub fn new() -> Self {
        Self {
            session: BgpSession {
                id: 500,
                customer_ip: "198.51.100.10".to_string(),
                group_id: 1,
                locked: 0,
                description: "Test BGP Session".to_string(),
                state: "established".to_string(),
                routes_received: 100,
                config_status: 1,
                provider_peer_ip: "198.51.100.1".to_string(),
                location: "AMS Amsterdam".to_string(),
                group_name: "test-group".to_string(),
                provider_ip_type: "IPv4".to_string(),
                provider_asn: 64512,
                customer_asn: 65000,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.session.id = id;
        self
    }

    pub fn with_customer_ip(mut self, ip: impl Into<String>) -> Self {
        self.session.customer_ip = ip.into();
        self
    }

    pub fn with_group_id(mut self, group_id: i64) -> Self {
        self.session.group_id = group_id;
        self
    }

    /// Switch the session to the IPv6 family, including both peer addresses.
    pub fn with_ipv6(mut self) -> Self {
        self.session.provider_ip_type = "IPv6".to_string();
        self.session.customer_ip = "2001:db8:bgp::10".to_string();
        self.session.provider_peer_ip = "2001:db8:bgp::1".to_string();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.session.state = state.into();
        self
    }

    pub fn with_asns(mut self, provider_asn: i64, customer_asn: i64) -> Self {
        self.session.provider_asn = provider_asn;
        self.session.customer_asn = customer_asn;
        self
    }

    pub fn build(self) -> BgpSession {
        self.session
    }

    pub fn build_arc(self) -> Arc<BgpSession> {
        Arc::new(self.session)
    }
}

#[derive(Debug, Clone)]
pub struct IpsBuilder {
    ips: Ips,
}

impl Default for IpsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IpsBuilder {
    pub fn new() -> Self {
        Self {
            ips: Ips {
                ipv4: vec![Ip {
                    id: 1,
                    address: "192.0.2.100".to_string(),
                    primary: 1,
                    gateway: "192.0.2.1".to_string(),
                    netmask: "255.255.255.0".to_string(),
                    broadcast: "192.0.2.255".to_string(),
                    reverse: "100.2.0.192.in-addr.arpa".to_string(),
                }],
                ipv6: vec![Ip {
                    id: 2,
                    address: "2001:db8::100".to_string(),
                    primary: 1,
                    gateway: "2001:db8::1".to_string(),
                    netmask: "ffff:ffff:ffff:ffff::".to_string(),
                    ..Default::default()
                }],
            },
        }
    }

    pub fn add_ipv4(self, ip: &str, gateway: &str, netmask: &str, primary: bool) -> Self {
        self.push(false, ip, gateway, netmask, primary)
    }

    pub fn add_ipv6(self, ip: &str, gateway: &str, netmask: &str, primary: bool) -> Self {
        self.push(true, ip, gateway, netmask, primary)
    }

    fn push(mut self, v6: bool, ip: &str, gateway: &str, netmask: &str, primary: bool) -> Self {
        let list = if v6 {
            &mut self.ips.ipv6
        } else {
            &mut self.ips.ipv4
        };
        // ids are per-family positions
        let id = list.len() as i64 + 1;
        list.push(Ip {
            id,
            address: ip.to_string(),
            primary: i64::from(primary),
            gateway: gateway.to_string(),
            netmask: netmask.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn clear_ipv4(mut self) -> Self {
        self.ips.ipv4.clear();
        self
    }

    pub fn clear_ipv6(mut self) -> Self {
        self.ips.ipv6.clear();
        self
    }

    pub fn build(self) -> Ips {
        self.ips
    }
}

#[derive(Debug, Clone)]
pub struct LocationBuilder {
    location: Location,
}

impl Default for LocationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationBuilder {
    pub fn new() -> Self {
        Self {
            location: Location {
                id: 1,
                name: "AMS Amsterdam".to_string(),
                iata_code: "AMS".to_string(),
                continent: "EU".to_string(),
                flag: "🇳🇱".to_string(),
                disabled: 0,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.location.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.location.name = name.into();
        self
    }

    pub fn with_iata_code(mut self, code: impl Into<String>) -> Self {
        self.location.iata_code = code.into();
        self
    }

    pub fn with_continent(mut self, continent: impl Into<String>) -> Self {
        self.location.continent = continent.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.location.disabled = 1;
        self
    }

    pub fn build(self) -> Location {
        self.location
    }
}

#[derive(Debug, Clone)]
pub struct OsBuilder {
    os: Os,
}

impl Default for OsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OsBuilder {
    pub fn new() -> Self {
        Self {
            os: Os {
                id: 1,
                name: "Ubuntu 22.04 LTS".to_string(),
                os_type: "linux".to_string(),
                subtype: "ubuntu".to_string(),
                size: "10GB".to_string(),
                bits: "64".to_string(),
                tech: "kvm".to_string(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.os.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.os.name = name.into();
        self
    }

    pub fn with_type(mut self, os_type: impl Into<String>) -> Self {
        self.os.os_type = os_type.into();
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.os.subtype = subtype.into();
        self
    }

    pub fn build(self) -> Os {
        self.os
    }
}

// Shorthands

pub fn test_server(id: i64, name: &str) -> Server {
    ServerBuilder::new().with_id(id).with_name(name).build()
}

pub fn test_running_server(id: i64) -> Server {
    ServerBuilder::new()
        .with_id(id)
        .with_name(format!("server-{}.example.com", id))
        .with_status(STATUS_RUNNING)
        .build()
}

pub fn test_terminated_server(id: i64) -> Server {
    ServerBuilder::new()
        .with_id(id)
        .with_status(STATUS_TERMINATED)
        .build()
}

pub fn test_ssh_key(id: i64, name: &str) -> SshKey {
    SshKeyBuilder::new().with_id(id).with_name(name).build()
}

pub fn test_bgp_session(id: i64) -> Arc<BgpSession> {
    BgpSessionBuilder::new().with_id(id).build_arc()
}

pub fn test_bgp_session_ipv6(id: i64) -> Arc<BgpSession> {
    BgpSessionBuilder::new().with_id(id).with_ipv6().build_arc()
}

pub fn test_location(id: i64, name: &str) -> Location {
    LocationBuilder::new().with_id(id).with_name(name).build()
}

pub fn test_os(id: i64, name: &str) -> Os {
    OsBuilder::new().with_id(id).with_name(name).build()
}

/// One primary address per family, derived from the server id.
pub fn test_ips(server_id: i64) -> Ips {
    IpsBuilder::new()
        .clear_ipv4()
        .clear_ipv6()
        .add_ipv4(
            &format!("192.0.2.{}", server_id % 256),
            "192.0.2.1",
            "255.255.255.0",
            true,
        )
        .add_ipv6(
            &format!("2001:db8::{:x}", server_id),
            "2001:db8::1",
            "ffff:ffff:ffff:ffff::",
            true,
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder_defaults() {
        let server = ServerBuilder::new().build();
        assert_eq!(server.id, 1000);
        assert_eq!(server.name, "test-server.example.com");
        assert!(server.is_running());
        assert_eq!(server.installed, 1);
    }

    #[test]
    fn test_server_builder_chain() {
        let server = ServerBuilder::new()
            .with_id(123)
            .with_name("web.example.com")
            .with_location("LAX Los Angeles", 2)
            .with_os("Debian 12", 2)
            .with_package_billing("contract", "c-1")
            .build();

        assert_eq!(server.id, 123);
        assert_eq!(server.location_id, 2);
        assert_eq!(server.os, "Debian 12");
        assert_eq!(server.package_billing_contract_id, "c-1");
    }

    #[test]
    fn test_not_installed_clears_identity() {
        let server = ServerBuilder::new().not_installed().build();
        assert_eq!(server.installed, 0);
        assert!(server.name.is_empty());
        assert!(server.os.is_empty());
    }

    #[test]
    fn test_terminated_server() {
        assert!(super::test_terminated_server(5).is_terminated());
        assert_eq!(test_running_server(5).name, "server-5.example.com");
    }

    #[test]
    fn test_bgp_session_ipv6() {
        let session = super::test_bgp_session_ipv6(501);
        assert_eq!(session.id, 501);
        assert_eq!(session.provider_ip_type, "IPv6");
        assert!(session.customer_ip.contains(':'));
        assert!(session.provider_peer_ip.contains(':'));
    }

    #[test]
    fn test_ips_builder_numbers_per_family() {
        let ips = IpsBuilder::new()
            .add_ipv4("192.0.2.101", "192.0.2.1", "255.255.255.0", false)
            .build();

        assert_eq!(ips.ipv4.len(), 2);
        assert_eq!(ips.ipv4[1].id, 2);
        assert!(!ips.ipv4[1].is_primary());
        assert_eq!(ips.ipv6.len(), 1);
    }

    #[test]
    fn test_test_ips() {
        let ips = test_ips(1000);
        assert_eq!(ips.ipv4[0].address, "192.0.2.232");
        assert_eq!(ips.ipv6[0].address, "2001:db8::3e8");
        assert!(ips.ipv4[0].is_primary());
    }

    #[test]
    fn test_reference_builders() {
        let location = LocationBuilder::new()
            .with_id(9)
            .with_name("FRA Frankfurt")
            .with_iata_code("FRA")
            .disabled()
            .build();
        assert_eq!(location.disabled, 1);
        assert_eq!(location.iata_code, "FRA");

        let os = test_os(4, "Alpine 3.20");
        assert_eq!(os.id, 4);
        assert_eq!(os.os_type, "linux");
        assert_eq!(test_location(2, "LAX").name, "LAX");
        assert_eq!(test_ssh_key(3, "k").id, 3);
        assert_eq!(test_server(7, "s").name, "s");
        assert_eq!(test_bgp_session(8).provider_ip_type, "IPv4");
    }
}
