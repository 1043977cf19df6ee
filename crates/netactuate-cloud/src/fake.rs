//! In-memory fake of the NetActuate API
//!
//! `FakeClient` keeps servers, SSH keys, BGP sessions and IP allocations in
//! memory so resources can be exercised end to end without network access.
//!
//! # Example
//!
//! ```ignore
//! let fake = FakeClient::new();
//! fake.add_server(Server { id: 123, name: "test-server".into(), ..Default::default() });
//! let server = fake.get_server(123).await?;
//! ```

use crate::client::{NetActuateApi, Operation, call_entry};
use crate::error::{ApiError, Result};
use crate::model::{
    BgpSession, BuildServerRequest, CreateServerRequest, Ip, Ips, Location, Os, STATUS_RUNNING,
    STATUS_TERMINATED, Server, ServerBuild, SshKey,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const FIRST_SERVER_ID: i64 = 1000;
const FIRST_SSH_KEY_ID: i64 = 100;
const FIRST_BGP_SESSION_ID: i64 = 500;

const FAKE_PROVIDER_ASN: i64 = 64512;
const FAKE_CUSTOMER_ASN: i64 = 65000;

/// Stateful in-memory implementation of [`NetActuateApi`]
///
/// A single mutex guards all state, the call log and the injected errors.
/// Every call is logged before anything else happens, then an injected error
/// for that operation (if any) is returned before state is touched.
pub struct FakeClient {
    state: Mutex<FakeState>,
}

struct FakeState {
    servers: HashMap<i64, Server>,
    ssh_keys: HashMap<i64, SshKey>,
    bgp_sessions: HashMap<i64, Vec<Arc<BgpSession>>>,
    ips: HashMap<i64, Ips>,
    locations: Vec<Location>,
    oses: Vec<Os>,
    next_server_id: i64,
    next_ssh_key_id: i64,
    next_bgp_session_id: i64,
    errors: HashMap<Operation, ApiError>,
    calls: Vec<String>,
}

impl FakeState {
    /// Log the call, then surface an injected error if one is set.
    fn enter(&mut self, op: Operation, args: &[&dyn std::fmt::Display]) -> Result<()> {
        self.calls.push(call_entry(op, args));
        match self.errors.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn os_name(&self, id: i64) -> String {
        self.oses
            .iter()
            .find(|os| os.id == id)
            .map(|os| os.name.clone())
            .unwrap_or_default()
    }

    fn location_name(&self, id: i64) -> String {
        self.locations
            .iter()
            .find(|loc| loc.id == id)
            .map(|loc| loc.name.clone())
            .unwrap_or_default()
    }
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClient {
    /// Create a fake seeded with three locations and three operating systems.
    pub fn new() -> Self {
        let state = FakeState {
            servers: HashMap::new(),
            ssh_keys: HashMap::new(),
            bgp_sessions: HashMap::new(),
            ips: HashMap::new(),
            locations: vec![
                seed_location(1, "AMS Amsterdam", "AMS", "EU"),
                seed_location(2, "LAX Los Angeles", "LAX", "NA"),
                seed_location(3, "SJC San Jose", "SJC", "NA"),
            ],
            oses: vec![
                seed_os(1, "Ubuntu 22.04 LTS"),
                seed_os(2, "Debian 12"),
                seed_os(3, "Rocky Linux 9"),
            ],
            next_server_id: FIRST_SERVER_ID,
            next_ssh_key_id: FIRST_SSH_KEY_ID,
            next_bgp_session_id: FIRST_BGP_SESSION_ID,
            errors: HashMap::new(),
            calls: Vec::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // A panicking test thread must not take the remaining assertions down with it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent call to `op` fail with `err`.
    pub fn set_error(&self, op: Operation, err: ApiError) {
        self.lock().errors.insert(op, err);
    }

    pub fn clear_error(&self, op: Operation) {
        self.lock().errors.remove(&op);
    }

    /// Add a server to the fake's state.
    ///
    /// The id counter is advanced past the seeded id, so later
    /// `create_server` calls never reuse it.
    pub fn add_server(&self, server: Server) {
        let mut state = self.lock();
        state.next_server_id = state.next_server_id.max(server.id + 1);
        state.servers.insert(server.id, server);
    }

    pub fn add_ssh_key(&self, key: SshKey) {
        let mut state = self.lock();
        state.next_ssh_key_id = state.next_ssh_key_id.max(key.id + 1);
        state.ssh_keys.insert(key.id, key);
    }

    pub fn add_bgp_session(&self, server_id: i64, session: BgpSession) {
        let mut state = self.lock();
        state.next_bgp_session_id = state.next_bgp_session_id.max(session.id + 1);
        state
            .bgp_sessions
            .entry(server_id)
            .or_default()
            .push(Arc::new(session));
    }

    pub fn set_ips(&self, server_id: i64, ips: Ips) {
        self.lock().ips.insert(server_id, ips);
    }

    pub fn add_location(&self, location: Location) {
        self.lock().locations.push(location);
    }

    pub fn add_os(&self, os: Os) {
        self.lock().oses.push(os);
    }

    /// All logged calls, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl NetActuateApi for FakeClient {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerBuild> {
        let mut state = self.lock();
        state.enter(Operation::CreateServer, &[&request.fqdn])?;

        let id = state.next_server_id;
        state.next_server_id += 1;

        let server = Server {
            id,
            name: request.fqdn.clone(),
            os: state.os_name(request.image),
            os_id: request.image,
            primary_ipv4: default_ipv4(id),
            primary_ipv6: default_ipv6(id),
            plan_id: 1,
            package: request.plan.clone(),
            package_billing: request.package_billing.clone(),
            package_billing_contract_id: request.package_billing_contract_id.clone(),
            location: state.location_name(request.location),
            location_id: request.location,
            server_status: STATUS_RUNNING.to_string(),
            power_status: "on".to_string(),
            installed: 1,
            cloud_pool: String::new(),
        };
        state.servers.insert(id, server);

        tracing::debug!(server_id = id, "fake: created server");
        Ok(building(id))
    }

    async fn get_server(&self, id: i64) -> Result<Server> {
        let mut state = self.lock();
        state.enter(Operation::GetServer, &[&id])?;

        state
            .servers
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::server_not_found(id))
    }

    async fn build_server(&self, id: i64, request: &BuildServerRequest) -> Result<ServerBuild> {
        let mut state = self.lock();
        state.enter(Operation::BuildServer, &[&id])?;

        let os = state.os_name(request.image);
        let location = state.location_name(request.location);
        let server = state
            .servers
            .get_mut(&id)
            .ok_or_else(|| ApiError::server_not_found(id))?;

        server.name = request.fqdn.clone();
        server.os_id = request.image;
        server.os = os;
        server.location_id = request.location;
        server.location = location;
        server.package_billing = request.package_billing.clone();
        server.package_billing_contract_id = request.package_billing_contract_id.clone();
        server.server_status = STATUS_RUNNING.to_string();

        Ok(building(id))
    }

    async fn delete_server(&self, id: i64, cancel_billing: bool) -> Result<()> {
        let mut state = self.lock();
        state.enter(Operation::DeleteServer, &[&id, &cancel_billing])?;

        // Soft delete: the record stays around as TERMINATED
        let server = state
            .servers
            .get_mut(&id)
            .ok_or_else(|| ApiError::server_not_found(id))?;
        server.server_status = STATUS_TERMINATED.to_string();
        Ok(())
    }

    async fn unlink_server(&self, id: i64) -> Result<()> {
        let mut state = self.lock();
        state.enter(Operation::UnlinkServer, &[&id])?;

        state.servers.remove(&id);
        Ok(())
    }

    async fn create_ssh_key(&self, name: &str, key: &str) -> Result<SshKey> {
        let mut state = self.lock();
        state.enter(Operation::CreateSshKey, &[&name])?;

        let id = state.next_ssh_key_id;
        state.next_ssh_key_id += 1;

        let ssh_key = SshKey {
            id,
            name: name.to_string(),
            key: key.to_string(),
            fingerprint: format!("SHA256:fake-fingerprint-{}", id),
        };
        state.ssh_keys.insert(id, ssh_key.clone());
        Ok(ssh_key)
    }

    async fn get_ssh_key(&self, id: i64) -> Result<SshKey> {
        let mut state = self.lock();
        state.enter(Operation::GetSshKey, &[&id])?;

        state
            .ssh_keys
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::ssh_key_not_found(id))
    }

    async fn delete_ssh_key(&self, id: i64) -> Result<()> {
        let mut state = self.lock();
        state.enter(Operation::DeleteSshKey, &[&id])?;

        state
            .ssh_keys
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::ssh_key_not_found(id))
    }

    async fn create_bgp_sessions(
        &self,
        server_id: i64,
        group_id: i64,
        is_ipv6: bool,
        redundant: bool,
    ) -> Result<Arc<BgpSession>> {
        let mut state = self.lock();
        state.enter(
            Operation::CreateBgpSessions,
            &[&server_id, &group_id, &is_ipv6, &redundant],
        )?;

        let id = state.next_bgp_session_id;
        state.next_bgp_session_id += 1;

        let (ip_type, customer_ip) = if is_ipv6 {
            ("IPv6", format!("2001:db8:bgp::{:x}", id))
        } else {
            ("IPv4", format!("198.51.100.{}", id % 256))
        };

        let session = Arc::new(BgpSession {
            id,
            customer_ip,
            group_id,
            provider_ip_type: ip_type.to_string(),
            provider_asn: FAKE_PROVIDER_ASN,
            customer_asn: FAKE_CUSTOMER_ASN,
            state: "established".to_string(),
            config_status: 1,
            ..Default::default()
        });

        // Sessions are grouped by server id without checking the server exists
        state
            .bgp_sessions
            .entry(server_id)
            .or_default()
            .push(Arc::clone(&session));
        Ok(session)
    }

    async fn get_bgp_sessions(&self, server_id: i64) -> Result<Vec<Arc<BgpSession>>> {
        let mut state = self.lock();
        state.enter(Operation::GetBgpSessions, &[&server_id])?;

        Ok(state
            .bgp_sessions
            .get(&server_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_ips(&self, server_id: i64) -> Result<Ips> {
        let mut state = self.lock();
        state.enter(Operation::GetIps, &[&server_id])?;

        if let Some(ips) = state.ips.get(&server_id) {
            return Ok(ips.clone());
        }
        if state.servers.contains_key(&server_id) {
            return Ok(default_ips(server_id));
        }
        // Unknown servers yield an empty allocation rather than NotFound
        Ok(Ips::default())
    }

    async fn get_locations(&self) -> Result<Vec<Location>> {
        let mut state = self.lock();
        state.enter(Operation::GetLocations, &[])?;
        Ok(state.locations.clone())
    }

    async fn get_oss(&self) -> Result<Vec<Os>> {
        let mut state = self.lock();
        state.enter(Operation::GetOss, &[])?;
        Ok(state.oses.clone())
    }
}

fn building(server_id: i64) -> ServerBuild {
    ServerBuild {
        server_id,
        status: "building".to_string(),
        build: 1,
    }
}

// Deterministic, and colliding for ids 256 apart on IPv4
fn default_ipv4(id: i64) -> String {
    format!("192.0.2.{}", id % 256)
}

fn default_ipv6(id: i64) -> String {
    format!("2001:db8::{:x}", id)
}

fn default_ips(server_id: i64) -> Ips {
    Ips {
        ipv4: vec![Ip {
            id: 1,
            address: default_ipv4(server_id),
            primary: 1,
            gateway: "192.0.2.1".to_string(),
            netmask: "255.255.255.0".to_string(),
            ..Default::default()
        }],
        ipv6: vec![Ip {
            id: 2,
            address: default_ipv6(server_id),
            primary: 1,
            gateway: "2001:db8::1".to_string(),
            netmask: "ffff:ffff:ffff:ffff::".to_string(),
            ..Default::default()
        }],
    }
}

fn seed_location(id: i64, name: &str, iata_code: &str, continent: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
        iata_code: iata_code.to_string(),
        continent: continent.to_string(),
        ..Default::default()
    }
}

fn seed_os(id: i64, name: &str) -> Os {
    Os {
        id,
        name: name.to_string(),
        os_type: "linux".to_string(),
        bits: "64".to_string(),
        ..Default::default()
    }
}
