//! Hook-driven mock of the NetActuate API
//!
//! Each operation answers through an optional closure set with the matching
//! `with_*` method. Operations without a hook fail with
//! [`ApiError::NotConfigured`].
//!
//! ```ignore
//! let mock = MockClient::new().with_get_server(|id| {
//!     Ok(Server { id, server_status: "RUNNING".into(), ..Default::default() })
//! });
//! ```

use crate::client::{NetActuateApi, Operation, call_entry};
use crate::error::{ApiError, Result};
use crate::model::{
    BgpSession, BuildServerRequest, CreateServerRequest, Ips, Location, Os, Server, ServerBuild,
    SshKey,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Hook<A, T> = Box<dyn Fn(A) -> Result<T> + Send + Sync>;

/// Per-call configurable implementation of [`NetActuateApi`]
#[derive(Default)]
pub struct MockClient {
    create_server: Option<Hook<CreateServerRequest, ServerBuild>>,
    get_server: Option<Hook<i64, Server>>,
    build_server: Option<Hook<(i64, BuildServerRequest), ServerBuild>>,
    delete_server: Option<Hook<(i64, bool), ()>>,
    unlink_server: Option<Hook<i64, ()>>,

    create_ssh_key: Option<Hook<(String, String), SshKey>>,
    get_ssh_key: Option<Hook<i64, SshKey>>,
    delete_ssh_key: Option<Hook<i64, ()>>,

    create_bgp_sessions: Option<Hook<(i64, i64, bool, bool), Arc<BgpSession>>>,
    get_bgp_sessions: Option<Hook<i64, Vec<Arc<BgpSession>>>>,

    get_ips: Option<Hook<i64, Ips>>,

    get_locations: Option<Hook<(), Vec<Location>>>,
    get_oss: Option<Hook<(), Vec<Os>>>,

    calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_server<F>(mut self, f: F) -> Self
    where
        F: Fn(CreateServerRequest) -> Result<ServerBuild> + Send + Sync + 'static,
    {
        self.create_server = Some(Box::new(f));
        self
    }

    pub fn with_get_server<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<Server> + Send + Sync + 'static,
    {
        self.get_server = Some(Box::new(f));
        self
    }

    pub fn with_build_server<F>(mut self, f: F) -> Self
    where
        F: Fn(i64, BuildServerRequest) -> Result<ServerBuild> + Send + Sync + 'static,
    {
        self.build_server = Some(Box::new(move |(id, request)| f(id, request)));
        self
    }

    pub fn with_delete_server<F>(mut self, f: F) -> Self
    where
        F: Fn(i64, bool) -> Result<()> + Send + Sync + 'static,
    {
        self.delete_server = Some(Box::new(move |(id, cancel_billing)| f(id, cancel_billing)));
        self
    }

    pub fn with_unlink_server<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<()> + Send + Sync + 'static,
    {
        self.unlink_server = Some(Box::new(f));
        self
    }

    pub fn with_create_ssh_key<F>(mut self, f: F) -> Self
    where
        F: Fn(String, String) -> Result<SshKey> + Send + Sync + 'static,
    {
        self.create_ssh_key = Some(Box::new(move |(name, key)| f(name, key)));
        self
    }

    pub fn with_get_ssh_key<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<SshKey> + Send + Sync + 'static,
    {
        self.get_ssh_key = Some(Box::new(f));
        self
    }

    pub fn with_delete_ssh_key<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<()> + Send + Sync + 'static,
    {
        self.delete_ssh_key = Some(Box::new(f));
        self
    }

    pub fn with_create_bgp_sessions<F>(mut self, f: F) -> Self
    where
        F: Fn(i64, i64, bool, bool) -> Result<Arc<BgpSession>> + Send + Sync + 'static,
    {
        self.create_bgp_sessions = Some(Box::new(move |(server_id, group_id, ipv6, redundant)| {
            f(server_id, group_id, ipv6, redundant)
        }));
        self
    }

    pub fn with_get_bgp_sessions<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<Vec<Arc<BgpSession>>> + Send + Sync + 'static,
    {
        self.get_bgp_sessions = Some(Box::new(f));
        self
    }

    pub fn with_get_ips<F>(mut self, f: F) -> Self
    where
        F: Fn(i64) -> Result<Ips> + Send + Sync + 'static,
    {
        self.get_ips = Some(Box::new(f));
        self
    }

    pub fn with_get_locations<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Vec<Location>> + Send + Sync + 'static,
    {
        self.get_locations = Some(Box::new(move |()| f()));
        self
    }

    pub fn with_get_oss<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Vec<Os>> + Send + Sync + 'static,
    {
        self.get_oss = Some(Box::new(move |()| f()));
        self
    }

    /// All logged calls, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.lock_calls().clone()
    }

    pub fn reset_calls(&self) {
        self.lock_calls().clear();
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn track(&self, op: Operation, args: &[&dyn std::fmt::Display]) {
        self.lock_calls().push(call_entry(op, args));
    }
}

fn dispatch<A, T>(op: Operation, hook: &Option<Hook<A, T>>, args: A) -> Result<T> {
    match hook {
        Some(f) => f(args),
        None => Err(ApiError::NotConfigured(op)),
    }
}

#[async_trait]
impl NetActuateApi for MockClient {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerBuild> {
        self.track(Operation::CreateServer, &[&request.fqdn]);
        dispatch(Operation::CreateServer, &self.create_server, request.clone())
    }

    async fn get_server(&self, id: i64) -> Result<Server> {
        self.track(Operation::GetServer, &[&id]);
        dispatch(Operation::GetServer, &self.get_server, id)
    }

    async fn build_server(&self, id: i64, request: &BuildServerRequest) -> Result<ServerBuild> {
        self.track(Operation::BuildServer, &[&id]);
        dispatch(
            Operation::BuildServer,
            &self.build_server,
            (id, request.clone()),
        )
    }

    async fn delete_server(&self, id: i64, cancel_billing: bool) -> Result<()> {
        self.track(Operation::DeleteServer, &[&id, &cancel_billing]);
        dispatch(
            Operation::DeleteServer,
            &self.delete_server,
            (id, cancel_billing),
        )
    }

    async fn unlink_server(&self, id: i64) -> Result<()> {
        self.track(Operation::UnlinkServer, &[&id]);
        dispatch(Operation::UnlinkServer, &self.unlink_server, id)
    }

    async fn create_ssh_key(&self, name: &str, key: &str) -> Result<SshKey> {
        self.track(Operation::CreateSshKey, &[&name]);
        dispatch(
            Operation::CreateSshKey,
            &self.create_ssh_key,
            (name.to_string(), key.to_string()),
        )
    }

    async fn get_ssh_key(&self, id: i64) -> Result<SshKey> {
        self.track(Operation::GetSshKey, &[&id]);
        dispatch(Operation::GetSshKey, &self.get_ssh_key, id)
    }

    async fn delete_ssh_key(&self, id: i64) -> Result<()> {
        self.track(Operation::DeleteSshKey, &[&id]);
        dispatch(Operation::DeleteSshKey, &self.delete_ssh_key, id)
    }

    async fn create_bgp_sessions(
        &self,
        server_id: i64,
        group_id: i64,
        is_ipv6: bool,
        redundant: bool,
    ) -> Result<Arc<BgpSession>> {
        self.track(
            Operation::CreateBgpSessions,
            &[&server_id, &group_id, &is_ipv6, &redundant],
        );
        dispatch(
            Operation::CreateBgpSessions,
            &self.create_bgp_sessions,
            (server_id, group_id, is_ipv6, redundant),
        )
    }

    async fn get_bgp_sessions(&self, server_id: i64) -> Result<Vec<Arc<BgpSession>>> {
        self.track(Operation::GetBgpSessions, &[&server_id]);
        dispatch(Operation::GetBgpSessions, &self.get_bgp_sessions, server_id)
    }

    async fn get_ips(&self, server_id: i64) -> Result<Ips> {
        self.track(Operation::GetIps, &[&server_id]);
        dispatch(Operation::GetIps, &self.get_ips, server_id)
    }

    async fn get_locations(&self) -> Result<Vec<Location>> {
        self.track(Operation::GetLocations, &[]);
        dispatch(Operation::GetLocations, &self.get_locations, ())
    }

    async fn get_oss(&self) -> Result<Vec<Os>> {
        self.track(Operation::GetOss, &[]);
        dispatch(Operation::GetOss, &self.get_oss, ())
    }
}
