//! NetActuate API client trait definition

use crate::error::Result;
use crate::model::{
    BgpSession, BuildServerRequest, CreateServerRequest, Ips, Location, Os, Server, ServerBuild,
    SshKey,
};
use async_trait::async_trait;
use std::sync::Arc;

/// The capability set the provider uses from the NetActuate API
///
/// The HTTP client, [`FakeClient`](crate::FakeClient) and
/// [`MockClient`](crate::MockClient) all implement this trait, which is what
/// lets resources run without network access in tests. Cancellation is done by
/// dropping the returned future.
#[async_trait]
pub trait NetActuateApi: Send + Sync {
    // Server operations
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerBuild>;
    async fn get_server(&self, id: i64) -> Result<Server>;
    async fn build_server(&self, id: i64, request: &BuildServerRequest) -> Result<ServerBuild>;
    async fn delete_server(&self, id: i64, cancel_billing: bool) -> Result<()>;
    async fn unlink_server(&self, id: i64) -> Result<()>;

    // SSH key operations
    async fn create_ssh_key(&self, name: &str, key: &str) -> Result<SshKey>;
    async fn get_ssh_key(&self, id: i64) -> Result<SshKey>;
    async fn delete_ssh_key(&self, id: i64) -> Result<()>;

    // BGP session operations
    async fn create_bgp_sessions(
        &self,
        server_id: i64,
        group_id: i64,
        is_ipv6: bool,
        redundant: bool,
    ) -> Result<Arc<BgpSession>>;
    async fn get_bgp_sessions(&self, server_id: i64) -> Result<Vec<Arc<BgpSession>>>;

    // IP operations
    async fn get_ips(&self, server_id: i64) -> Result<Ips>;

    // Metadata operations
    async fn get_locations(&self) -> Result<Vec<Location>>;
    async fn get_oss(&self) -> Result<Vec<Os>>;
}

/// One entry per [`NetActuateApi`] method
///
/// Displays as the API method name, which is how call logs and
/// not-configured errors refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateServer,
    GetServer,
    BuildServer,
    DeleteServer,
    UnlinkServer,
    CreateSshKey,
    GetSshKey,
    DeleteSshKey,
    CreateBgpSessions,
    GetBgpSessions,
    GetIps,
    GetLocations,
    GetOss,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::CreateServer,
        Operation::GetServer,
        Operation::BuildServer,
        Operation::DeleteServer,
        Operation::UnlinkServer,
        Operation::CreateSshKey,
        Operation::GetSshKey,
        Operation::DeleteSshKey,
        Operation::CreateBgpSessions,
        Operation::GetBgpSessions,
        Operation::GetIps,
        Operation::GetLocations,
        Operation::GetOss,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateServer => "CreateServer",
            Operation::GetServer => "GetServer",
            Operation::BuildServer => "BuildServer",
            Operation::DeleteServer => "DeleteServer",
            Operation::UnlinkServer => "UnlinkServer",
            Operation::CreateSshKey => "CreateSSHKey",
            Operation::GetSshKey => "GetSSHKey",
            Operation::DeleteSshKey => "DeleteSSHKey",
            Operation::CreateBgpSessions => "CreateBGPSessions",
            Operation::GetBgpSessions => "GetBGPSessions",
            Operation::GetIps => "GetIPs",
            Operation::GetLocations => "GetLocations",
            Operation::GetOss => "GetOSs",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Formats a call-log entry as `Name(arg, arg)`, or just `Name` without args.
pub(crate) fn call_entry(op: Operation, args: &[&dyn std::fmt::Display]) -> String {
    if args.is_empty() {
        return op.name().to_string();
    }
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("{}({})", op.name(), args.join(", "))
}
