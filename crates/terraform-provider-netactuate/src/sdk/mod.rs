//! Resource-based provider
//!
//! Hosts every NetActuate resource and data source. Names are registered
//! without the `netactuate_` prefix; the plugin server adds it.

mod data_source_bgp_sessions;
mod data_source_server;
mod data_source_sshkey;
mod resource_bgp_sessions;
mod resource_server;
mod resource_sshkey;

pub use data_source_bgp_sessions::{BgpSessionsDataSource, BgpSessionsLookup, SessionState};
pub use data_source_server::{ServerDataSource, ServerLookup};
pub use data_source_sshkey::{SshKeyDataSource, SshKeyLookup};
pub use resource_bgp_sessions::{BgpSessionsResource, BgpSessionsState};
pub use resource_server::{HOSTNAME_PATTERN, ServerResource, ServerState, is_valid_hostname};
pub use resource_sshkey::{SshKeyResource, SshKeyState};

use crate::config::{ProviderConfig, provider_schema};
use crate::provider::ClientSlot;
use async_trait::async_trait;
use netactuate_cloud::NetActuateApi;
use std::collections::HashMap;
use std::sync::Arc;
use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::{Diagnostics, Provider, map};
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;

#[derive(Debug, Clone)]
pub struct SdkProvider {
    version: String,
    client: Arc<ClientSlot>,
}

impl SdkProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            client: Arc::default(),
        }
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(version: impl Into<String>, client: Arc<dyn NetActuateApi>) -> Self {
        let provider = Self::new(version);
        provider.client.set(client);
        provider
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }
}

#[async_trait]
impl Provider for SdkProvider {
    type Config<'a> = ProviderConfig;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(provider_schema())
    }

    async fn validate<'a>(
        &self,
        _diags: &mut Diagnostics,
        _config: Self::Config<'a>,
    ) -> Option<()> {
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let client = config.build_client(diags)?;
        tracing::info!(
            version = %self.version,
            terraform_version = %terraform_version,
            "Configured NetActuate provider"
        );
        self.client.set(Arc::new(client));
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(map! {
            "server" => ServerResource::new(self.client.clone()),
            "sshkey" => SshKeyResource::new(self.client.clone()),
            "bgp_sessions" => BgpSessionsResource::new(self.client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(map! {
            "server" => ServerDataSource::new(self.client.clone()),
            "sshkey" => SshKeyDataSource::new(self.client.clone()),
            "bgp_sessions" => BgpSessionsDataSource::new(self.client.clone()),
        })
    }
}
