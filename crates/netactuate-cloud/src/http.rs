//! NetActuate HTTP API client
//!
//! Thin reqwest wrapper: one request per operation, API key passed as the
//! `key` query parameter, no retries.

use crate::client::NetActuateApi;
use crate::error::{ApiError, Result};
use crate::model::{
    BgpSession, BuildServerRequest, CreateServerRequest, Ips, Location, Os, Server, ServerBuild,
    SshKey,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Production API base URL
pub const DEFAULT_API_URL: &str = "https://vapi2.netactuate.com/api/";

/// HTTP implementation of [`NetActuateApi`]
pub struct NetActuateClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NetActuateClient {
    /// Create a client against the production API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    /// Create a client against a custom API endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .query(&[("key", &self.api_key)])
            .send()
            .await?;
        unwrap_response(response.json().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await?;
        unwrap_response(response.json().await?)
    }

    async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        tracing::debug!(path, "DELETE");
        let response = self
            .client
            .delete(self.url(path))
            .query(&[("key", &self.api_key)])
            .query(query)
            .send()
            .await?;
        let api_response: ApiResponse<serde_json::Value> = response.json().await?;
        api_response.check()
    }
}

/// Response envelope used by every v2 endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: String,
    message: Option<String>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn check(&self) -> Result<()> {
        if self.result == "success" {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(ApiError::Api(message))
    }
}

fn unwrap_response<T>(api_response: ApiResponse<T>) -> Result<T> {
    api_response.check()?;
    api_response
        .data
        .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
}

#[derive(Serialize)]
struct CreateSshKeyBody<'a> {
    name: &'a str,
    ssh_key: &'a str,
}

#[derive(Serialize)]
struct CreateBgpSessionsBody {
    group_id: i64,
    ipv6: i64,
    redundant: i64,
}

#[async_trait]
impl NetActuateApi for NetActuateClient {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<ServerBuild> {
        let build: ServerBuild = self.post("cloud/server/buy_build", request).await?;
        tracing::info!(server_id = build.server_id, fqdn = %request.fqdn, "Server ordered");
        Ok(build)
    }

    async fn get_server(&self, id: i64) -> Result<Server> {
        self.get(&format!("cloud/server/{}", id)).await
    }

    async fn build_server(&self, id: i64, request: &BuildServerRequest) -> Result<ServerBuild> {
        self.post(&format!("cloud/server/build/{}", id), request)
            .await
    }

    async fn delete_server(&self, id: i64, cancel_billing: bool) -> Result<()> {
        let cancel = if cancel_billing { "1" } else { "0" };
        self.delete(
            &format!("cloud/server/delete/{}", id),
            &[("cancel_billing", cancel.to_string())],
        )
        .await
    }

    async fn unlink_server(&self, id: i64) -> Result<()> {
        self.delete(&format!("cloud/server/unlink/{}", id), &[])
            .await
    }

    async fn create_ssh_key(&self, name: &str, key: &str) -> Result<SshKey> {
        self.post(
            "account/ssh_key",
            &CreateSshKeyBody { name, ssh_key: key },
        )
        .await
    }

    async fn get_ssh_key(&self, id: i64) -> Result<SshKey> {
        self.get(&format!("account/ssh_key/{}", id)).await
    }

    async fn delete_ssh_key(&self, id: i64) -> Result<()> {
        self.delete(&format!("account/ssh_key/{}", id), &[]).await
    }

    async fn create_bgp_sessions(
        &self,
        server_id: i64,
        group_id: i64,
        is_ipv6: bool,
        redundant: bool,
    ) -> Result<Arc<BgpSession>> {
        let body = CreateBgpSessionsBody {
            group_id,
            ipv6: i64::from(is_ipv6),
            redundant: i64::from(redundant),
        };
        let session: BgpSession = self
            .post(&format!("bgp/create_sessions/{}", server_id), &body)
            .await?;
        Ok(Arc::new(session))
    }

    async fn get_bgp_sessions(&self, server_id: i64) -> Result<Vec<Arc<BgpSession>>> {
        let sessions: Vec<BgpSession> = self.get(&format!("bgp/sessions/{}", server_id)).await?;
        Ok(sessions.into_iter().map(Arc::new).collect())
    }

    async fn get_ips(&self, server_id: i64) -> Result<Ips> {
        self.get(&format!("cloud/ips/{}", server_id)).await
    }

    async fn get_locations(&self) -> Result<Vec<Location>> {
        self.get("cloud/locations").await
    }

    async fn get_oss(&self) -> Result<Vec<Os>> {
        self.get("cloud/images").await
    }
}
