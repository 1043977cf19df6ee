//! Provider configuration shared by both provider implementations

use crate::state::known;
use netactuate_cloud::NetActuateClient;
use serde::{Deserialize, Serialize};
use tf_provider::value::Value;
use tf_provider::{Diagnostics, map};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema};

/// Environment variable consulted when `api_key` is not configured
pub const API_KEY_ENV: &str = "NETACTUATE_API_KEY";

pub const MISSING_API_KEY_SUMMARY: &str = "Unable to create NetActuate API client";

const MISSING_API_KEY_DETAIL: &str = "Unable to find NetActuate API key. It can be set with either \
NETACTUATE_API_KEY environment variable or 'api_key' property";

/// The `provider "netactuate"` block
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Value<String>,
    pub api_url: Value<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &known(&self.api_key).map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_key: Option<&str>, api_url: Option<&str>) -> Self {
        let value = |v: Option<&str>| v.map_or(Value::Null, |v| Value::Value(v.to_string()));
        Self {
            api_key: value(api_key),
            api_url: value(api_url),
        }
    }

    /// The configured key, falling back to `NETACTUATE_API_KEY`.
    pub fn api_key(&self) -> String {
        match known(&self.api_key) {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var(API_KEY_ENV).unwrap_or_default(),
        }
    }

    pub fn api_url(&self) -> Option<&str> {
        known(&self.api_url)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Build the HTTP client, or report why not.
    pub fn build_client(&self, diags: &mut Diagnostics) -> Option<NetActuateClient> {
        let api_key = self.api_key();
        if api_key.is_empty() {
            diags.root_error(MISSING_API_KEY_SUMMARY, MISSING_API_KEY_DETAIL);
            return None;
        }

        let client = match self.api_url() {
            Some(url) => {
                tracing::info!(api_url = url, "Using custom NetActuate API URL");
                NetActuateClient::with_base_url(api_key, url)
            }
            None => NetActuateClient::new(api_key),
        };
        Some(client)
    }
}

/// Schema of the provider block. Both provider implementations declare it.
pub fn provider_schema() -> Schema {
    Schema {
        version: 1,
        block: Block {
            description: Description::plain("NetActuate"),
            attributes: map! {
                "api_key" => Attribute {
                    attr_type: AttributeType::String,
                    description: Description::plain(
                        "NetActuate API key. Can also be set with NETACTUATE_API_KEY \
                         environment variable.",
                    ),
                    constraint: AttributeConstraint::Optional,
                    sensitive: true,
                    deprecated: false,
                },
                "api_url" => Attribute {
                    attr_type: AttributeType::String,
                    description: Description::plain(
                        "NetActuate API URL. Optional, defaults to production API.",
                    ),
                    constraint: AttributeConstraint::Optional,
                    sensitive: false,
                    deprecated: false,
                },
            },
            ..Default::default()
        },
    }
}
