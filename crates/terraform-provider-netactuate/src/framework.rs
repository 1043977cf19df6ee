//! Typed-model provider
//!
//! Second provider implementation served next to [`SdkProvider`](crate::sdk::SdkProvider)
//! through the mux. It decodes the provider block into [`ProviderConfig`] and
//! builds its own client, but does not host any resources or data sources yet.

use crate::config::{ProviderConfig, provider_schema};
use crate::provider::{ClientSlot, PROVIDER_TYPE_NAME};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::{Diagnostics, Provider};
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;

#[derive(Debug)]
pub struct FrameworkProvider {
    version: String,
    client: ClientSlot,
}

impl FrameworkProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            client: ClientSlot::default(),
        }
    }

    /// Type name and version, as reported to Terraform
    pub fn metadata(&self) -> (&'static str, &str) {
        (PROVIDER_TYPE_NAME, &self.version)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }
}

#[async_trait]
impl Provider for FrameworkProvider {
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
        _terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let client = config.build_client(diags)?;
        self.client.set(Arc::new(client));
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(HashMap::new())
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_ENV;
    use serial_test::serial;
    use tf_provider::schema::AttributeConstraint;

    async fn configure(provider: &FrameworkProvider, config: ProviderConfig) -> Diagnostics {
        let mut diags = Diagnostics::default();
        provider
            .configure(&mut diags, "1.9.0".to_string(), config)
            .await;
        diags
    }

    #[test]
    fn test_metadata() {
        let provider = FrameworkProvider::new("0.1.0");
        assert_eq!(provider.metadata(), ("netactuate", "0.1.0"));
    }

    #[test]
    fn test_schema() {
        let provider = FrameworkProvider::new("test");
        let mut diags = Diagnostics::default();
        assert!(provider.get_resources(&mut diags).unwrap().is_empty());
        assert!(provider.get_data_sources(&mut diags).unwrap().is_empty());

        let schema = provider.schema(&mut diags).unwrap();
        let api_key = &schema.block.attributes["api_key"];
        assert!(matches!(api_key.constraint, AttributeConstraint::Optional));
        assert!(api_key.sensitive);
        assert!(!schema.block.attributes["api_url"].sensitive);
    }

    #[tokio::test]
    #[serial]
    async fn test_configure() {
        let provider = FrameworkProvider::new("test");
        let diags = configure(&provider, ProviderConfig::new(Some("test-api-key"), None)).await;
        assert!(diags.errors.is_empty());
        assert!(provider.is_configured());
    }

    #[tokio::test]
    #[serial]
    async fn test_configure_from_environment() {
        let provider = FrameworkProvider::new("test");
        let diags = temp_env::async_with_vars([(API_KEY_ENV, Some("env-key"))], async {
            configure(&provider, ProviderConfig::default()).await
        })
        .await;
        assert!(diags.errors.is_empty());
        assert!(provider.is_configured());
    }

    #[tokio::test]
    #[serial]
    async fn test_configure_missing_key() {
        let provider = FrameworkProvider::new("test");
        let diags = temp_env::async_with_vars([(API_KEY_ENV, None::<&str>)], async {
            configure(&provider, ProviderConfig::default()).await
        })
        .await;
        assert_eq!(diags.errors[0].summary, "Unable to create NetActuate API client");
        assert!(!provider.is_configured());
    }
}
