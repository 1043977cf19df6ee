//! Serves several provider implementations as one provider
//!
//! Every member must declare the same provider block. Provider-level calls go
//! to every member; resources and data sources are merged into one registry,
//! so each type name must belong to exactly one member.

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::framework::FrameworkProvider;
use crate::sdk::SdkProvider;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::{Diagnostic, Diagnostics, Provider};
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;

/// A provider that can sit behind [`MuxProvider`]
///
/// Object-safe view of a [`Provider`] whose config is [`ProviderConfig`].
#[async_trait]
pub trait MuxMember: Send + Sync {
    fn provider_schema(&self, diags: &mut Diagnostics) -> Option<Schema>;

    async fn validate_config(&self, diags: &mut Diagnostics, config: ProviderConfig)
    -> Option<()>;

    async fn configure_client(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: ProviderConfig,
    ) -> Option<()>;

    fn resources(&self, diags: &mut Diagnostics)
    -> Option<HashMap<String, Box<dyn DynamicResource>>>;

    fn data_sources(
        &self,
        diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>>;
}

macro_rules! mux_member {
    ($($provider:ty),+ $(,)?) => {$(
        #[::async_trait::async_trait]
        impl $crate::mux::MuxMember for $provider {
            fn provider_schema(
                &self,
                diags: &mut ::tf_provider::Diagnostics,
            ) -> Option<::tf_provider::schema::Schema> {
                <$provider as ::tf_provider::Provider>::schema(self, diags)
            }

            async fn validate_config(
                &self,
                diags: &mut ::tf_provider::Diagnostics,
                config: $crate::config::ProviderConfig,
            ) -> Option<()> {
                <$provider as ::tf_provider::Provider>::validate(self, diags, config).await
            }

            async fn configure_client(
                &self,
                diags: &mut ::tf_provider::Diagnostics,
                terraform_version: String,
                config: $crate::config::ProviderConfig,
            ) -> Option<()> {
                <$provider as ::tf_provider::Provider>::configure(
                    self,
                    diags,
                    terraform_version,
                    config,
                )
                .await
            }

            fn resources(
                &self,
                diags: &mut ::tf_provider::Diagnostics,
            ) -> Option<
                ::std::collections::HashMap<
                    String,
                    Box<dyn ::tf_provider::DynamicResource>,
                >,
            > {
                <$provider as ::tf_provider::Provider>::get_resources(self, diags)
            }

            fn data_sources(
                &self,
                diags: &mut ::tf_provider::Diagnostics,
            ) -> Option<
                ::std::collections::HashMap<
                    String,
                    Box<dyn ::tf_provider::DynamicDataSource>,
                >,
            > {
                <$provider as ::tf_provider::Provider>::get_data_sources(self, diags)
            }
        }
    )+};
}

mux_member!(SdkProvider, FrameworkProvider);

/// Attribute name to (type, sensitive)
fn signature(schema: &Schema) -> BTreeMap<String, (String, bool)> {
    schema
        .block
        .attributes
        .iter()
        .map(|(name, attr)| (name.clone(), (format!("{:?}", attr.attr_type), attr.sensitive)))
        .collect()
}

fn merge_unique(into: &mut Vec<Diagnostic>, from: Vec<Diagnostic>) {
    for diag in from {
        let seen = into
            .iter()
            .any(|d| d.summary == diag.summary && d.detail == diag.detail);
        if !seen {
            into.push(diag);
        }
    }
}

/// Fold a member's diagnostics into `diags`, dropping repeats.
fn merge(diags: &mut Diagnostics, member: Diagnostics) {
    merge_unique(&mut diags.errors, member.errors);
    merge_unique(&mut diags.warnings, member.warnings);
}

pub struct MuxProvider {
    members: Vec<Box<dyn MuxMember>>,
}

impl std::fmt::Debug for MuxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxProvider")
            .field("members", &self.members.len())
            .finish()
    }
}

impl MuxProvider {
    pub fn new(members: Vec<Box<dyn MuxMember>>) -> Result<Self> {
        let mut expected = None;
        let mut resources = HashSet::new();
        let mut data_sources = HashSet::new();

        for (index, member) in members.iter().enumerate() {
            let mut diags = Diagnostics::default();
            let schema = member
                .provider_schema(&mut diags)
                .ok_or(ProviderError::MissingSchema(index))?;
            let actual = signature(&schema);
            match &expected {
                None => expected = Some(actual),
                Some(first) if *first != actual => {
                    return Err(ProviderError::ProviderSchemaMismatch(format!(
                        "server {} declares attributes {:?}, expected {:?}",
                        index, actual, first
                    )));
                }
                Some(_) => {}
            }

            for name in member.resources(&mut diags).unwrap_or_default().into_keys() {
                if !resources.insert(name.clone()) {
                    return Err(ProviderError::DuplicateResourceType(name));
                }
            }
            for name in member.data_sources(&mut diags).unwrap_or_default().into_keys() {
                if !data_sources.insert(name.clone()) {
                    return Err(ProviderError::DuplicateDataSourceType(name));
                }
            }
        }

        if expected.is_none() {
            return Err(ProviderError::NoMembers);
        }
        tracing::debug!(
            servers = members.len(),
            resources = resources.len(),
            data_sources = data_sources.len(),
            "Created provider mux"
        );
        Ok(Self { members })
    }
}

#[async_trait]
impl Provider for MuxProvider {
    type Config<'a> = ProviderConfig;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, diags: &mut Diagnostics) -> Option<Schema> {
        self.members.first()?.provider_schema(diags)
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        let mut ok = true;
        for member in &self.members {
            let mut member_diags = Diagnostics::default();
            ok &= member
                .validate_config(&mut member_diags, config.clone())
                .await
                .is_some();
            merge(diags, member_diags);
        }
        ok.then_some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let mut ok = true;
        for member in &self.members {
            let mut member_diags = Diagnostics::default();
            ok &= member
                .configure_client(&mut member_diags, terraform_version.clone(), config.clone())
                .await
                .is_some();
            merge(diags, member_diags);
        }
        ok.then_some(())
    }

    fn get_resources(
        &self,
        diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let mut resources = HashMap::new();
        for member in &self.members {
            for (name, resource) in member.resources(diags)? {
                if resources.contains_key(&name) {
                    diags.root_error(
                        "Duplicate resource type",
                        format!("{} is implemented by more than one provider server", name),
                    );
                    return None;
                }
                resources.insert(name, resource);
            }
        }
        Some(resources)
    }

    fn get_data_sources(
        &self,
        diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        let mut data_sources = HashMap::new();
        for member in &self.members {
            for (name, data_source) in member.data_sources(diags)? {
                if data_sources.contains_key(&name) {
                    diags.root_error(
                        "Duplicate data source type",
                        format!("{} is implemented by more than one provider server", name),
                    );
                    return None;
                }
                data_sources.insert(name, data_source);
            }
        }
        Some(data_sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_ENV, provider_schema};
    use crate::provider::{ClientSlot, attribute};
    use crate::sdk::BgpSessionsResource;
    use netactuate_cloud::FakeClient;
    use serial_test::serial;
    use std::sync::Arc;
    use tf_provider::map;
    use tf_provider::schema::{AttributeConstraint, AttributeType, Block};

    /// Provider with a fixed schema and at most one resource
    #[derive(Debug)]
    struct Stub {
        schema: fn() -> Schema,
        resource: Option<&'static str>,
        validate_error: Option<&'static str>,
    }

    impl Stub {
        fn new() -> Self {
            Self {
                schema: provider_schema,
                resource: None,
                validate_error: None,
            }
        }
    }

    #[async_trait]
    impl Provider for Stub {
        type Config<'a> = ProviderConfig;
        type MetaState<'a> = ValueEmpty;

        fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
            Some((self.schema)())
        }

        async fn validate<'a>(
            &self,
            diags: &mut Diagnostics,
            _config: Self::Config<'a>,
        ) -> Option<()> {
            match self.validate_error {
                Some(summary) => {
                    diags.root_error(summary, String::new());
                    None
                }
                None => Some(()),
            }
        }

        async fn configure<'a>(
            &self,
            _diags: &mut Diagnostics,
            _terraform_version: String,
            _config: Self::Config<'a>,
        ) -> Option<()> {
            Some(())
        }

        fn get_resources(
            &self,
            _diags: &mut Diagnostics,
        ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
            let mut resources: HashMap<String, Box<dyn DynamicResource>> = HashMap::new();
            if let Some(name) = self.resource {
                let resource = BgpSessionsResource::new(Arc::new(ClientSlot::default()));
                resources.insert(name.to_string(), resource.into());
            }
            Some(resources)
        }

        fn get_data_sources(
            &self,
            _diags: &mut Diagnostics,
        ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
            Some(HashMap::new())
        }
    }

    mux_member!(Stub);

    fn sdk() -> Box<dyn MuxMember> {
        Box::new(SdkProvider::with_client("test", Arc::new(FakeClient::new())))
    }

    fn framework() -> Box<dyn MuxMember> {
        Box::new(FrameworkProvider::new("test"))
    }

    fn token_schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "token" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "API token",
                    ),
                },
                ..Default::default()
            },
        }
    }

    fn plain_key_schema() -> Schema {
        let mut schema = provider_schema();
        if let Some(api_key) = schema.block.attributes.get_mut("api_key") {
            api_key.sensitive = false;
        }
        schema
    }

    #[test]
    fn test_mux_combines_members() {
        let mux = MuxProvider::new(vec![sdk(), framework()]).unwrap();
        let mut diags = Diagnostics::default();

        assert_eq!(mux.get_resources(&mut diags).unwrap().len(), 3);
        assert_eq!(mux.get_data_sources(&mut diags).unwrap().len(), 3);
        let schema = mux.schema(&mut diags).unwrap();
        assert!(schema.block.attributes["api_key"].sensitive);
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn test_duplicate_resource_type() {
        let stub = Stub {
            resource: Some("server"),
            ..Stub::new()
        };
        let result = MuxProvider::new(vec![sdk(), Box::new(stub)]);
        assert_eq!(
            result.err(),
            Some(ProviderError::DuplicateResourceType("server".to_string()))
        );

        let stub = Stub {
            resource: Some("vpc"),
            ..Stub::new()
        };
        let mux = MuxProvider::new(vec![sdk(), Box::new(stub)]).unwrap();
        let resources = mux.get_resources(&mut Diagnostics::default()).unwrap();
        assert!(resources.contains_key("vpc"));
        assert_eq!(resources.len(), 4);
    }

    #[test]
    fn test_provider_schema_mismatch() {
        let stub = Stub {
            schema: token_schema,
            ..Stub::new()
        };
        let result = MuxProvider::new(vec![sdk(), Box::new(stub)]);
        assert!(matches!(result, Err(ProviderError::ProviderSchemaMismatch(_))));
    }

    #[test]
    fn test_sensitivity_is_part_of_the_schema() {
        let stub = Stub {
            schema: plain_key_schema,
            ..Stub::new()
        };
        let result = MuxProvider::new(vec![framework(), Box::new(stub)]);
        assert!(matches!(result, Err(ProviderError::ProviderSchemaMismatch(_))));
    }

    #[test]
    fn test_no_members() {
        assert_eq!(MuxProvider::new(Vec::new()).err(), Some(ProviderError::NoMembers));
    }

    #[tokio::test]
    async fn test_validate_reports_member_errors() {
        let stub = Stub {
            validate_error: Some("api_url is malformed"),
            ..Stub::new()
        };
        let mux = MuxProvider::new(vec![sdk(), Box::new(stub)]).unwrap();

        let mut diags = Diagnostics::default();
        let validated = mux.validate(&mut diags, ProviderConfig::default()).await;
        assert!(validated.is_none());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "api_url is malformed");
    }

    #[tokio::test]
    #[serial]
    async fn test_configure_dedupes_diagnostics() {
        let members: Vec<Box<dyn MuxMember>> =
            vec![Box::new(SdkProvider::new("test")), framework()];
        let mux = MuxProvider::new(members).unwrap();

        let mut diags = Diagnostics::default();
        let configured = temp_env::async_with_vars([(API_KEY_ENV, None::<&str>)], async {
            mux.configure(&mut diags, "1.9.0".to_string(), ProviderConfig::default())
                .await
        })
        .await;
        assert!(configured.is_none());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Unable to create NetActuate API client");
    }

    #[tokio::test]
    #[serial]
    async fn test_configure_with_key() {
        let members: Vec<Box<dyn MuxMember>> =
            vec![Box::new(SdkProvider::new("test")), framework()];
        let mux = MuxProvider::new(members).unwrap();

        let mut diags = Diagnostics::default();
        let config = ProviderConfig::new(Some("k"), Some("http://127.0.0.1:1/"));
        let configured = mux.configure(&mut diags, "1.9.0".to_string(), config).await;
        assert!(configured.is_some());
        assert!(diags.errors.is_empty());
    }
}
