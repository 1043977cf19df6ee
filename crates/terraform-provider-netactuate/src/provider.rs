//! Pieces shared by both provider implementations

use netactuate_cloud::{ApiError, NetActuateApi};
use std::sync::{Arc, RwLock};
use tf_provider::Diagnostics;
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};

/// Registry name of the provider
pub const PROVIDER_TYPE_NAME: &str = "netactuate";

/// The API client set when the provider is configured
///
/// Resources are handed out before Terraform configures the provider, so
/// they share the slot rather than the client.
#[derive(Default)]
pub struct ClientSlot(RwLock<Option<Arc<dyn NetActuateApi>>>);

impl std::fmt::Debug for ClientSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClientSlot")
            .field(&self.is_configured())
            .finish()
    }
}

impl ClientSlot {
    pub fn new(client: Arc<dyn NetActuateApi>) -> Self {
        Self(RwLock::new(Some(client)))
    }

    pub fn set(&self, client: Arc<dyn NetActuateApi>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = Some(client);
    }

    pub fn is_configured(&self) -> bool {
        self.0.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// The configured client, or an error diagnostic for calling too early.
    pub fn get(&self, diags: &mut Diagnostics) -> Option<Arc<dyn NetActuateApi>> {
        let client = self.0.read().unwrap_or_else(|e| e.into_inner()).clone();
        if client.is_none() {
            diags.root_error(
                "Provider not configured",
                "The provider must be configured before resources can be managed",
            );
        }
        client
    }
}

/// Report a failed API call.
pub fn api_error(diags: &mut Diagnostics, err: &ApiError) {
    diags.root_error(err.to_string(), String::new());
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        sensitive: false,
        deprecated: false,
    }
}

pub(crate) fn sensitive(attribute: Attribute) -> Attribute {
    Attribute {
        sensitive: true,
        ..attribute
    }
}
