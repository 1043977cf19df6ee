//! Terraform provider for NetActuate
//!
//! Two provider implementations are served as one through [`mux::MuxProvider`]:
//!
//! - **`SdkProvider`**: hosts the `netactuate_server`, `netactuate_sshkey`
//!   and `netactuate_bgp_sessions` resources and data sources
//! - **`FrameworkProvider`**: typed-model provider that shares the provider
//!   configuration but hosts nothing yet
//!
//! The plugin protocol itself is handled by `tf_provider`. Both providers
//! talk to NetActuate through [`netactuate_cloud::NetActuateApi`], so every
//! resource can be tested against the fake or mock backend.

pub mod config;
pub mod error;
pub mod framework;
pub mod mux;
pub mod provider;
pub mod sdk;
pub mod state;

pub const PROVIDER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports
pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use framework::FrameworkProvider;
pub use mux::{MuxMember, MuxProvider};
pub use provider::ClientSlot;
pub use sdk::SdkProvider;
