//! NetActuate cloud API
//!
//! This crate provides the narrow client interface the Terraform provider
//! talks through, together with its implementations:
//!
//! - **`NetActuateClient`**: HTTP client against the NetActuate API
//! - **`FakeClient`**: stateful in-memory backend for integration-style tests
//! - **`MockClient`**: per-call configurable backend for unit tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │          terraform-provider-netactuate           │
//! │   resources / data sources / provider config     │
//! └─────────────────┬───────────────────────────────┘
//!                   │  &dyn NetActuateApi
//! ┌─────────────────▼───────────────────────────────┐
//! │                netactuate-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait NetActuateApi { ... }        │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬──────────────┬────────┘
//!         │                 │              │
//! ┌───────▼───────┐ ┌───────▼──────┐ ┌─────▼──────┐
//! │  HTTP client  │ │  FakeClient  │ │ MockClient │
//! └───────────────┘ └──────────────┘ └────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use netactuate_cloud::{CreateServerRequest, FakeClient, NetActuateApi};
//!
//! let fake = FakeClient::new();
//! let build = fake
//!     .create_server(&CreateServerRequest {
//!         fqdn: "test.example.com".to_string(),
//!         location: 1,
//!         image: 1,
//!         ..Default::default()
//!     })
//!     .await?;
//! let server = fake.get_server(build.server_id).await?;
//! assert_eq!(server.location, "AMS Amsterdam");
//! ```

pub mod builders;
pub mod client;
pub mod error;
pub mod fake;
pub mod http;
pub mod mock;
pub mod model;

// Re-exports
pub use client::{NetActuateApi, Operation};
pub use error::{ApiError, ResourceKind, Result};
pub use fake::FakeClient;
pub use http::{DEFAULT_API_URL, NetActuateClient};
pub use mock::MockClient;
pub use model::{
    BgpSession, BuildServerRequest, CreateServerRequest, Ip, Ips, Location, Os, Server,
    ServerBuild, SshKey,
};
