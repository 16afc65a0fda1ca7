//! # regprune Registry
//!
//! Client for the subset of the Docker Registry HTTP API v2 that retention
//! cleanup needs: listing tags, resolving a tag to its manifest digest, and
//! deleting a manifest by digest.
//!
//! The [`Registry`] trait is the seam the retention engine is written
//! against; [`RegistryClient`] is the HTTP implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regprune_registry::{Registry, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://registry.example.com/v2");
//!     let client = RegistryClient::new(config)?;
//!
//!     for tag in client.list_tags("apps/web").await? {
//!         let digest = client.get_digest("apps/web", &tag).await?;
//!         println!("{tag} -> {digest}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod error;
mod oci;

pub use client::{Registry, RegistryClient};
pub use config::{RegistryAuth, RegistryConfig};
pub use error::RegistryError;
pub use oci::{ConfigDescriptor, ManifestV2, MediaType, TagList};
