//! # nexus-client
//!
//! Binds the backup engine to a live Nexus server over its REST API.
//!
//! ```rust,no_run
//! use nexus_client::{RemoteWorkspace, RestClient};
//! use nexus_backup::capture;
//!
//! # async fn run(server_id: uuid::Uuid) -> nexus_common::error::NexusResult<()> {
//! let config = nexus_common::config::init()?;
//! let rest = RestClient::new(&config.api)?;
//! let server = RemoteWorkspace::connect(rest, server_id).await?;
//! let snapshot = capture(&server).await;
//! println!("{} roles", snapshot.roles.len());
//! # Ok(())
//! # }
//! ```

pub mod rest;
pub mod types;
pub mod workspace;

pub use rest::RestClient;
pub use workspace::RemoteWorkspace;
