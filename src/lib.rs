//! rcsync - reconcile declared configuration against a remote config store
//!
//! Desired state (parameters and parameter groups) is published to the
//! store with optimistic concurrency: every write names the ETag it was
//! based on, and the store rejects it if another writer got there first.
//!
//! ```ignore
//! use rcsync::{ClientConfig, ConfigurationDocument, Parameter, Reconciler};
//!
//! let client = ClientConfig::with_access_token(token).build_client()?;
//! let reconciler = Reconciler::new(&client);
//!
//! let desired = ConfigurationDocument::new("my-project")
//!     .with_parameter(Parameter::new("welcome", "greeting", "STRING", "hi"));
//! let live = reconciler.initialize("my-project", &desired)?;
//! let live = reconciler.update("my-project", &desired, live.concurrency_token().unwrap_or(""))?;
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod mapper;
pub mod model;
pub mod observability;
pub mod reconciler;
pub mod transport;
pub mod wire;

pub use client::{IfMatch, RemoteStoreClient, WILDCARD_TOKEN};
pub use config::ClientConfig;
pub use errors::{SyncError, SyncResult};
pub use model::{ConfigurationDocument, Parameter, ParameterGroup, Revision, VersionMetadata};
pub use reconciler::Reconciler;
