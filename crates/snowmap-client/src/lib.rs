//! # Snowmap Client - Session wiring for the winter bike-path map
//!
//! Ties the pipeline together: the [`Session`] waits for the identity
//! provider, loads the dataset through the sync reconciler, polls for
//! updates, and hands freshly derived layers to a [`MapRenderer`] whenever
//! the data or the user's filters change.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snowmap_client::{ClientConfig, IdentityGate, MapRenderer, Session};
//! use snowmap_types::LayerDescriptor;
//!
//! struct LogRenderer;
//!
//! impl MapRenderer for LogRenderer {
//!     fn render(&self, layers: &[LayerDescriptor]) {
//!         println!("{} layers", layers.len());
//!     }
//! }
//!
//! # async fn example() -> snowmap_client::ClientResult<()> {
//! let config = ClientConfig::load(Some("snowmap.toml"))?;
//! snowmap_client::telemetry::init(&config.logging)?;
//!
//! let session = Session::connect(config)?;
//! session.start(&mut IdentityGate::ready()).await?;
//! session.attach_renderer(Arc::new(LogRenderer)).await;
//!
//! // ...
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod identity;
pub mod renderer;
pub mod session;
pub mod telemetry;

pub use config::{ClientConfig, LoggingConfig, MapConfig};
pub use error::{ClientError, ClientResult};
pub use identity::{IdentityGate, IdentityHandle};
pub use renderer::{MapRenderer, Viewport};
pub use session::Session;
