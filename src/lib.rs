//! # plugin-lifecycle
//!
//! A process-lifecycle supervisor for long-running services.
//!
//! Services are assembled from plugins (an HTTP server, a database pool, a
//! background worker). The [`Application`] calls each plugin's phases in
//! registration order and, whatever ends the process (a plugin error, an
//! explicit shutdown or `SIGTERM`/`SIGINT`), shuts every plugin down exactly
//! once in reverse order before reporting the terminal error.
//!
//! ## Features
//!
//! - **Ordered phases**: `initialize`, then either one-shot `run` or long-running `start`
//! - **Single teardown**: concurrent triggers collapse into one reverse-order shutdown
//! - **Signal handling**: `SIGTERM`/`SIGINT` are handled for you (configurable)
//! - **Shared resources**: plugins publish typed values for later plugins
//! - **Pluggable reporting**: a replaceable hook and termination strategy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plugin_lifecycle::prelude::*;
//!
//! const PORT: ResourceKey<u16> = ResourceKey::new("http.port");
//!
//! struct Server;
//!
//! #[async_trait]
//! impl Plugin for Server {
//!     async fn initialize(&self, app: &Application) -> anyhow::Result<()> {
//!         app.with_value(&PORT, 8080);
//!         Ok(())
//!     }
//!
//!     async fn start(&self, app: &Application) -> anyhow::Result<()> {
//!         let port = app.value(&PORT).map(|p| *p).unwrap_or_default();
//!         let token = app.resources().token();
//!         tokio::spawn(async move {
//!             tracing::info!(port, "Serving");
//!             token.cancelled().await;
//!         });
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Application::builder().hook(logging_hook()).build();
//!     app.initialize(vec![plugin(Server)]).await;
//!     app.start().await;
//! }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod resource;

// Re-export core types
pub use config::{ConfigError, LifecycleConfig};
pub use error::{ResourceError, Result};
pub use lifecycle::{Application, ApplicationBuilder, LifecycleError, Plugin, PluginFuncs};
pub use resource::{HasResources, ResourceKey, Resources};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use plugin_lifecycle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigError, LifecycleConfig};
    pub use crate::error::ResourceError;
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, Hook, LifecycleError, Phase, Plugin, PluginFuncs,
        PluginRef, ProcessExit, Signal, State, Terminate, logging_hook, noop_hook, plugin,
        termination_signal,
    };
    pub use crate::resource::{HasResources, ResourceKey, Resources};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
