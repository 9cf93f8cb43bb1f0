//! Plugin lifecycle
//!
//! An [`Application`] drives an ordered list of [`Plugin`]s through their
//! phases and guarantees that every registered plugin is shut down exactly
//! once, in reverse registration order, however the application ends.
//!
//! # Phases
//!
//! ```text
//! 1. initialize(plugins)      ← Plugin::initialize, in order
//!    ↓
//! 2a. run()                   ← Plugin::run, in order, then shutdown
//!  or
//! 2b. start()                 ← Plugin::start, in order, then park
//!    ↓
//! [Started...]
//!    ↓
//! 3. Error / shutdown(err) / SIGTERM / SIGINT
//!    ↓
//! 4. Plugin::shutdown         ← reverse order, errors reported and skipped
//!    ↓
//! 5. hook("terminated", err), then the terminator
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use plugin_lifecycle::lifecycle::{Application, Plugin};
//! use async_trait::async_trait;
//!
//! struct Database;
//!
//! #[async_trait]
//! impl Plugin for Database {
//!     async fn initialize(&self, _app: &Application) -> anyhow::Result<()> {
//!         tracing::info!("Opening database connection");
//!         Ok(())
//!     }
//!
//!     async fn shutdown(&self, _app: &Application) -> anyhow::Result<()> {
//!         tracing::info!("Closing database connections");
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let app = Application::new();
//! app.initialize(vec![plugin_lifecycle::lifecycle::plugin(Database)]).await;
//! app.start().await;
//! # }
//! ```

mod application;
mod error;
mod funcs;
mod hook;
mod shutdown;
mod state;
mod terminate;
mod traits;

pub use application::{Application, ApplicationBuilder};
pub use error::{LifecycleError, Result};
pub use funcs::{BoxPhaseFuture, PluginFuncs};
pub use hook::{Hook, Phase, logging_hook, noop_hook};
pub use shutdown::{Signal, Trigger, termination_signal};
pub use state::State;
pub use terminate::{ProcessExit, Terminate};
pub use traits::{Plugin, PluginRef, plugin};
