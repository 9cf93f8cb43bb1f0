//! Plugin capability trait
//!
//! A plugin ties into the phases of an [`Application`]. Every method has a
//! no-op default, so a plugin implements only the phases it cares about.
//!
//! Plugins must tolerate being shut down when some of their own resources
//! were never created: `shutdown` is called for every registered plugin, even
//! one whose `initialize` failed or never ran.

use super::Application;
use async_trait::async_trait;
use std::sync::Arc;

/// A component driven through the application lifecycle
///
/// # Example
///
/// ```rust,ignore
/// use plugin_lifecycle::lifecycle::{Application, Plugin};
/// use plugin_lifecycle::resource::ResourceKey;
/// use async_trait::async_trait;
///
/// const POOL: ResourceKey<DatabasePool> = ResourceKey::new("db.pool");
///
/// struct DatabasePlugin;
///
/// #[async_trait]
/// impl Plugin for DatabasePlugin {
///     async fn initialize(&self, app: &Application) -> anyhow::Result<()> {
///         app.with_value(&POOL, DatabasePool::connect().await?);
///         Ok(())
///     }
///
///     async fn shutdown(&self, app: &Application) -> anyhow::Result<()> {
///         if let Some(pool) = app.value(&POOL) {
///             pool.close().await;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Create resources and publish them through the application's resource store
    async fn initialize(&self, _app: &Application) -> anyhow::Result<()> {
        Ok(())
    }

    /// One-off work, such as a migration or a batch job
    async fn run(&self, _app: &Application) -> anyhow::Result<()> {
        Ok(())
    }

    /// Spin up long-lived components (servers, control loops); must not block
    async fn start(&self, _app: &Application) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release whatever this plugin holds
    async fn shutdown(&self, _app: &Application) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shared handle to a registered plugin
pub type PluginRef = Arc<dyn Plugin>;

/// Wraps a plugin into a [`PluginRef`]
pub fn plugin<P: Plugin>(plugin: P) -> PluginRef {
    Arc::new(plugin)
}
