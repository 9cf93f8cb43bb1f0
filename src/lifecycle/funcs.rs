//! Closure-backed plugins
//!
//! [`PluginFuncs`] builds a stateless plugin from up to four closures, one
//! per phase. Phases without a closure are no-ops. Each closure receives an
//! owned [`Application`] handle (cheap to clone) and produces a fresh future.

use super::{Application, Plugin, PluginRef};
use async_trait::async_trait;
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a phase closure
pub type BoxPhaseFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

type PhaseFn = Box<dyn Fn(Application) -> BoxPhaseFuture + Send + Sync>;

/// A plugin assembled from optional phase closures
///
/// # Example
///
/// ```rust
/// use plugin_lifecycle::lifecycle::{Plugin, PluginFuncs};
///
/// let migrations = PluginFuncs::new("migrations")
///     .on_run(|_app| async move {
///         // apply schema changes...
///         Ok(())
///     })
///     .into_ref();
///
/// assert_eq!(migrations.name(), "migrations");
/// ```
#[derive(Default)]
pub struct PluginFuncs {
    name: Cow<'static, str>,
    initialize: Option<PhaseFn>,
    run: Option<PhaseFn>,
    start: Option<PhaseFn>,
    shutdown: Option<PhaseFn>,
}

fn boxed<F, Fut>(f: F) -> PhaseFn
where
    F: Fn(Application) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |app| Box::pin(f(app)))
}

impl PluginFuncs {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn on_initialize<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.initialize = Some(boxed(f));
        self
    }

    pub fn on_run<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.run = Some(boxed(f));
        self
    }

    pub fn on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.start = Some(boxed(f));
        self
    }

    pub fn on_shutdown<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.shutdown = Some(boxed(f));
        self
    }

    /// Finish building and return a shareable handle
    pub fn into_ref(self) -> PluginRef {
        Arc::new(self)
    }
}

async fn call(slot: &Option<PhaseFn>, app: &Application) -> anyhow::Result<()> {
    match slot {
        Some(f) => f(app.clone()).await,
        None => Ok(()),
    }
}

#[async_trait]
impl Plugin for PluginFuncs {
    fn name(&self) -> &str {
        if self.name.is_empty() {
            "PluginFuncs"
        } else {
            &self.name
        }
    }

    async fn initialize(&self, app: &Application) -> anyhow::Result<()> {
        call(&self.initialize, app).await
    }

    async fn run(&self, app: &Application) -> anyhow::Result<()> {
        call(&self.run, app).await
    }

    async fn start(&self, app: &Application) -> anyhow::Result<()> {
        call(&self.start, app).await
    }

    async fn shutdown(&self, app: &Application) -> anyhow::Result<()> {
        call(&self.shutdown, app).await
    }
}
