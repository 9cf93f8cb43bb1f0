//! Application supervisor
//!
//! The [`Application`] owns the plugin registry, the state machine, the
//! resource store and the shutdown listener. Every failure path converges
//! on a single reverse-order teardown.
//!
//! ```text
//! initialize(plugins) ──► plugin.initialize() in order
//!        │
//!        ├──► run()   ── Initial → Running ──► plugin.run() in order ──► shutdown(None)
//!        └──► start() ── Initial → Started ──► plugin.start() in order ──► wait for teardown
//!
//! any error ─────────────┐
//! SIGTERM / SIGINT ──────┼──► listener: state = Shutdown
//! shutdown(err) ─────────┘             plugin.shutdown() in reverse order
//!                                      cancel resources, release waiters
//!                                            │
//!                         shutdown(err) ◄────┘  state = Terminated
//!                                               hook("terminated", err)
//!                                               terminator(err)
//! ```
//!
//! A plugin whose `shutdown` never returns blocks termination indefinitely;
//! there is no teardown deadline.

use super::hook::{Hook, HookCell, Phase, noop_hook};
use super::shutdown::{ShutdownCoordinator, SignalFuture, Trigger, external_signal, os_signal};
use super::state::{State, StateCell};
use super::{LifecycleError, PluginRef, ProcessExit, Result, Terminate};
use crate::config::LifecycleConfig;
use crate::resource::{HasResources, ResourceKey, Resources};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::Instrument;
use uuid::Uuid;

struct Inner {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: StateCell,
    plugins: RwLock<Vec<PluginRef>>,
    shutdown: ShutdownCoordinator,
    resources: Resources,
    hook: HookCell,
    terminator: Box<dyn Terminate>,
}

/// Plugin-driven lifecycle supervisor
///
/// `Application` is a cheap, cloneable handle; all clones drive the same
/// lifecycle. It must be built inside a Tokio runtime because construction
/// spawns the shutdown listener.
///
/// # Example
///
/// ```rust,no_run
/// use plugin_lifecycle::lifecycle::{Application, PluginFuncs, logging_hook};
///
/// #[tokio::main]
/// async fn main() {
///     let app = Application::builder().hook(logging_hook()).build();
///
///     app.initialize(vec![
///         PluginFuncs::new("server")
///             .on_start(|_app| async { Ok(()) })
///             .on_shutdown(|_app| async { Ok(()) })
///             .into_ref(),
///     ])
///     .await;
///
///     // Serves until SIGTERM/SIGINT, then tears every plugin down.
///     app.start().await;
/// }
/// ```
#[derive(Clone)]
pub struct Application {
    inner: Arc<Inner>,
}

impl Application {
    /// Default application: OS signals handled, fatal exit on error
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Unique id of this instance, attached to every log line it emits
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    pub fn state(&self) -> State {
        self.inner.state.load()
    }

    /// Number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.inner
            .plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Replace the hook; the last call wins
    ///
    /// Typically called from a logging plugin's `initialize`.
    pub fn with_hook<F>(&self, hook: F)
    where
        F: Fn(Phase, Option<&LifecycleError>) + Send + Sync + 'static,
    {
        self.inner.hook.replace(Arc::new(hook));
    }

    /// Publish `value` under `key` for later plugins and the caller
    pub fn with_value<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>, value: T) {
        self.inner.resources.set(key, value);
    }

    pub fn value<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>) -> Option<Arc<T>> {
        self.inner.resources.value(key)
    }

    /// Register `plugins` and run their `initialize` in order
    ///
    /// Must be called before [`run`](Self::run) or [`start`](Self::start);
    /// afterwards it shuts the application down with
    /// [`LifecycleError::InitializeAfterStartup`], unless a termination
    /// signal already tore it down, in which case it terminates without an
    /// error. If a plugin fails, the rest of the batch is not initialized,
    /// but every registered plugin still receives `shutdown`.
    pub async fn initialize(&self, plugins: Vec<PluginRef>) {
        self.initialize_inner(plugins)
            .instrument(self.span("initialize"))
            .await
    }

    async fn initialize_inner(&self, plugins: Vec<PluginRef>) {
        let state = self.state();
        if state > State::Initial {
            tracing::warn!(state = %state, "Initialize called after startup");
            self.reject(LifecycleError::InitializeAfterStartup).await;
            return;
        }

        self.inner
            .plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(plugins.iter().cloned());

        tracing::info!("Calling plugin initialize hooks...");
        for plugin in &plugins {
            if self.inner.shutdown.is_triggered() {
                tracing::warn!(
                    cause = ?self.inner.shutdown.cause(),
                    "Shutdown in progress; skipping remaining initialization"
                );
                return;
            }

            tracing::debug!("Initializing: {}", plugin.name());
            if let Err(e) = plugin.initialize(self).await {
                tracing::error!("Initialize failed for {}: {}", plugin.name(), e);
                self.fail(Phase::Initialization, LifecycleError::Plugin(e))
                    .await;
                return;
            }
            tracing::debug!("Initialized: {}", plugin.name());
        }

        tracing::info!(
            "Plugin initialization complete ({} plugins initialized)",
            plugins.len()
        );
    }

    /// Run every plugin's one-off `run` in order, then shut down
    ///
    /// This phase always ends in termination: with the first plugin error,
    /// or with no error once every plugin has run.
    pub async fn run(&self) {
        self.run_inner().instrument(self.span("run")).await
    }

    async fn run_inner(&self) {
        if let Err(current) = self.inner.state.transition(State::Initial, State::Running) {
            tracing::warn!(state = %current, "Run rejected");
            self.reject(LifecycleError::RunOrStart).await;
            return;
        }

        if let Err(err) = self.forward(Phase::Running).await {
            self.fail(Phase::Running, err).await;
            return;
        }

        self.shutdown(None).await;
    }

    /// Run every plugin's `start` in order, then wait until teardown completes
    ///
    /// Returns once the application has been torn down, whether by a
    /// plugin error, an explicit [`shutdown`](Self::shutdown) or an OS
    /// signal.
    pub async fn start(&self) {
        self.start_inner().instrument(self.span("start")).await
    }

    async fn start_inner(&self) {
        if let Err(current) = self.inner.state.transition(State::Initial, State::Started) {
            tracing::warn!(state = %current, "Start rejected");
            self.reject(LifecycleError::RunOrStart).await;
            return;
        }

        if let Err(err) = self.forward(Phase::Startup).await {
            self.fail(Phase::Startup, err).await;
            return;
        }

        tracing::info!("Application started; waiting for shutdown");
        self.inner.shutdown.wait().await;

        // Explicit triggers finish termination themselves; a signal has no
        // caller to do it, so the parked starter does.
        if let Some(Trigger::Signal(signal)) = self.inner.shutdown.cause() {
            tracing::debug!(signal = %signal, "Terminating after signal");
            self.finish(None);
        }
    }

    /// Tear the application down and report `err` as the terminal error
    ///
    /// Fires the shutdown trigger (a no-op if it already fired), waits for
    /// the reverse teardown to finish, marks the application terminated,
    /// reports to the hook and finally invokes the terminator.
    pub async fn shutdown(&self, err: Option<LifecycleError>) {
        if self.inner.shutdown.request(Trigger::Explicit) {
            match &err {
                Some(e) => tracing::info!(label = e.as_label(), "Shutdown requested: {}", e),
                None => tracing::info!("Shutdown requested"),
            }
        }

        self.inner.shutdown.wait().await;
        self.finish(err);
    }

    /// Completes once teardown has finished
    pub async fn wait(&self) {
        self.inner.shutdown.wait().await
    }

    async fn forward(&self, phase: Phase) -> Result<()> {
        let plugins = self.snapshot();

        tracing::info!(phase = %phase, "Calling plugin {} hooks...", phase);
        for plugin in &plugins {
            if self.inner.shutdown.is_triggered() {
                tracing::warn!(phase = %phase, "Shutdown in progress; skipping remaining plugins");
                return Ok(());
            }

            tracing::debug!(phase = %phase, "Calling {}", plugin.name());
            let result = match phase {
                Phase::Startup => plugin.start(self).await,
                _ => plugin.run(self).await,
            };
            if let Err(e) = result {
                tracing::error!(phase = %phase, "Plugin {} failed: {}", plugin.name(), e);
                return Err(LifecycleError::Plugin(e));
            }
        }

        tracing::info!(
            phase = %phase,
            "Plugin {} complete ({} plugins)",
            phase,
            plugins.len()
        );
        Ok(())
    }

    /// Guard failure: a termination signal already tore the application
    /// down, so the late phase call finishes with no error like the signal
    /// would have; otherwise the guard violation becomes the terminal error.
    async fn reject(&self, err: LifecycleError) {
        if let Some(Trigger::Signal(signal)) = self.inner.shutdown.cause() {
            tracing::info!(
                signal = %signal,
                "Phase call after termination signal; finishing shutdown"
            );
            self.inner.shutdown.wait().await;
            self.finish(None);
            return;
        }

        self.shutdown(Some(err)).await;
    }

    async fn fail(&self, phase: Phase, err: LifecycleError) {
        self.inner.hook.emit(phase, Some(&err));
        self.shutdown(Some(err)).await;
    }

    /// Reverse teardown; run exactly once by the shutdown listener
    async fn teardown(&self) {
        let previous = self.inner.state.begin_shutdown();
        let plugins = self.snapshot();

        tracing::info!(from = %previous, "Calling plugin shutdown hooks...");
        for plugin in plugins.iter().rev() {
            tracing::debug!("Shutting down: {}", plugin.name());
            if let Err(e) = plugin.shutdown(self).await {
                tracing::error!("Shutdown failed for {}: {}", plugin.name(), e);
                self.inner
                    .hook
                    .emit(Phase::Shutdown, Some(&LifecycleError::Plugin(e)));
            }
        }

        self.inner.resources.cancel();
        tracing::info!(
            "Plugin shutdown complete ({} plugins shut down)",
            plugins.len()
        );
        self.inner.shutdown.complete();
    }

    fn finish(&self, err: Option<LifecycleError>) {
        self.inner.state.terminate();

        let uptime = Utc::now() - self.inner.created_at;
        tracing::info!(
            uptime_ms = uptime.num_milliseconds(),
            failed = err.is_some(),
            "Application terminated"
        );

        self.inner.hook.emit(Phase::Terminated, err.as_ref());
        self.inner.terminator.terminate(err.as_ref());
    }

    fn snapshot(&self) -> Vec<PluginRef> {
        self.inner
            .plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn span(&self, operation: &'static str) -> tracing::Span {
        tracing::info_span!("lifecycle", app = %self.inner.id, operation)
    }

    /// Spawns the single shutdown listener for this application.
    ///
    /// The listener only holds a weak reference until a trigger fires, so
    /// dropping every handle before shutdown does not keep `Inner` alive.
    fn spawn_listener(&self, signal: Option<SignalFuture>) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let trigger = self.inner.shutdown.trigger();
        let span = tracing::info_span!("lifecycle", app = %self.inner.id, operation = "teardown");

        tokio::spawn(
            async move {
                let signal = async move {
                    match signal {
                        Some(signal) => signal.await,
                        None => std::future::pending().await,
                    }
                };

                // The signal future is dropped here, which stops delivery.
                let received = tokio::select! {
                    _ = trigger.cancelled() => None,
                    signal = signal => Some(signal),
                };

                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Some(signal) = received {
                    inner.shutdown.request(Trigger::Signal(signal));
                }

                Application { inner }.teardown().await;
            }
            .instrument(span),
        );
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl HasResources for Application {
    fn resources(&self) -> &Resources {
        &self.inner.resources
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("plugins", &self.plugin_count())
            .field("torn_down", &self.inner.shutdown.is_complete())
            .finish()
    }
}

/// Builder for [`Application`]
pub struct ApplicationBuilder {
    config: LifecycleConfig,
    hook: Option<Hook>,
    terminator: Option<Box<dyn Terminate>>,
    resources: Option<Resources>,
    signal: Option<SignalFuture>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            config: LifecycleConfig::default(),
            hook: None,
            terminator: None,
            resources: None,
            signal: None,
        }
    }

    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    /// Listen for `SIGTERM`/`SIGINT` (default `true`)
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.config.handle_signals = enabled;
        self
    }

    pub fn hook(mut self, hook: Hook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Replace the default [`ProcessExit`] termination strategy
    pub fn terminator<T: Terminate>(mut self, terminator: T) -> Self {
        self.terminator = Some(Box::new(terminator));
        self
    }

    /// Seed the application with an existing store (shared, not copied)
    pub fn resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Use `signal` instead of OS signals as the external shutdown source
    ///
    /// When `signal` completes, the application shuts down exactly as if it
    /// had received `SIGTERM`.
    pub fn shutdown_signal<F>(mut self, signal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.signal = Some(external_signal(signal));
        self
    }

    /// Build the application and spawn its shutdown listener
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn build(self) -> Application {
        let signal = match self.signal {
            Some(signal) => Some(signal),
            None if self.config.handle_signals => Some(os_signal()),
            None => None,
        };
        let terminator = self
            .terminator
            .unwrap_or_else(|| Box::new(ProcessExit::new(self.config.exit_code)));

        let app = Application {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                state: StateCell::new(),
                plugins: RwLock::new(Vec::new()),
                shutdown: ShutdownCoordinator::new(),
                resources: self.resources.unwrap_or_default(),
                hook: HookCell::new(self.hook.unwrap_or_else(noop_hook)),
                terminator,
            }),
        };

        app.spawn_listener(signal);
        tracing::debug!(app = %app.inner.id, "Application created");
        app
    }
}
