use plugin_lifecycle::prelude::*;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const TICK: ResourceKey<Duration> = ResourceKey::new("ticker.interval");

/// Publishes configuration for the plugins registered after it
struct Settings;

#[async_trait]
impl Plugin for Settings {
    fn name(&self) -> &str {
        "settings"
    }

    async fn initialize(&self, app: &Application) -> anyhow::Result<()> {
        let millis = std::env::var("TICK_MS")
            .ok()
            .map(|raw| raw.parse::<u64>())
            .transpose()?
            .unwrap_or(1000);
        app.with_value(&TICK, Duration::from_millis(millis));
        Ok(())
    }
}

/// Background worker that ticks until the application is torn down
#[derive(Default)]
struct Ticker {
    task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl Plugin for Ticker {
    fn name(&self) -> &str {
        "ticker"
    }

    async fn start(&self, app: &Application) -> anyhow::Result<()> {
        let interval = app
            .value(&TICK)
            .map(|d| *d)
            .ok_or_else(|| anyhow::anyhow!("{TICK} was not published"))?;
        let stop = app.resources().token();

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            let mut count: u64 = 0;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticks.tick() => {
                        count += 1;
                        tracing::info!(count, "tick");
                    }
                }
            }
        });
        *self.task.lock().await = Some(task);
        Ok(())
    }

    async fn shutdown(&self, _app: &Application) -> anyhow::Result<()> {
        // may never have started if an earlier plugin failed
        let Some(task) = self.task.lock().await.take() else {
            return Ok(());
        };
        task.abort();
        let _ = task.await;
        tracing::info!("Ticker stopped");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting Example Service...");

    let config = match LifecycleConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let app = Application::builder()
        .config(config)
        .hook(logging_hook())
        .build();

    app.initialize(vec![
        plugin(Settings),
        plugin(Ticker::default()),
        PluginFuncs::new("banner")
            .on_start(|app| async move {
                tracing::info!(app = %app.id(), "✅ Service running; press Ctrl+C to stop");
                Ok(())
            })
            .into_ref(),
    ])
    .await;

    app.start().await;
}
