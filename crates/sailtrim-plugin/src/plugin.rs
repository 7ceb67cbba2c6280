//! The Sail Trim plugin instance.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

use sailtrim_core::{
    ConfigError, ConfigStorage, ConfigTable, Delta, PluginOptions, SignalClass, SubscribeRequest,
    TelemetryRouter, TrimConfiguration, PLUGIN_ID, PLUGIN_NAME,
};

use crate::reload::{self, Persist};
use crate::subscription::{self, SubscriptionHandle};

/// Default delivery period of the telemetry subscription.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

/// Runtime settings that are not part of the plugin options.
#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// How often buffered telemetry is handed to the router.
    pub period: Duration,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }
}

/// Where a started plugin is attached to its host.
struct Attachment {
    telemetry: broadcast::Sender<Delta>,
    sink: mpsc::Sender<Delta>,
    subscription: SubscriptionHandle,
}

/// A plugin instance: router state, storage and the live subscription.
///
/// Lock order is `config_lock`, then `router`, then `attachment`.
pub struct SailTrimPlugin {
    storage: Arc<dyn ConfigStorage>,
    settings: PluginSettings,
    router: Arc<Mutex<TelemetryRouter>>,
    config_lock: Mutex<()>,
    attachment: Mutex<Option<Attachment>>,
}

impl SailTrimPlugin {
    pub fn new(storage: Arc<dyn ConfigStorage>, settings: PluginSettings) -> Self {
        let options = reload::load_options(storage.as_ref());
        let (config, _) = TrimConfiguration::from_value(&options.configuration);
        Self {
            storage,
            settings,
            router: Arc::new(Mutex::new(TelemetryRouter::new(&config))),
            config_lock: Mutex::new(()),
            attachment: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Start the plugin on a telemetry bus.
    ///
    /// Builds the router from the stored options, runs the reload cycle and
    /// subscribes to the configured paths. Condition changes are sent to
    /// `sink`. Starting a running plugin restarts it. A disabled plugin only
    /// logs and stays stopped.
    pub async fn start(&self, telemetry: &broadcast::Sender<Delta>, sink: mpsc::Sender<Delta>) {
        let _guard = self.config_lock.lock().await;

        let options = reload::load_options(self.storage.as_ref());
        if !options.enabled {
            info!("{} is disabled", PLUGIN_NAME);
            self.detach().await;
            return;
        }

        let (config, _) = TrimConfiguration::from_value(&options.configuration);
        let paths = {
            let mut router = self.router.lock().await;
            *router = TelemetryRouter::new(&config);
            router.paths().map(str::to_string).collect::<Vec<_>>()
        };

        let table = reload::run(self.storage.as_ref(), Persist::Yes);
        debug!(entries = table.len(), "Trim table ready");

        let request = self.request(paths);
        let subscription = subscription::subscribe(
            request,
            telemetry.subscribe(),
            self.router.clone(),
            sink.clone(),
            self.settings.period,
        );

        let previous = self.attachment.lock().await.replace(Attachment {
            telemetry: telemetry.clone(),
            sink,
            subscription,
        });
        if let Some(previous) = previous {
            previous.subscription.unsubscribe();
        }
        info!("{} started", PLUGIN_NAME);
    }

    /// Release the subscription.
    pub async fn stop(&self) {
        if self.detach().await {
            info!("{} stopped", PLUGIN_NAME);
        }
    }

    pub async fn is_running(&self) -> bool {
        self.attachment
            .lock()
            .await
            .as_ref()
            .is_some_and(|a| !a.subscription.is_finished())
    }

    /// The plugin options document, defaults when none was saved.
    pub fn options(&self) -> PluginOptions {
        reload::load_options(self.storage.as_ref())
    }

    /// Persist a new configuration, reconfigure the router and reload the
    /// trim table.
    ///
    /// When the subscribed paths change, a running plugin resubscribes.
    pub async fn save_options(&self, configuration: Value) -> Result<(), ConfigError> {
        let _guard = self.config_lock.lock().await;

        self.storage.save_configuration(&configuration)?;
        info!("Plugin options saved");

        let (config, issues) = TrimConfiguration::from_value(&configuration);
        if !issues.is_empty() {
            warn!("Saved options have {} issue(s)", issues.len());
        }
        let paths = {
            let mut router = self.router.lock().await;
            router.reconfigure(&config);
            router.paths().map(str::to_string).collect::<Vec<_>>()
        };
        self.resubscribe(paths).await;

        reload::run(self.storage.as_ref(), Persist::Yes);
        Ok(())
    }

    /// The trim table as it would be after a reload, without writing it.
    pub async fn read_config(&self) -> ConfigTable {
        let _guard = self.config_lock.lock().await;
        reload::run(self.storage.as_ref(), Persist::No)
    }

    /// Store a client supplied trim table as is.
    pub async fn save_config(&self, table: Value) -> Result<(), ConfigError> {
        let _guard = self.config_lock.lock().await;
        self.storage.save_table(&table)?;
        info!("Trim table saved");
        Ok(())
    }

    /// Run the full reload cycle.
    pub async fn reload(&self) -> ConfigTable {
        let _guard = self.config_lock.lock().await;
        reload::run(self.storage.as_ref(), Persist::Yes)
    }

    /// Current label of a signal class, empty when none.
    pub async fn current(&self, class: SignalClass) -> String {
        self.router.lock().await.current(class).to_string()
    }

    fn request(&self, paths: Vec<String>) -> SubscribeRequest {
        let period_ms = u64::try_from(self.settings.period.as_millis()).unwrap_or(u64::MAX);
        SubscribeRequest::all_contexts(paths, period_ms)
    }

    async fn resubscribe(&self, paths: Vec<String>) {
        let mut attachment = self.attachment.lock().await;
        let Some(current) = attachment.take() else {
            return;
        };

        let request = self.request(paths);
        if *current.subscription.request() == request {
            *attachment = Some(current);
            return;
        }

        debug!("Subscribed paths changed, resubscribing");
        let Attachment {
            telemetry,
            sink,
            subscription,
        } = current;
        subscription.unsubscribe();
        let subscription = subscription::subscribe(
            request,
            telemetry.subscribe(),
            self.router.clone(),
            sink.clone(),
            self.settings.period,
        );
        *attachment = Some(Attachment {
            telemetry,
            sink,
            subscription,
        });
    }

    async fn detach(&self) -> bool {
        match self.attachment.lock().await.take() {
            Some(attachment) => {
                attachment.subscription.unsubscribe();
                true
            }
            None => false,
        }
    }
}
