//! Local telemetry subscription.
//!
//! The host feeds every delta it sees into a broadcast channel. A
//! subscription task keeps the latest value of each subscribed path and,
//! once per period, hands them to the router. Condition changes go out on
//! the delta sink with the plugin id as `$source`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use sailtrim_core::{Delta, SubscribeRequest, TelemetryRouter, PLUGIN_ID};

/// Context assumed for deltas that carry none.
const SELF_CONTEXT: &str = "vessels.self";

/// A running subscription. Dropping the handle does not stop the task.
#[derive(Debug)]
pub struct SubscriptionHandle {
    request: SubscribeRequest,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn request(&self) -> &SubscribeRequest {
        &self.request
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop delivery.
    ///
    /// The task is aborted at its next await point, so a tick that is
    /// already handing values to the router may still complete.
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

/// Start delivering `request` from `feed` to `router`.
pub fn subscribe(
    request: SubscribeRequest,
    feed: broadcast::Receiver<Delta>,
    router: Arc<Mutex<TelemetryRouter>>,
    sink: mpsc::Sender<Delta>,
    period: Duration,
) -> SubscriptionHandle {
    debug!("Subscribing to {:?}", request.subscribe);
    let task = tokio::spawn(run(request.clone(), feed, router, sink, period));
    SubscriptionHandle { request, task }
}

async fn run(
    request: SubscribeRequest,
    mut feed: broadcast::Receiver<Delta>,
    router: Arc<Mutex<TelemetryRouter>>,
    sink: mpsc::Sender<Delta>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Latest value per path since the last tick
    let mut pending: HashMap<String, Value> = HashMap::new();
    // Arrival order, so a tick replays paths the way they came in
    let mut order: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            delta = feed.recv() => {
                match delta {
                    Ok(delta) => {
                        let context = delta.context.as_deref().unwrap_or(SELF_CONTEXT);
                        for pv in delta.values() {
                            if !request.matches(context, &pv.path) {
                                continue;
                            }
                            if pending.insert(pv.path.clone(), pv.value.clone()).is_none() {
                                order.push(pv.path.clone());
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Subscription lagged {} deltas", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Telemetry feed closed");
                        break;
                    }
                }
            }

            _ = ticker.tick() => {
                if pending.is_empty() {
                    continue;
                }
                let changes = {
                    let mut router = router.lock().await;
                    order
                        .drain(..)
                        .filter_map(|path| {
                            let value = pending.remove(&path)?;
                            router.on_update(&path, &value)
                        })
                        .collect::<Vec<_>>()
                };
                for change in changes {
                    debug!(
                        class = %change.class,
                        label = %change.label,
                        value = change.value,
                        "Condition changed"
                    );
                    let delta = change.to_delta(PLUGIN_ID, Some(timestamp()));
                    if sink.send(delta).await.is_err() {
                        info!("Delta sink closed");
                        return;
                    }
                }
            }
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
