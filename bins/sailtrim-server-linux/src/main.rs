mod settings;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sailtrim_core::{Delta, PathValue, Update, PLUGIN_ID};
use sailtrim_plugin::{FileConfigStorage, PluginSettings, SailTrimPlugin};
use settings::HostSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sailtrim_plugin=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Sail Trim host starting...");

    let settings = HostSettings::from_env()?;
    tracing::info!("Config directory: {}", settings.config_dir.display());

    let storage = Arc::new(FileConfigStorage::new(&settings.config_dir, PLUGIN_ID));
    let plugin = Arc::new(SailTrimPlugin::new(storage, PluginSettings::default()));

    // Telemetry in, condition deltas out
    let (telemetry_tx, _) = broadcast::channel::<Delta>(256);
    let (sink_tx, sink_rx) = mpsc::channel::<Delta>(64);

    let sink_handle = tokio::spawn(publish_conditions(sink_rx));

    plugin.start(&telemetry_tx, sink_tx).await;

    // Start HTTP API server
    let http_plugin = plugin.clone();
    let bind_addr = settings.bind_addr;
    let http_handle = tokio::spawn(async move {
        if let Err(e) = start_http_server(bind_addr, http_plugin).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Start demo data generator
    let demo_handle = if settings.demo {
        let demo_tx = telemetry_tx.clone();
        tokio::spawn(async move { generate_demo_data(demo_tx).await })
    } else {
        tokio::spawn(std::future::pending::<()>())
    };

    tracing::info!("Sail Trim host ready!");
    tracing::info!(
        "   Plugin API: http://{}/plugins/{}/readConfig",
        settings.bind_addr,
        PLUGIN_ID
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = demo_handle => {
            tracing::warn!("Demo data generator stopped");
        }
        _ = sink_handle => {
            tracing::warn!("Condition publisher stopped");
        }
    }

    plugin.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Start the HTTP API server with the plugin routes mounted.
async fn start_http_server(
    addr: std::net::SocketAddr,
    plugin: Arc<SailTrimPlugin>,
) -> anyhow::Result<()> {
    let app = Router::new()
        .nest(&format!("/plugins/{PLUGIN_ID}"), sailtrim_web::create_router(plugin))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Log condition deltas emitted by the plugin.
async fn publish_conditions(mut rx: mpsc::Receiver<Delta>) {
    while let Some(delta) = rx.recv().await {
        for pv in delta.values() {
            tracing::info!("{} = {}", pv.path, pv.value);
        }
    }
}

/// Generate demo data - a boat beating upwind in a building breeze.
async fn generate_demo_data(telemetry_tx: broadcast::Sender<Delta>) {
    let mut interval = tokio::time::interval(Duration::from_millis(250));
    let mut t: f64 = 0.0;

    loop {
        interval.tick().await;
        t += 0.25;

        let pitch = 0.02 * (t * 1.3).sin() + 0.01 * (t * 0.07).sin();
        let wind_speed = 4.0 + 3.0 * (t / 60.0).sin().abs();
        let wind_angle = -(0.75 + 0.35 * (t / 45.0).sin());

        let delta = Delta {
            context: Some("vessels.self".to_string()),
            updates: vec![Update {
                source_ref: Some("demo.generator".to_string()),
                timestamp: Some(
                    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
                values: vec![
                    PathValue {
                        path: "navigation.attitude".to_string(),
                        value: json!({"roll": 0.1, "pitch": pitch, "yaw": 1.2}),
                    },
                    PathValue {
                        path: "environment.wind.speedTrue".to_string(),
                        value: json!(wind_speed),
                    },
                    PathValue {
                        path: "environment.wind.angleTrueWater".to_string(),
                        value: json!(wind_angle),
                    },
                ],
            }],
        };

        // No receivers while the plugin is stopped
        let _ = telemetry_tx.send(delta);
    }
}
