mod adapters;
mod application;
mod config;
mod domain;
mod interface;
mod ports;

use std::future::IntoFuture;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{MemoryHistoryStore, SnmpAgentAdapter};
use application::{MetricExporter, Sampler};
use config::Config;
use interface::http::create_router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("snmpmon={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting snmpmon v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let definitions = config.metric_table()?;
    info!("✓ Loaded {} metric series", definitions.len());

    // Initialize adapters
    let agent = config.agent();
    info!("✓ Polling agent {} (community '{}')", agent.address(), agent.community);
    let source = Arc::new(SnmpAgentAdapter::new(agent));

    let store = Arc::new(MemoryHistoryStore::new(
        definitions.iter().map(|d| d.id.clone()),
        config.history_size,
    ));

    // Start sampling
    let sampler = Arc::new(Sampler::new(
        source,
        store.clone(),
        definitions.clone(),
        config.sampling_gap(),
        config.poll_interval(),
    ));
    let sampler_tasks = sampler.spawn();

    info!("✓ Sampler started ({} tasks)", sampler_tasks.len());

    // Create HTTP server
    let exporter = Arc::new(MetricExporter::new(
        store,
        definitions,
        config.refresh_interval(),
    ));
    info!("✓ Exporting {} series", exporter.series().len());
    let app = create_router(exporter);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✓ snmpmon listening on {}", addr);
    info!("  → API: http://localhost:{}/api/metrics", config.port);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        results = futures::future::join_all(sampler_tasks) => {
            for result in results.into_iter().filter_map(Result::err) {
                error!("Sampler task stopped: {}", result);
            }
            return Err("all sampler tasks stopped".into());
        }
    }

    Ok(())
}
