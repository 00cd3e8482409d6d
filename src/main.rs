use anyhow::Result;
use homedash::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let host = probe::SysinfoProbe::new();
    let docker = match probe::DockerProbe::connect() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "Docker unavailable; container probes will report failures");
            None
        }
    };
    let aggregator = Arc::new(tier::Aggregator::new(
        host,
        docker,
        app_config.aggregator_config(),
    ));

    let history = history::SharedHistory::new(app_config.history.capacity);
    let (publishers, published) =
        worker::channels(app_config.publishing.broadcast_capacity, history.clone());
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let pollers = worker::spawn(
        aggregator,
        history,
        publishers,
        shutdown_rx,
        app_config.poller_config(),
    );

    let app = routes::app(published);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Received shutdown signal");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    pollers.join().await;
    Ok(())
}
