// Background pollers: the fast and detail tiers run as two independent tasks on
// their own intervals. The fast poller is the only writer of the history window.

use crate::history::SharedHistory;
use crate::models::{DetailSnapshot, FastSnapshot, HistoryPoint};
use crate::probe::{ContainerProbe, HostProbe};
use crate::tier::{Aggregator, Tier, TierError};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval};

/// Rate limit for the "no stream receivers" message.
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Sending halves owned by the pollers.
pub struct Publishers {
    pub fast: watch::Sender<Option<FastSnapshot>>,
    pub detail: watch::Sender<Option<DetailSnapshot>>,
    pub stream: broadcast::Sender<FastSnapshot>,
}

/// Read side handed to the request layer: latest snapshot of each tier, the live
/// fast-tier stream and the history window.
#[derive(Clone)]
pub struct Published {
    fast: watch::Receiver<Option<FastSnapshot>>,
    detail: watch::Receiver<Option<DetailSnapshot>>,
    stream: broadcast::Sender<FastSnapshot>,
    history: SharedHistory,
}

impl Published {
    pub fn fast(&self) -> Result<FastSnapshot, TierError> {
        self.fast
            .borrow()
            .clone()
            .ok_or(TierError::Unavailable(Tier::Fast))
    }

    pub fn detail(&self) -> Result<DetailSnapshot, TierError> {
        self.detail
            .borrow()
            .clone()
            .ok_or(TierError::Unavailable(Tier::Detail))
    }

    pub async fn history(&self) -> Vec<HistoryPoint> {
        self.history.snapshot().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FastSnapshot> {
        self.stream.subscribe()
    }

    pub fn stream_clients(&self) -> usize {
        self.stream.receiver_count()
    }
}

/// Create the publishing channels. `history` is shared with the fast poller.
pub fn channels(broadcast_capacity: usize, history: SharedHistory) -> (Publishers, Published) {
    let (fast_tx, fast_rx) = watch::channel(None);
    let (detail_tx, detail_rx) = watch::channel(None);
    let (stream_tx, _) = broadcast::channel(broadcast_capacity.max(1));
    (
        Publishers {
            fast: fast_tx,
            detail: detail_tx,
            stream: stream_tx.clone(),
        },
        Published {
            fast: fast_rx,
            detail: detail_rx,
            stream: stream_tx,
            history,
        },
    )
}

/// Poller timing and logging config.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub fast_interval_ms: u64,
    pub detail_interval_ms: u64,
    /// How often to log poller stats at INFO (real seconds).
    pub stats_log_interval_secs: u64,
}

pub struct Pollers {
    pub fast: tokio::task::JoinHandle<()>,
    pub detail: tokio::task::JoinHandle<()>,
}

impl Pollers {
    /// Wait for both pollers; a poller that panicked or was cancelled is logged.
    pub async fn join(self) {
        await_poller(Tier::Fast, self.fast).await;
        await_poller(Tier::Detail, self.detail).await;
    }
}

async fn await_poller(tier: Tier, handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                tier = %tier,
                error = %e,
                panicked = e.is_panic(),
                "poller task did not exit cleanly"
            );
            false
        }
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut tick = interval(period);
    // A poll that overruns its slot delays the next one instead of stacking.
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

/// Spawn both pollers. They stop when `shutdown_rx` changes or its sender is dropped.
pub fn spawn<H, C>(
    aggregator: Arc<Aggregator<H, C>>,
    history: SharedHistory,
    publishers: Publishers,
    shutdown_rx: watch::Receiver<bool>,
    config: PollerConfig,
) -> Pollers
where
    H: HostProbe,
    C: ContainerProbe,
{
    let Publishers {
        fast,
        detail,
        stream,
    } = publishers;
    Pollers {
        fast: spawn_fast_poller(
            aggregator.clone(),
            history,
            fast,
            stream,
            shutdown_rx.clone(),
            &config,
        ),
        detail: spawn_detail_poller(aggregator, detail, shutdown_rx, &config),
    }
}

fn spawn_fast_poller<H, C>(
    aggregator: Arc<Aggregator<H, C>>,
    history: SharedHistory,
    fast_tx: watch::Sender<Option<FastSnapshot>>,
    stream_tx: broadcast::Sender<FastSnapshot>,
    mut shutdown_rx: watch::Receiver<bool>,
    config: &PollerConfig,
) -> tokio::task::JoinHandle<()>
where
    H: HostProbe,
    C: ContainerProbe,
{
    let period = Duration::from_millis(config.fast_interval_ms);
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = ticker(period);
        let mut stats_log_tick = ticker(stats_log_interval);
        let mut polls_total: u64 = 0;
        let mut degraded_total: u64 = 0;
        let mut last_no_receivers_log: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let started = Instant::now();
                    let snapshot = match aggregator.fast_snapshot().await {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!(tier = %Tier::Fast, error = %e, "tier poll failed");
                            continue;
                        }
                    };
                    polls_total += 1;
                    if !snapshot.failed_probes.is_empty() {
                        degraded_total += 1;
                    }
                    tracing::debug!(
                        tier = %Tier::Fast,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        failed_probes = ?snapshot.failed_probes,
                        "poll complete"
                    );

                    history.append_snapshot(&snapshot).await;

                    if stream_tx.send(snapshot.clone()).is_err() {
                        let should_log = last_no_receivers_log
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                        if should_log {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active WebSocket clients; stream has no receivers"
                            );
                            last_no_receivers_log = Some(Instant::now());
                        }
                    }
                    fast_tx.send_replace(Some(snapshot));
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients = stream_tx.receiver_count(),
                        fast_polls_total = polls_total,
                        fast_polls_degraded = degraded_total,
                        "app stats"
                    );
                }
                _ = shutdown_rx.changed() => {
                    tracing::debug!("Fast poller shutting down");
                    break;
                }
            }
        }
    })
}

fn spawn_detail_poller<H, C>(
    aggregator: Arc<Aggregator<H, C>>,
    detail_tx: watch::Sender<Option<DetailSnapshot>>,
    mut shutdown_rx: watch::Receiver<bool>,
    config: &PollerConfig,
) -> tokio::task::JoinHandle<()>
where
    H: HostProbe,
    C: ContainerProbe,
{
    let period = Duration::from_millis(config.detail_interval_ms);

    tokio::spawn(async move {
        let mut tick = ticker(period);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let started = Instant::now();
                    match aggregator.detail_snapshot().await {
                        Ok(snapshot) => {
                            tracing::debug!(
                                tier = %Tier::Detail,
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                containers = snapshot.containers.len(),
                                failed_probes = ?snapshot.failed_probes,
                                "poll complete"
                            );
                            detail_tx.send_replace(Some(snapshot));
                        }
                        Err(e) => {
                            tracing::warn!(tier = %Tier::Detail, error = %e, "tier poll failed");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    tracing::debug!("Detail poller shutting down");
                    break;
                }
            }
        }
    })
}
