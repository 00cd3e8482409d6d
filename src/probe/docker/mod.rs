// Docker inventory and live resource stats via bollard

mod stats;

use super::ContainerProbe;
use crate::models::{ContainerRecord, ContainerState, PortMapping, StatSample};
use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use bollard::models::ContainerSummary;
use futures_util::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

/// Inventory is read on demand; stats come from one long-lived stream per running
/// container, cached by container id and served from the cache.
pub struct DockerProbe {
    docker: Docker,
    live_stats: Arc<RwLock<HashMap<String, StatSample>>>,
    active_streams: Arc<RwLock<HashMap<String, tokio::task::JoinHandle<()>>>>,
}

impl DockerProbe {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self {
            docker,
            live_stats: Arc::new(RwLock::new(HashMap::new())),
            active_streams: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn list(&self, running_only: bool) -> anyhow::Result<Vec<ContainerSummary>> {
        let filters = running_only.then(|| {
            let mut filters = HashMap::new();
            filters.insert("status".to_string(), vec!["running".to_string()]);
            filters
        });
        let options = ListContainersOptions {
            all: !running_only,
            filters,
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    /// Start streams for newly running containers and drop those that stopped.
    async fn sync_streams(&self, running: &[ContainerRecord]) {
        let running_set: HashSet<&str> = running.iter().map(|c| c.id.as_str()).collect();
        let current_keys: Vec<String> = {
            let r = self.active_streams.read().await;
            r.keys().cloned().collect()
        };

        let to_add: Vec<&ContainerRecord> = running
            .iter()
            .filter(|c| !current_keys.contains(&c.id))
            .collect();
        let to_remove: Vec<String> = current_keys
            .into_iter()
            .filter(|id| !running_set.contains(id.as_str()))
            .collect();

        {
            let mut streams = self.active_streams.write().await;
            for c in to_add {
                let handle = self.start_monitoring(c.id.clone(), c.name.clone());
                streams.insert(c.id.clone(), handle);
            }
            for id in &to_remove {
                if let Some(handle) = streams.remove(id) {
                    handle.abort();
                }
            }
        }
        if !to_remove.is_empty() {
            let mut live = self.live_stats.write().await;
            for id in &to_remove {
                live.remove(id);
            }
        }
    }

    fn start_monitoring(&self, id: String, name: String) -> tokio::task::JoinHandle<()> {
        let docker = self.docker.clone();
        let live_stats = self.live_stats.clone();
        let active_streams = self.active_streams.clone();

        tokio::spawn(async move {
            let options = StatsOptions {
                stream: true,
                ..Default::default()
            };
            let mut stream = docker.stats(&id, Some(options));

            while let Some(result) = stream.next().await {
                match result {
                    Ok(s) => {
                        if let Some(sample) = stats::process_statistics(&s, &id) {
                            live_stats.write().await.insert(id.clone(), sample);
                        }
                    }
                    Err(e) => {
                        warn!(container = %name, error = %e, "stats stream error");
                        break;
                    }
                }
            }
            tracing::info!(container = %name, "stats stream ended");
            active_streams.write().await.remove(&id);
            live_stats.write().await.remove(&id);
        })
    }
}

/// Map a Docker list entry to an inventory record.
pub(crate) fn to_record(c: &ContainerSummary) -> ContainerRecord {
    let id = c.id.clone().unwrap_or_default();
    let name = c
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id.clone());
    let state = c
        .state
        .as_ref()
        .map(|s| ContainerState::from_docker(&s.to_string()))
        .unwrap_or_default();
    let ports = c
        .ports
        .as_ref()
        .map(|ports| {
            ports
                .iter()
                .map(|p| PortMapping {
                    public_port: p.public_port,
                    private_port: p.private_port,
                    protocol: p.typ.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();
    ContainerRecord {
        id,
        name,
        image: c.image.clone().unwrap_or_default(),
        command: c.command.clone().unwrap_or_default(),
        state,
        ports,
    }
}

impl ContainerProbe for DockerProbe {
    #[instrument(skip(self), fields(probe = "containers"))]
    async fn containers(&self) -> anyhow::Result<Vec<ContainerRecord>> {
        Ok(self.list(false).await?.iter().map(to_record).collect())
    }

    #[instrument(skip(self), fields(probe = "containerStats"))]
    async fn container_stats(&self) -> anyhow::Result<Vec<StatSample>> {
        let running: Vec<ContainerRecord> = self.list(true).await?.iter().map(to_record).collect();
        self.sync_streams(&running).await;
        let live = self.live_stats.read().await;
        Ok(running
            .iter()
            .filter_map(|c| live.get(&c.id).cloned())
            .collect())
    }
}
