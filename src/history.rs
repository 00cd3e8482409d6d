// Bounded trend history fed by the fast tier.

use crate::models::{FastSnapshot, HistoryPoint};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of points kept (about 80 s at a 2 s cadence).
pub const DEFAULT_CAPACITY: usize = 40;

/// Fixed-capacity FIFO of history points, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryWindow {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting exactly the oldest one when full.
    pub fn append(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Current points in chronological order.
    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Derive a history point from a fast snapshot at the given wall-clock instant.
pub fn point_from_snapshot<Tz>(snapshot: &FastSnapshot, at: chrono::DateTime<Tz>) -> HistoryPoint
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    HistoryPoint {
        timestamp: at.timestamp(),
        label: at.format("%H:%M:%S").to_string(),
        cpu_percent: snapshot.load.current_load,
        memory_percent: snapshot.memory.active_percent(),
    }
}

/// Handle shared between the fast poller (only writer) and readers.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory(Arc<RwLock<HistoryWindow>>);

impl SharedHistory {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(RwLock::new(HistoryWindow::new(capacity))))
    }

    /// Append the point derived from `snapshot`, stamped with the local time.
    pub async fn append_snapshot(&self, snapshot: &FastSnapshot) {
        let point = point_from_snapshot(snapshot, chrono::Local::now());
        self.0.write().await.append(point);
    }

    pub async fn snapshot(&self) -> Vec<HistoryPoint> {
        self.0.read().await.snapshot()
    }
}
