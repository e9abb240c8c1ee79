use serde_json::{Map, Value};
use signal_core::{SchedulerStatus, SignalPlan, SignalScheduler};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Shared scheduler behind the HTTP API.
///
/// Counts and the last green approach live under one lock so every schedule
/// sees a consistent snapshot and decisions are strictly ordered.
pub struct SignalService {
    scheduler: Mutex<SignalScheduler>,
}

impl SignalService {
    pub fn new(scheduler: SignalScheduler) -> Self {
        Self {
            scheduler: Mutex::new(scheduler),
        }
    }

    /// Applies a count update; returns the caller-facing `(ok, message)` pair.
    pub async fn update_counts(&self, update: &Map<String, Value>) -> (bool, String) {
        let mut scheduler = self.scheduler.lock().await;
        let (ok, message) = scheduler.update_counts_report(update);
        if ok {
            info!(counts = ?scheduler.counts(), "counts updated");
        } else {
            warn!(%message, "count update rejected");
        }
        (ok, message)
    }

    pub async fn compute_schedule(&self) -> SignalPlan {
        let mut scheduler = self.scheduler.lock().await;
        let plan = scheduler.compute_schedule();
        if let Some((direction, secs)) = plan.green() {
            info!(%direction, secs, "green phase scheduled");
        }
        plan
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.scheduler.lock().await.status()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use signal_core::Direction;

    use super::*;

    #[tokio::test]
    async fn concurrent_schedules_stay_fair() {
        let svc = Arc::new(SignalService::new(SignalScheduler::new()));
        let update = json!({"north": 30, "south": 30, "east": 30, "west": 30});
        svc.update_counts(update.as_object().unwrap()).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move { svc.compute_schedule().await }));
        }
        let mut served = Vec::new();
        for h in handles {
            served.push(h.await.unwrap().green().unwrap().0);
        }
        // Equal demand alternates north and south once decisions are serialized.
        let north = served.iter().filter(|d| **d == Direction::North).count();
        let south = served.iter().filter(|d| **d == Direction::South).count();
        assert_eq!((north, south), (8, 8));
        assert!(svc.status().await.last_green.is_some());
    }

    #[tokio::test]
    async fn rejected_update_reports_message() {
        let svc = SignalService::new(SignalScheduler::new());
        let (ok, message) = svc
            .update_counts(json!({"west": "lots"}).as_object().unwrap())
            .await;
        assert!(!ok);
        assert!(message.contains("west"));
        assert_eq!(svc.status().await.counts.get(Direction::West), 0);
    }
}
