use super::DisplayStatus;
use crate::app_state::models::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info};

/// Periodically runs the all-indices pipeline in the background
pub struct IndexSyncScheduler {
    app_state: Arc<AppState>,
}

impl IndexSyncScheduler {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Runs one sync of every index; returns how many ended with a success status
    pub async fn trigger_update(&self) -> usize {
        info!("Starting background sync for all indices");

        // Same pipeline the /api/index/all endpoint runs
        let results = self
            .app_state
            .index_service
            .fetch_and_process_all_indices()
            .await;

        // Count indices that ended up with fresh display data
        let succeeded = results
            .values()
            .filter(|r| r.status == DisplayStatus::Success)
            .count();

        info!(
            "Completed background sync: {} of {} indices succeeded",
            succeeded,
            results.len()
        );

        succeeded
    }

    /// Spawns the scheduler loop and returns immediately
    pub fn start(&self) {
        // Scheduler configuration
        let sync_config = &self.app_state.settings.app_config.index_sync;
        if !sync_config.enabled {
            info!("Index sync scheduler is disabled in configuration");
            return;
        }

        // Log the operation window, if any
        if let (Some(start), Some(end)) = (&sync_config.start_time, &sync_config.end_time) {
            info!(
                "Scheduler operation window configured: {} to {} UTC",
                start, end
            );
        }

        info!(
            "Starting index sync scheduler with {} second interval",
            sync_config.interval_seconds,
        );

        let app_state = self.app_state.clone();
        let mut interval = time::interval(Duration::from_secs(sync_config.interval_seconds));

        tokio::spawn(async move {
            loop {
                // Wait for the next tick
                interval.tick().await;

                // Skip ticks outside the operation window
                if !app_state
                    .settings
                    .app_config
                    .index_sync
                    .is_operation_allowed()
                {
                    debug!(
                        "Scheduler: skipping sync - outside operation window (current time: {})",
                        chrono::Utc::now().format("%H:%M:%S")
                    );
                    continue;
                }

                // Run the sync
                info!("Scheduler: triggering index sync");
                IndexSyncScheduler::new(app_state.clone())
                    .trigger_update()
                    .await;
            }
        });
    }
}
