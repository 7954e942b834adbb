//! Cron-based scheduler for the daily journal broadcast

use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info};

/// Tick delivered into the runtime loop when the journal schedule fires.
///
/// Delivering a tick over a channel (instead of running the broadcast here)
/// keeps journal rendering on the same single-threaded execution context as
/// inbound updates, so the scheduled task never races an in-flight mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalTick;

/// Scheduler that emits a `JournalTick` at the configured local time of day
pub struct JournalScheduler {
    schedule: Schedule,
    timezone: Tz,
    tx: mpsc::Sender<JournalTick>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JournalScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `cron_expr` - Six-field cron expression (with seconds)
    /// * `timezone` - Time zone the expression is evaluated in
    /// * `tx` - Channel the ticks are delivered on
    pub fn new(
        cron_expr: &str,
        timezone: Tz,
        tx: mpsc::Sender<JournalTick>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            cron = %cron_expr,
            timezone = %timezone,
            "JournalScheduler: created with schedule '{}' in {}",
            cron_expr,
            timezone
        );

        Ok(Self {
            schedule,
            timezone,
            tx,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) {
        let schedule = self.schedule.clone();
        let timezone = self.timezone;
        let tx = self.tx.clone();
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!("JournalScheduler: started, waiting for schedule...");

            loop {
                let mut upcoming = schedule.upcoming(timezone);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now().with_timezone(&timezone);
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    // No more scheduled times, wait a bit and check again
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                debug!("JournalScheduler: schedule fired, delivering tick");
                if let Err(e) = tx.send(JournalTick).await {
                    error!(error = %e, "JournalScheduler: runtime gone, stopping");
                    break;
                }
            }
        });

        {
            let mut h = handle_arc.write().await;
            *h = Some(handle);
        }

        info!("JournalScheduler: started successfully");
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JournalScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
