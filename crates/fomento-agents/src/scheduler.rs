//! Background scheduler
//!
//! A spawned loop that ticks once a minute and fires four jobs: the
//! collection pipeline every few hours, the daily and weekly digests at their
//! configured local times, and the hourly cleanup. Job errors are logged and
//! the loop keeps running; the shutdown signal stops it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use fomento_common::{ALERT_FREQUENCY_DAILY, ALERT_FREQUENCY_WEEKLY};

use crate::manager::AgentManager;

const TICK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Hours between collection pipeline runs
    pub collection_interval_hours: u64,
    /// Local hour for the daily digest
    pub daily_digest_hour: u32,
    /// Local hour for the weekly digest, sent on Mondays
    pub weekly_digest_hour: u32,
    /// Hours between cleanup runs
    pub cleanup_interval_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            collection_interval_hours: 6,
            daily_digest_hour: 9,
            weekly_digest_hour: 8,
            cleanup_interval_hours: 1,
        }
    }
}

/// Per-job bookkeeping between ticks
#[derive(Debug, Default)]
struct JobState {
    last_collection: Option<tokio::time::Instant>,
    last_cleanup: Option<tokio::time::Instant>,
    last_daily_digest: Option<NaiveDate>,
    last_weekly_digest: Option<NaiveDate>,
}

/// Spawn the scheduler loop. Returns its join handle.
pub fn start(
    manager: Arc<AgentManager>,
    config: SchedulerConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            "Scheduler started: collection every {}h, daily digest at {:02}:00, \
             weekly digest Monday {:02}:00, cleanup every {}h",
            config.collection_interval_hours,
            config.daily_digest_hour,
            config.weekly_digest_hour,
            config.cleanup_interval_hours
        );

        let mut state = JobState::default();
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_pending(&manager, &config, &mut state).await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Scheduler shutting down");
                    break;
                }
            }
        }
    })
}

async fn run_pending(manager: &AgentManager, config: &SchedulerConfig, state: &mut JobState) {
    let now = tokio::time::Instant::now();
    let local_now = chrono::Local::now().naive_local();

    if interval_due(
        state.last_collection,
        Duration::from_secs(config.collection_interval_hours * 3600),
        now,
    ) {
        state.last_collection = Some(now);
        tracing::info!("Running scheduled collection job");
        let report = manager.run_collection_pipeline().await;
        if !report.errors.is_empty() {
            tracing::error!("Scheduled collection finished with errors: {:?}", report.errors);
        }
    }

    if interval_due(
        state.last_cleanup,
        Duration::from_secs(config.cleanup_interval_hours * 3600),
        now,
    ) {
        state.last_cleanup = Some(now);
        tracing::info!("Running scheduled cleanup job");
        if let Err(e) = manager.cleanup().await {
            tracing::error!("Cleanup job failed: {}", e);
        }
    }

    if daily_due(local_now, config.daily_digest_hour, state.last_daily_digest) {
        state.last_daily_digest = Some(local_now.date());
        tracing::info!("Running daily digest job");
        if let Err(e) = manager.run_scheduled_digest(ALERT_FREQUENCY_DAILY).await {
            tracing::error!("Daily digest job failed: {}", e);
        }
    }

    if weekly_due(local_now, config.weekly_digest_hour, state.last_weekly_digest) {
        state.last_weekly_digest = Some(local_now.date());
        tracing::info!("Running weekly digest job");
        if let Err(e) = manager.run_scheduled_digest(ALERT_FREQUENCY_WEEKLY).await {
            tracing::error!("Weekly digest job failed: {}", e);
        }
    }
}

/// An interval job fires on the first tick and then whenever its period has
/// elapsed.
fn interval_due(
    last: Option<tokio::time::Instant>,
    every: Duration,
    now: tokio::time::Instant,
) -> bool {
    match last {
        Some(last) => now.duration_since(last) >= every,
        None => true,
    }
}

/// An at-time job fires during its configured hour, at most once per day
fn daily_due(now: chrono::NaiveDateTime, hour: u32, last: Option<NaiveDate>) -> bool {
    now.hour() == hour && last != Some(now.date())
}

/// The weekly digest fires on Mondays during its configured hour
fn weekly_due(now: chrono::NaiveDateTime, hour: u32, last: Option<NaiveDate>) -> bool {
    now.weekday() == Weekday::Mon && daily_due(now, hour, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: (i32, u32, u32), hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_interval_due() {
        let now = tokio::time::Instant::now();
        assert!(interval_due(None, Duration::from_secs(3600), now));
        assert!(!interval_due(Some(now), Duration::from_secs(3600), now));

        let one_hour_ago = now - Duration::from_secs(3601);
        assert!(interval_due(Some(one_hour_ago), Duration::from_secs(3600), now));
    }

    #[test]
    fn test_daily_due_once_per_day() {
        // 2024-03-13 is a Wednesday
        let now = at((2024, 3, 13), 9);

        assert!(daily_due(now, 9, None));
        assert!(!daily_due(now, 9, Some(now.date())));
        assert!(daily_due(now, 9, Some(at((2024, 3, 12), 9).date())));
        assert!(!daily_due(at((2024, 3, 13), 10), 9, None));
    }

    #[test]
    fn test_weekly_due_only_on_monday() {
        // 2024-03-11 is a Monday
        let monday = at((2024, 3, 11), 8);
        let tuesday = at((2024, 3, 12), 8);

        assert!(weekly_due(monday, 8, None));
        assert!(!weekly_due(monday, 8, Some(monday.date())));
        assert!(!weekly_due(tuesday, 8, None));
    }
}
