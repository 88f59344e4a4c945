use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quiz_core::time::format_timestamp;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::aggregator::{LeaderboardAggregator, RebuildStats};
use crate::error::LeaderboardError;
use crate::Clock;

/// Default period of the rebuild ticker.
pub const DEFAULT_REBUILD_PERIOD: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildTrigger {
    Startup,
    Timer,
    QuizCompleted,
}

impl fmt::Display for RebuildTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RebuildTrigger::Startup => "startup",
            RebuildTrigger::Timer => "timer",
            RebuildTrigger::QuizCompleted => "quiz completed",
        };
        f.write_str(label)
    }
}

/// What happened to a rebuild request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Queued,
    /// A rebuild was already waiting; this request rides along with it.
    Coalesced,
    /// The worker has stopped.
    Closed,
}

#[derive(Debug)]
pub struct RebuildReport {
    pub trigger: RebuildTrigger,
    pub outcome: Result<RebuildStats, LeaderboardError>,
    pub finished_at: DateTime<Utc>,
}

/// Sends rebuild requests to the worker without waiting.
#[derive(Clone)]
pub struct RebuildHandle {
    requests: mpsc::Sender<RebuildTrigger>,
}

impl RebuildHandle {
    #[must_use]
    pub fn request(&self, trigger: RebuildTrigger) -> RequestStatus {
        match self.requests.try_send(trigger) {
            Ok(()) => RequestStatus::Queued,
            Err(TrySendError::Full(_)) => RequestStatus::Coalesced,
            Err(TrySendError::Closed(_)) => RequestStatus::Closed,
        }
    }
}

/// Background task that owns leaderboard rebuilds.
///
/// At most one request waits while a rebuild runs; extra requests coalesce.
pub struct RebuildWorker;

impl RebuildWorker {
    /// Spawn the worker on the current runtime.
    ///
    /// The worker stops once every `RebuildHandle` is dropped. Reports are
    /// sent for every rebuild; dropping the receiver discards them.
    pub fn spawn(
        aggregator: Arc<LeaderboardAggregator>,
        clock: Clock,
    ) -> (
        RebuildHandle,
        mpsc::UnboundedReceiver<RebuildReport>,
        JoinHandle<()>,
    ) {
        let (requests, mut pending) = mpsc::channel(1);
        let (reports, report_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(trigger) = pending.recv().await {
                log::debug!("[LEADERBOARD] rebuild started ({trigger})");
                let outcome = aggregator.rebuild().await;
                let report = RebuildReport {
                    trigger,
                    outcome,
                    finished_at: clock.now(),
                };
                let _ = reports.send(report);
            }
            log::debug!("[LEADERBOARD] rebuild worker stopped");
        });

        (RebuildHandle { requests }, report_rx, task)
    }
}

/// Request a rebuild now and then every `period`, until the worker stops.
pub fn spawn_ticker(handle: RebuildHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger = RebuildTrigger::Startup;
        loop {
            ticker.tick().await;
            if handle.request(trigger) == RequestStatus::Closed {
                break;
            }
            trigger = RebuildTrigger::Timer;
        }
    })
}

/// Log every report until the worker stops.
pub fn spawn_report_logger(
    mut reports: mpsc::UnboundedReceiver<RebuildReport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            match report.outcome {
                Ok(stats) => log::info!(
                    "[LEADERBOARD] rebuilt ({}) at {}: {} users from {} quizzes, {} rows and {} tables skipped",
                    report.trigger,
                    format_timestamp(report.finished_at),
                    stats.entries,
                    stats.tables_scanned,
                    stats.rows_skipped,
                    stats.tables_skipped,
                ),
                Err(err) => log::warn!(
                    "[LEADERBOARD] rebuild ({}) failed: {err}",
                    report.trigger
                ),
            }
        }
    })
}
