//! Ranked leaderboard built from every quiz's results.

pub mod aggregator;
pub mod reader;
pub mod worker;

pub use aggregator::{LeaderboardAggregator, RebuildStats};
pub use reader::LeaderboardReader;
pub use worker::{
    DEFAULT_REBUILD_PERIOD, RebuildHandle, RebuildReport, RebuildTrigger, RebuildWorker, RequestStatus,
    spawn_report_logger, spawn_ticker,
};
