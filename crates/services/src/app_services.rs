use std::sync::Arc;

use storage::layout::ReservedTables;
use storage::{Storage, TableStore};
use tokio::sync::mpsc;

use crate::dispatch::Dispatcher;
use crate::error::AppServicesError;
use crate::instructor::InstructorDirectory;
use crate::leaderboard::{
    LeaderboardAggregator, LeaderboardReader, RebuildHandle, RebuildReport, RebuildWorker,
};
use crate::ledger::ScoreLedger;
use crate::quiz::{QuestionBank, QuizCatalog, QuizEngine, SessionStore};
use crate::transport::Transport;
use crate::Clock;

/// Assembles the quiz services over one table store and starts the
/// leaderboard worker.
#[derive(Clone)]
pub struct QuizServices {
    engine: Arc<QuizEngine>,
    catalog: Arc<QuizCatalog>,
    leaderboard: Arc<LeaderboardReader>,
    aggregator: Arc<LeaderboardAggregator>,
    instructor: Arc<InstructorDirectory>,
    rebuilds: RebuildHandle,
}

impl QuizServices {
    /// Build services over `storage` and spawn the rebuild worker.
    ///
    /// Must be called inside a tokio runtime. Rebuild reports arrive on the
    /// returned receiver.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the leaderboard table cannot be created.
    pub async fn start(
        storage: &Storage,
        clock: Clock,
        reserved: ReservedTables,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RebuildReport>), AppServicesError> {
        let tables: Arc<dyn TableStore> = Arc::clone(&storage.tables);
        tables.ensure_table(reserved.leaderboard()).await?;

        let reserved = Arc::new(reserved);
        let aggregator = Arc::new(LeaderboardAggregator::new(
            Arc::clone(&tables),
            Arc::clone(&reserved),
        ));
        let (rebuilds, reports, _worker) = RebuildWorker::spawn(Arc::clone(&aggregator), clock);

        let engine = Arc::new(
            QuizEngine::new(
                clock,
                QuestionBank::new(Arc::clone(&tables), Arc::clone(&reserved)),
                Arc::new(SessionStore::new()),
                ScoreLedger::new(clock, Arc::clone(&tables)),
            )
            .with_rebuilds(rebuilds.clone()),
        );
        let catalog = Arc::new(QuizCatalog::new(Arc::clone(&tables), Arc::clone(&reserved)));
        let leaderboard = Arc::new(LeaderboardReader::for_aggregator(
            Arc::clone(&tables),
            &aggregator,
        ));
        let instructor = Arc::new(InstructorDirectory::new(
            Arc::clone(&tables),
            reserved.instructor(),
        ));

        log::info!(
            "[SERVICES] ready (leaderboard table {:?}, instructor table {:?})",
            reserved.leaderboard(),
            reserved.instructor()
        );
        Ok((
            Self {
                engine,
                catalog,
                leaderboard,
                aggregator,
                instructor,
                rebuilds,
            },
            reports,
        ))
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn start_sqlite(
        db_url: &str,
        clock: Clock,
        reserved: ReservedTables,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RebuildReport>), AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::start(&storage, clock, reserved).await
    }

    #[must_use]
    pub fn dispatcher(&self, transport: Arc<dyn Transport>) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.catalog),
            Arc::clone(&self.leaderboard),
            Arc::clone(&self.instructor),
            transport,
        )
    }

    #[must_use]
    pub fn engine(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.engine)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<QuizCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardReader> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn aggregator(&self) -> Arc<LeaderboardAggregator> {
        Arc::clone(&self.aggregator)
    }

    #[must_use]
    pub fn instructor(&self) -> Arc<InstructorDirectory> {
        Arc::clone(&self.instructor)
    }

    #[must_use]
    pub fn rebuilds(&self) -> RebuildHandle {
        self.rebuilds.clone()
    }
}
