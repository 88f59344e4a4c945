use std::sync::Arc;

use quiz_core::model::UserId;
use services::{LeaderboardAggregator, LeaderboardReader};
use storage::layout::{LEADERBOARD_REGION, RESULTS_REGION, ReservedTables};
use storage::{InMemoryTableStore, TableStore};

fn result(user: i64, name: &str, score: u32) -> Vec<String> {
    vec![user.to_string(), name.to_string(), format!("{score}/10")]
}

async fn quiz(store: &InMemoryTableStore, name: &str, rows: Vec<Vec<String>>) {
    store.ensure_table(name).await.unwrap();
    store.write_range(name, RESULTS_REGION, rows).await.unwrap();
}

fn wire(store: &InMemoryTableStore) -> (Arc<LeaderboardAggregator>, LeaderboardReader) {
    let tables: Arc<dyn TableStore> = Arc::new(store.clone());
    let aggregator = Arc::new(LeaderboardAggregator::new(
        Arc::clone(&tables),
        Arc::new(ReservedTables::default()),
    ));
    let reader = LeaderboardReader::for_aggregator(tables, &aggregator);
    (aggregator, reader)
}

#[tokio::test]
async fn ranks_by_total_then_passed_then_name() {
    let store = InMemoryTableStore::new();
    quiz(&store, "Q1", vec![result(1, "A", 5), result(2, "B", 10), result(3, "C", 2)]).await;
    quiz(&store, "Q2", vec![result(1, "A", 5), result(3, "C", 3)]).await;
    quiz(&store, "Q3", vec![result(3, "C", 3)]).await;
    let (aggregator, reader) = wire(&store);

    aggregator.rebuild().await.unwrap();
    let ranking: Vec<_> = reader
        .snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.display_name, e.total_score, e.quizzes_passed))
        .collect();
    assert_eq!(
        ranking,
        vec![
            ("A".to_string(), 10, 2),
            ("B".to_string(), 10, 1),
            ("C".to_string(), 8, 3),
        ]
    );

    let c = reader.lookup(UserId::new(3)).await.unwrap();
    assert_eq!(c.total_score, 8);
    let nobody = reader.lookup(UserId::new(99)).await.unwrap();
    assert_eq!((nobody.total_score, nobody.quizzes_passed), (0, 0));
}

#[tokio::test]
async fn concurrent_rebuilds_publish_one_consistent_ranking() {
    let store = InMemoryTableStore::new();
    quiz(&store, "Q1", (1..=20).map(|u| result(u, &format!("user{u:02}"), (u % 10) as u32)).collect()).await;
    quiz(&store, "Q2", (10..=30).map(|u| result(u, &format!("user{u:02}"), 3)).collect()).await;
    let (aggregator, reader) = wire(&store);

    aggregator.rebuild().await.unwrap();
    let expected = store.read_range("Leaderboard", LEADERBOARD_REGION).await.unwrap();

    let runs = (0..4).map(|_| {
        let aggregator = Arc::clone(&aggregator);
        tokio::spawn(async move { aggregator.rebuild().await.map(|stats| stats.entries) })
    });
    let readers = (0..4).map(|_| {
        let reader = reader.clone();
        tokio::spawn(async move { reader.snapshot().await.map(|entries| entries.len()) })
    });
    let runs: Vec<_> = runs.collect();
    let readers: Vec<_> = readers.collect();

    for run in runs {
        assert_eq!(run.await.unwrap().unwrap(), 30);
    }
    // readers may land between a clear and its write, never on a mix
    for reader in readers {
        let seen = reader.await.unwrap().unwrap();
        assert!(seen == 0 || seen == 30, "saw {seen} rows");
    }
    assert_eq!(
        store.read_range("Leaderboard", LEADERBOARD_REGION).await.unwrap(),
        expected
    );
}

#[tokio::test]
async fn reserved_tables_never_count() {
    let store = InMemoryTableStore::new();
    quiz(&store, "Q1", vec![result(1, "A", 1)]).await;
    quiz(&store, "Teacher", vec![result(2, "B", 9)]).await;
    quiz(&store, "Exam RESULTS", vec![result(3, "C", 9)]).await;
    let (aggregator, reader) = wire(&store);

    let stats = aggregator.rebuild().await.unwrap();
    assert_eq!(stats.tables_scanned, 1);
    let names: Vec<_> = reader
        .snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.display_name)
        .collect();
    assert_eq!(names, ["A"]);
}
