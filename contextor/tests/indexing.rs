use std::sync::Arc;

use catalog::{Catalog, CatalogRecord};
use contextor::{
    ContextorError, IndexingJob, PipelineConfig, Stage,
    mock::{MockEmbedder, MockIndex},
};

fn question(id: &str, q: &str) -> CatalogRecord {
    CatalogRecord {
        id: id.into(),
        name: Some(q.into()),
        description: Some(format!("answer to {q}")),
        kind: "faq".into(),
        action: None,
        raw: None,
        denominations: vec![],
    }
}

fn cfg(batch: usize) -> PipelineConfig {
    PipelineConfig {
        index_batch_size: batch,
        index_concurrency: 3,
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn catalog_is_indexed_in_order_and_batches() {
    let records: Vec<CatalogRecord> = (0..5)
        .map(|i| question(&format!("q{i}"), &format!("question {i}")))
        .collect();
    let embedder = MockEmbedder::new();
    let index = MockIndex::default();
    let job = IndexingJob::new(
        Arc::new(Catalog::from_records(records)),
        Arc::new(embedder.clone()),
        Arc::new(index.clone()),
        cfg(2),
    );

    let stats = job.run().await.unwrap();
    assert_eq!(stats.indexed, 5);
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.skipped, 0);

    let upserts = index.upserts().await;
    let sizes: Vec<usize> = upserts.iter().map(|(_, b)| b.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(upserts.iter().all(|(ns, _)| ns == "product-namespace"));

    let ids: Vec<String> = upserts
        .iter()
        .flat_map(|(_, b)| b.iter().map(|v| v.id.clone()))
        .collect();
    assert_eq!(ids, vec!["q0", "q1", "q2", "q3", "q4"]);
    assert_eq!(upserts[0].1[0].metadata["description"], "answer to question 0");
    assert_eq!(embedder.calls(), 5);
}

#[tokio::test]
async fn records_without_text_are_skipped() {
    let mut blank = question("blank", "");
    blank.name = None;
    let job = IndexingJob::new(
        Arc::new(Catalog::from_records(vec![question("a", "hello"), blank])),
        Arc::new(MockEmbedder::new()),
        Arc::new(MockIndex::default()),
        cfg(10),
    );

    let stats = job.run().await.unwrap();
    assert_eq!(stats.indexed, 1);
    assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn embedding_failure_aborts_before_upsert() {
    let index = MockIndex::default();
    let job = IndexingJob::new(
        Arc::new(Catalog::from_records(vec![question("a", "hello")])),
        Arc::new(MockEmbedder::failing()),
        Arc::new(index.clone()),
        cfg(10),
    );

    let err = job.run().await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::Provider {
            stage: Stage::Embedding,
            ..
        }
    ));
    assert!(index.upserts().await.is_empty());
}

#[tokio::test]
async fn upsert_failure_is_reported() {
    let job = IndexingJob::new(
        Arc::new(Catalog::from_records(vec![question("a", "hello")])),
        Arc::new(MockEmbedder::new()),
        Arc::new(MockIndex::failing()),
        cfg(10),
    );

    assert!(matches!(
        job.run().await,
        Err(ContextorError::Provider {
            stage: Stage::Upserting,
            ..
        })
    ));
}
