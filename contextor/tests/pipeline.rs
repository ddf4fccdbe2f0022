use std::{sync::Arc, time::Duration};

use ai_llm_service::types::Role;
use catalog::{Catalog, CatalogRecord, ESIM_KIND, RawAttributes};
use contextor::{
    ContextorError, ConversationStore, ConversationTurn, PipelineConfig, SearchPipeline,
    SearchRequest, Stage,
    mock::{MockCompleter, MockEmbedder, MockIndex},
};
use rag_store::IndexMatch;

struct Harness {
    pipeline: SearchPipeline,
    embedder: MockEmbedder,
    index: MockIndex,
    completer: MockCompleter,
    history: Arc<ConversationStore>,
}

fn catalog() -> Catalog {
    Catalog::from_records(vec![CatalogRecord {
        id: "m0".into(),
        name: Some("Japan 5GB".into()),
        description: Some("From the catalog".into()),
        kind: ESIM_KIND.into(),
        action: None,
        raw: Some(RawAttributes {
            group_key: Some("JP-DATA-5GB".into()),
            ..Default::default()
        }),
        denominations: vec![],
    }])
}

fn harness(index: MockIndex, completer: MockCompleter) -> Harness {
    harness_with(MockEmbedder::new(), index, completer, PipelineConfig::default())
}

fn harness_with(
    embedder: MockEmbedder,
    index: MockIndex,
    completer: MockCompleter,
    cfg: PipelineConfig,
) -> Harness {
    let history = Arc::new(ConversationStore::new());
    let pipeline = SearchPipeline::new(
        Arc::new(embedder.clone()),
        Arc::new(index.clone()),
        Arc::new(completer.clone()),
        Arc::new(catalog()),
        history.clone(),
        cfg,
    );
    Harness {
        pipeline,
        embedder,
        index,
        completer,
        history,
    }
}

fn request(user: &str, query: &str) -> SearchRequest {
    SearchRequest {
        user_id: user.into(),
        query: query.into(),
        prv_messages: vec![],
    }
}

#[tokio::test]
async fn relevant_match_takes_the_contextual_branch() {
    let h = harness(
        MockIndex::with_scores(&[0.92, 0.75, 0.6]),
        MockCompleter::with_answer("Try the Japan 5GB plan 🇯🇵"),
    );

    let resp = h.pipeline.run(request("u1", "japan data")).await.unwrap();

    assert_eq!(resp.query, "japan data");
    assert_eq!(resp.answer, "Try the Japan 5GB plan 🇯🇵");
    assert_eq!(resp.matches.len(), 1);
    assert_eq!(resp.matches[0].id, "m0");
    assert_eq!(resp.matches[0].group_id, "JP-DATA-5GB");
    // Index metadata wins over the catalog copy.
    assert_eq!(resp.matches[0].description, "Description 0");

    let sent = h.completer.received().await;
    assert_eq!(sent.len(), 1);
    let user_prompt = &sent[0].last().unwrap().content;
    assert!(user_prompt.contains("Product 0: Description 0"));
    assert!(!user_prompt.contains("Product 1"));

    // Contextual answers are not remembered.
    assert_eq!(h.history.total_turns("u1").await, 0);
}

#[tokio::test]
async fn no_relevant_match_falls_back_and_records_the_exchange() {
    let h = harness(
        MockIndex::with_scores(&[0.5, 0.3]),
        MockCompleter::with_answer("Could you tell me which country? 😊"),
    );

    let resp = h.pipeline.run(request("u1", "cheap plan")).await.unwrap();

    assert!(resp.matches.is_empty());
    assert!(!resp.answer.is_empty());

    let turns = h.history.get_recent("u1").await;
    assert_eq!(
        turns,
        vec![
            ConversationTurn::user("cheap plan"),
            ConversationTurn::assistant("Could you tell me which country? 😊"),
        ]
    );
}

#[tokio::test]
async fn missing_query_is_rejected_before_any_call() {
    let h = harness(MockIndex::with_scores(&[0.9]), MockCompleter::with_answer("x"));

    for req in [request("u1", ""), request("", "japan"), request("u1", "   ")] {
        let err = h.pipeline.run(req).await.unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "bad request: Missing userId or query");
    }

    assert_eq!(h.embedder.calls(), 0);
    assert_eq!(h.index.query_calls(), 0);
    assert_eq!(h.completer.calls(), 0);
}

#[tokio::test]
async fn embedding_failure_stops_the_pipeline() {
    let h = harness_with(
        MockEmbedder::failing(),
        MockIndex::with_scores(&[0.9]),
        MockCompleter::with_answer("x"),
        PipelineConfig::default(),
    );

    let err = h.pipeline.run(request("u1", "japan")).await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::Provider {
            stage: Stage::Embedding,
            ..
        }
    ));
    assert_eq!(h.index.query_calls(), 0);
    assert_eq!(h.completer.calls(), 0);
}

#[tokio::test]
async fn index_failure_skips_completion() {
    let h = harness(MockIndex::failing(), MockCompleter::with_answer("x"));

    let err = h.pipeline.run(request("u1", "japan")).await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::Provider {
            stage: Stage::Searching,
            ..
        }
    ));
    assert_eq!(h.completer.calls(), 0);
}

#[tokio::test]
async fn completion_failure_leaves_history_untouched() {
    let h = harness(MockIndex::with_scores(&[0.1]), MockCompleter::failing());

    let err = h.pipeline.run(request("u1", "japan")).await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::Provider {
            stage: Stage::Completing,
            ..
        }
    ));
    assert_eq!(h.history.total_turns("u1").await, 0);
}

#[tokio::test]
async fn concurrent_users_keep_separate_histories() {
    let h = Arc::new(harness(
        MockIndex::with_scores(&[0.2]),
        MockCompleter::with_answer("answer"),
    ));

    let mut tasks = Vec::new();
    for user in ["alice", "bob", "carol"] {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            h.pipeline
                .run(request(user, &format!("{user}'s query")))
                .await
                .map(|_| ())
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    for user in ["alice", "bob", "carol"] {
        let turns = h.history.get_recent(user).await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, format!("{user}'s query"));
    }
}

#[tokio::test]
async fn client_history_is_forwarded_verbatim() {
    let h = harness(MockIndex::with_scores(&[]), MockCompleter::with_answer("ok"));
    h.history
        .append("u1", ConversationTurn::user("stored turn"))
        .await;

    let mut req = request("u1", "and for Korea?");
    req.prv_messages = vec![
        ConversationTurn::user("eSIM for Japan?"),
        ConversationTurn::assistant("Here you go"),
    ];
    h.pipeline.run(req).await.unwrap();

    let sent = &h.completer.received().await[0];
    let roles: Vec<Role> = sent.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(sent[1].content, "eSIM for Japan?");
    assert!(sent.iter().all(|m| m.content != "stored turn"));
}

#[tokio::test]
async fn stored_history_is_used_when_client_sends_none() {
    let h = harness(MockIndex::with_scores(&[]), MockCompleter::with_answer("ok"));
    for i in 0..7 {
        h.history
            .append("u1", ConversationTurn::user(format!("old {i}")))
            .await;
    }

    h.pipeline.run(request("u1", "again")).await.unwrap();

    let sent = &h.completer.received().await[0];
    // system + last five stored turns + the new prompt
    assert_eq!(sent.len(), 7);
    assert_eq!(sent[1].content, "old 2");
    assert_eq!(sent[5].content, "old 6");
}

#[tokio::test]
async fn unknown_ids_degrade_to_empty_group() {
    let index = MockIndex::with_matches(vec![IndexMatch {
        id: "dangling".into(),
        score: 0.99,
        metadata: None,
    }]);
    let h = harness(index, MockCompleter::with_answer("ok"));

    let resp = h.pipeline.run(request("u1", "q")).await.unwrap();
    assert_eq!(resp.matches.len(), 1);
    assert_eq!(resp.matches[0].group_id, "");
    assert_eq!(resp.matches[0].name, "");
}

#[tokio::test(start_paused = true)]
async fn slow_completion_times_out() {
    let cfg = PipelineConfig {
        step_timeout: Duration::from_secs(2),
        ..PipelineConfig::default()
    };
    let h = harness_with(
        MockEmbedder::new(),
        MockIndex::with_scores(&[0.9]),
        MockCompleter::with_answer("late").delayed(Duration::from_secs(10)),
        cfg,
    );

    let err = h.pipeline.run(request("u1", "japan")).await.unwrap_err();
    match err {
        ContextorError::Provider { stage, message } => {
            assert_eq!(stage, Stage::Completing);
            assert!(message.contains("timed out"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
