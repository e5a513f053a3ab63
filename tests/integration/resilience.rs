use agent_bridge::adapter::AdapterRegistry;
use agent_bridge::bridge::{
    codes, Orchestrator, OrchestratorSettings, RetryPolicy, TranslateOptions, TranslationStage,
};
use agent_bridge::framework::AgentFramework;
use agent_bridge::ontology::Ontology;
use agent_bridge::store::TemporalStore;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::integration::support::{usa, FlakyKv};

fn orchestrator_over(kv: Arc<FlakyKv>) -> Orchestrator {
    let settings = OrchestratorSettings {
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
        },
        ..OrchestratorSettings::default()
    };
    Orchestrator::new(
        Arc::new(AdapterRegistry::with_builtin_adapters()),
        Arc::new(TemporalStore::new(kv, Ontology::builtin())),
        settings,
    )
}

#[tokio::test]
async fn transient_store_failures_are_retried() {
    let kv = Arc::new(FlakyKv::new(2));
    let orchestrator = orchestrator_over(kv.clone());

    let result = orchestrator
        .translate(&usa(json!({"name": "Ada"})), AgentFramework::Lmos, &TranslateOptions::default())
        .await
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.version_id, Some(1));
    // Two failed attempts, then the record and head writes
    assert_eq!(kv.puts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn exhausted_retries_fail_at_persisting_with_partial_output() {
    let kv = Arc::new(FlakyKv::new(100));
    let orchestrator = orchestrator_over(kv.clone());

    let result = orchestrator
        .translate(&usa(json!({"name": "Ada"})), AgentFramework::Lmos, &TranslateOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.stage, TranslationStage::Failed);
    assert_eq!(result.failed_at, Some(TranslationStage::Persisting));
    assert!(result.has_error(codes::STORAGE));
    assert!(result.canonical.is_some());
    assert!(result.result.is_none());
    assert_eq!(result.fidelity_score, 0.0);
    assert_eq!(kv.puts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn generous_deadline_completes() {
    let orchestrator = orchestrator_over(Arc::new(FlakyKv::new(0)));
    let options = TranslateOptions::default().with_deadline(Duration::from_secs(30));
    let result = orchestrator
        .translate(&usa(json!({"name": "Ada"})), AgentFramework::Mcp, &options)
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.duration_ms < 30_000);
}

#[tokio::test]
async fn expired_deadline_fails_without_writing() {
    let kv = Arc::new(FlakyKv::new(0));
    let orchestrator = orchestrator_over(kv.clone());
    let options = TranslateOptions::default().with_deadline(Duration::ZERO);
    let result = orchestrator
        .translate(&usa(json!({"name": "Ada"})), AgentFramework::Mcp, &options)
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.has_error(codes::TIMEOUT));
    assert_eq!(kv.puts.load(Ordering::SeqCst), 0);
}
