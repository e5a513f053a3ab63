use agent_bridge::adapter::AdapterRegistry;
use agent_bridge::bridge::{codes, Orchestrator, OrchestratorSettings, TranslateOptions, TranslationStage};
use agent_bridge::canonical::{FieldPath, CANONICAL_URI_KEY};
use agent_bridge::error::ApiError;
use agent_bridge::framework::AgentFramework;
use agent_bridge::ontology::vocabulary::CanonicalPredicate;
use agent_bridge::rdf::{ExtensionKey, Iri};
use agent_bridge::store::TemporalStore;
use agent_bridge::AgentBridge;
use serde_json::json;
use std::sync::Arc;

use crate::integration::support::usa;

fn ada() -> serde_json::Value {
    json!({"name": "Ada", "capabilities": ["code_gen"], "customField": "xyz"})
}

#[tokio::test]
async fn scenario_a_usa_to_lmos_drops_unmapped_field() {
    let bridge = AgentBridge::in_memory().unwrap();
    let result = bridge
        .translate(&usa(ada()), AgentFramework::Lmos, &TranslateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.stage, TranslationStage::Done);

    let canonical = result.canonical.as_ref().unwrap();
    assert_eq!(canonical.value(CanonicalPredicate::HasName).unwrap(), Some(json!("Ada")));
    assert_eq!(
        canonical.value(CanonicalPredicate::HasCapability).unwrap(),
        Some(json!(["code_gen"]))
    );
    let key = ExtensionKey {
        framework: AgentFramework::Usa,
        field_path: FieldPath::parse("customField"),
    };
    assert_eq!(canonical.extension(&key).unwrap().value, json!("xyz"));

    let lmos = result.result.as_ref().unwrap();
    assert_eq!(lmos.framework, AgentFramework::Lmos);
    assert_eq!(lmos.data["name"], json!("Ada"));
    assert_eq!(lmos.data["skills"], json!(["code_gen"]));
    assert!(lmos.data.get("customField").is_none());

    assert!(result.fidelity_score < 1.0);
    let expected = 1.0 - (0.5 / 3.0 + 0.3 * 0.5 + 0.2 * 0.1);
    assert!((result.fidelity_score - expected).abs() < 1e-9);

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, codes::EXTENSION_DROPPED);
    assert!(result.warnings[0].message.contains("usa:customField"));
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn scenario_b_usa_round_trip_is_lossless() {
    let bridge = AgentBridge::in_memory().unwrap();
    let mut input = usa(ada());
    input.version = semver::Version::new(1, 2, 0);
    input.metadata.insert("owner".to_string(), "research".to_string());
    let result = bridge
        .translate(&input, AgentFramework::Usa, &TranslateOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.result.as_ref(), Some(&input));
    assert_eq!(result.fidelity_score, 1.0);
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn scenario_c_unregistered_target_writes_nothing() {
    let registry = Arc::new(AdapterRegistry::with_builtin_adapters());
    registry.unregister(AgentFramework::AutoGen);
    let store = Arc::new(TemporalStore::in_memory());
    let orchestrator = Orchestrator::new(registry, store.clone(), OrchestratorSettings::default());

    let outcome = orchestrator
        .translate(&usa(ada()), AgentFramework::AutoGen, &TranslateOptions::default())
        .await;
    match outcome {
        Err(ApiError::NoAdapter { framework, .. }) => assert_eq!(framework, AgentFramework::AutoGen),
        other => panic!("expected NoAdapter, got {:?}", other.map(|r| r.stage)),
    }
    assert!(store.uris().unwrap().is_empty());
    assert_eq!(store.latest_version(&Iri::new("urn:agent:ada")).unwrap(), None);
}

#[tokio::test]
async fn scenario_d_concurrent_ingests_of_different_uris() {
    let bridge = Arc::new(AgentBridge::in_memory().unwrap());

    let first = {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            bridge
                .translate(
                    &usa(json!({"name": "Ada", "model": "gpt-4o"})),
                    AgentFramework::Lmos,
                    &TranslateOptions::default(),
                )
                .await
        })
    };
    let second = {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            bridge
                .translate(
                    &usa(json!({"name": "Grace", "model": "claude"})),
                    AgentFramework::CrewAi,
                    &TranslateOptions::default(),
                )
                .await
        })
    };
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.version_id, Some(1));
    assert_eq!(second.version_id, Some(1));

    let ada = bridge.get_agent(&Iri::new("urn:agent:ada")).await.unwrap();
    let grace = bridge.get_agent(&Iri::new("urn:agent:grace")).await.unwrap();
    assert_eq!(ada.value(CanonicalPredicate::UsesModel).unwrap(), Some(json!("gpt-4o")));
    assert_eq!(grace.value(CanonicalPredicate::UsesModel).unwrap(), Some(json!("claude")));
    assert_eq!(ada.value(CanonicalPredicate::HasName).unwrap(), Some(json!("Ada")));
    assert_eq!(grace.value(CanonicalPredicate::HasName).unwrap(), Some(json!("Grace")));
}

#[tokio::test]
async fn accumulated_extensions_survive_a_multi_hop_return() {
    let bridge = AgentBridge::in_memory().unwrap();
    let options = TranslateOptions::default();

    bridge
        .translate(&usa(ada()), AgentFramework::Lmos, &options)
        .await
        .unwrap();

    // Second hop starts from LMOS, which never saw customField
    let lmos = agent_bridge::canonical::NativeAgent::new(
        AgentFramework::Lmos,
        json!({"agent_id": "ada", "name": "Ada", "skills": ["code_gen"]}),
        semver::Version::new(1, 0, 0),
    );
    let back = bridge
        .translate(&lmos, AgentFramework::Usa, &options)
        .await
        .unwrap();

    assert!(back.success);
    assert_eq!(back.version_id, Some(2));
    let data = &back.result.as_ref().unwrap().data;
    assert_eq!(data["customField"], json!("xyz"));
    assert_eq!(data["capabilities"], json!(["code_gen"]));
}

#[tokio::test]
async fn removed_custom_field_stays_removed_on_resubmit() {
    let bridge = AgentBridge::in_memory().unwrap();
    let options = TranslateOptions::default();
    bridge
        .translate(&usa(json!({"name": "Ada", "customField": "xyz"})), AgentFramework::Lmos, &options)
        .await
        .unwrap();

    let input = usa(json!({"name": "Ada"}));
    let result = bridge
        .translate(&input, AgentFramework::Usa, &options)
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.version_id, Some(2));
    assert_eq!(result.result.as_ref(), Some(&input));
    assert_eq!(result.fidelity_score, 1.0);

    let latest = bridge.get_agent(&Iri::new("urn:agent:ada")).await.unwrap();
    assert!(latest.extensions_for(AgentFramework::Usa).next().is_none());
}

#[tokio::test]
async fn identity_survives_a_hop_through_a_framework_without_ids() {
    let bridge = AgentBridge::in_memory().unwrap();
    let options = TranslateOptions::default();
    let first = bridge
        .translate(
            &usa(json!({
                "id": "agent-42",
                "name": "Ada",
                "role": "analyst",
                "goal": "Find trends",
                "backstory": "Former quant"
            })),
            AgentFramework::CrewAi,
            &options,
        )
        .await
        .unwrap();
    let crew = first.result.clone().unwrap();
    assert_eq!(
        crew.metadata.get(CANONICAL_URI_KEY).map(String::as_str),
        Some("urn:agent:agent-42")
    );

    let second = bridge
        .translate(&crew, AgentFramework::Usa, &options)
        .await
        .unwrap();
    assert!(second.success);
    let uri = first.canonical.as_ref().unwrap().uri.clone();
    assert_eq!(second.canonical.as_ref().unwrap().uri, uri);
    assert_eq!(second.version_id, Some(2));
    assert_eq!(bridge.get_agent_history(&uri).await.unwrap().len(), 2);
    assert_eq!(bridge.store().latest_version(&Iri::new("urn:agent:ada")).unwrap(), None);
}

#[tokio::test]
async fn predicates_without_a_target_field_are_reported() {
    let bridge = AgentBridge::in_memory().unwrap();
    let input = usa(json!({
        "name": "Ada",
        "capabilities": ["code_gen"],
        "role": "analyst",
        "goal": "Find trends",
        "backstory": "Former quant"
    }));
    let result = bridge
        .translate(&input, AgentFramework::CrewAi, &TranslateOptions::default().without_persistence())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, codes::PREDICATE_DROPPED);
    assert!(result.warnings[0].message.contains("hasCapability"));

    let report = result.fidelity.as_ref().unwrap();
    assert!((report.semantic_loss - 0.2).abs() < 1e-9);
    assert!((result.fidelity_score - (1.0 - (0.5 * 0.2 + 0.2 * 0.1))).abs() < 1e-9);
}

#[tokio::test]
async fn batch_results_keep_input_order() {
    let bridge = AgentBridge::in_memory().unwrap();
    let natives = vec![
        usa(json!({"name": "One"})),
        usa(json!({"description": "missing name"})),
        usa(json!({"name": "Three"})),
    ];
    let results = bridge
        .batch_translate(natives, AgentFramework::OpenAi, &TranslateOptions::default())
        .await;

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    assert!(first.success);
    assert_eq!(first.result.as_ref().unwrap().data["name"], json!("One"));

    let second = results[1].as_ref().unwrap();
    assert!(!second.success);
    assert_eq!(second.failed_at, Some(TranslationStage::Validating));

    let third = results[2].as_ref().unwrap();
    assert_eq!(third.result.as_ref().unwrap().data["name"], json!("Three"));
}

#[tokio::test]
async fn fidelity_stays_in_unit_interval_across_frameworks() {
    let bridge = AgentBridge::in_memory().unwrap();
    let input = usa(json!({
        "name": "Ada",
        "description": "Analyst",
        "role": "researcher",
        "goal": "answer questions",
        "capabilities": ["code_gen", "search"],
        "tools": ["search"],
        "model": "gpt-4o",
        "temperature": 0.2,
        "customField": {"nested": [1, 2, 3]}
    }));
    for target in AgentFramework::ALL {
        let result = bridge
            .translate(&input, target, &TranslateOptions::default().without_persistence())
            .await
            .unwrap();
        assert!(result.success, "{} failed: {:?}", target, result.errors);
        assert!((0.0..=1.0).contains(&result.fidelity_score), "{}", target);
    }
}
