use agent_bridge::canonical::CanonicalAgent;
use agent_bridge::framework::AgentFramework;
use agent_bridge::ontology::vocabulary::CanonicalPredicate;
use agent_bridge::rdf::Iri;
use agent_bridge::store::TemporalStore;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

fn named(uri: &str, name: &str) -> CanonicalAgent {
    let mut agent = CanonicalAgent::new(Iri::new(uri), AgentFramework::Usa);
    agent.set_value(CanonicalPredicate::HasName, &json!(name));
    agent
}

#[test]
fn same_uri_ingests_never_lose_updates() {
    let store = Arc::new(TemporalStore::in_memory().with_snapshot_interval(3));
    let uri = "urn:agent:shared";

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || store.ingest(&named(uri, &format!("writer-{}", i))).unwrap())
        })
        .collect();
    let ids: BTreeSet<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(ids, (1..=8).collect::<BTreeSet<u64>>());
    let uri = Iri::new(uri);
    let history = store.history(&uri).unwrap();
    assert_eq!(history.len(), 8);
    for (i, meta) in history.iter().enumerate() {
        assert_eq!(meta.version_id, i as u64 + 1);
        assert_eq!(meta.parent_version_id, if i == 0 { None } else { Some(i as u64) });
    }

    let names: BTreeSet<String> = (1..=8)
        .map(|v| {
            store
                .get_at_version(&uri, v)
                .unwrap()
                .value(CanonicalPredicate::HasName)
                .unwrap()
                .and_then(|n| n.as_str().map(str::to_string))
                .unwrap()
        })
        .collect();
    assert_eq!(names.len(), 8);
}

#[test]
fn different_uris_proceed_independently() {
    let store = Arc::new(TemporalStore::in_memory());

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                let uri = format!("urn:agent:worker-{}", i);
                for revision in 0..5 {
                    store
                        .ingest(&named(&uri, &format!("{}-{}", uri, revision)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.uris().unwrap().len(), 6);
    for i in 0..6 {
        let uri = Iri::new(format!("urn:agent:worker-{}", i));
        assert_eq!(store.history(&uri).unwrap().len(), 5);
        let latest = store.get_latest(&uri).unwrap();
        assert_eq!(
            latest.value(CanonicalPredicate::HasName).unwrap(),
            Some(json!(format!("urn:agent:worker-{}-4", i)))
        );
    }
}
