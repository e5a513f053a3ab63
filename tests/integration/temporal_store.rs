use agent_bridge::canonical::{CanonicalAgent, ExtensionProperty, FieldPath};
use agent_bridge::error::StorageError;
use agent_bridge::framework::AgentFramework;
use agent_bridge::ontology::vocabulary::CanonicalPredicate;
use agent_bridge::ontology::Ontology;
use agent_bridge::rdf::{Iri, Predicate, TriplePattern};
use agent_bridge::store::{SledKv, TemporalStore, VersionKind};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn agent(uri: &str, revision: usize) -> CanonicalAgent {
    let mut agent = CanonicalAgent::new(Iri::new(uri), AgentFramework::Usa);
    agent.set_value(CanonicalPredicate::HasName, &json!(format!("Ada v{}", revision)));
    let skills: Vec<String> = (0..=revision % 4).map(|i| format!("skill-{}", i)).collect();
    agent.set_value(CanonicalPredicate::HasCapability, &json!(skills));
    if revision % 2 == 0 {
        agent.set_value(CanonicalPredicate::UsesModel, &json!("gpt-4o"));
    }
    agent.put_extension(ExtensionProperty::new(
        AgentFramework::Usa,
        FieldPath::parse("revision"),
        json!(revision),
    ));
    agent
}

fn sled_store(dir: &TempDir, interval: u64) -> TemporalStore {
    let kv = SledKv::open(&dir.path().join("store")).unwrap();
    TemporalStore::new(Arc::new(kv), Ontology::builtin()).with_snapshot_interval(interval)
}

#[test]
fn delta_chain_reconstructs_across_snapshot_interval() {
    let store = TemporalStore::in_memory().with_snapshot_interval(3);
    let uri = Iri::new("urn:agent:ada");
    let versions: Vec<CanonicalAgent> = (1..=8).map(|r| agent(uri.as_str(), r)).collect();
    for (i, version) in versions.iter().enumerate() {
        assert_eq!(store.ingest(version).unwrap(), i as u64 + 1);
    }

    let kinds: Vec<VersionKind> = store.history(&uri).unwrap().iter().map(|m| m.kind).collect();
    use VersionKind::{Delta, Snapshot};
    assert_eq!(kinds, vec![Snapshot, Delta, Delta, Snapshot, Delta, Delta, Snapshot, Delta]);

    for (i, expected) in versions.iter().enumerate() {
        let restored = store.get_at_version(&uri, i as u64 + 1).unwrap();
        assert_eq!(restored.quads, expected.quads, "version {}", i + 1);
        assert_eq!(restored.extensions, expected.extensions, "version {}", i + 1);
    }
    assert_eq!(store.get_latest(&uri).unwrap().quads, versions[7].quads);
}

#[test]
fn history_is_strictly_monotonic_and_reads_are_stable() {
    let store = TemporalStore::in_memory();
    let uri = Iri::new("urn:agent:ada");
    for revision in 1..=5 {
        store.ingest(&agent(uri.as_str(), revision)).unwrap();
    }

    let history = store.history(&uri).unwrap();
    for pair in history.windows(2) {
        assert!(pair[0].version_id < pair[1].version_id);
        assert!(pair[0].timestamp < pair[1].timestamp);
        assert_eq!(pair[1].parent_version_id, Some(pair[0].version_id));
    }
    assert_eq!(history[0].parent_version_id, None);

    let first = store.get_at_version(&uri, 2).unwrap();
    store.ingest(&agent(uri.as_str(), 9)).unwrap();
    assert_eq!(store.get_at_version(&uri, 2).unwrap(), first);
}

#[test]
fn identical_reingest_is_a_no_op() {
    let store = TemporalStore::in_memory();
    let ada = agent("urn:agent:ada", 1);
    assert_eq!(store.ingest(&ada).unwrap(), 1);
    assert_eq!(store.ingest(&ada).unwrap(), 1);
    assert_eq!(store.history(&ada.uri).unwrap().len(), 1);
}

#[test]
fn snapshot_restores_into_a_fresh_sled_store() {
    let source = TemporalStore::in_memory().with_snapshot_interval(2);
    let uri = Iri::new("urn:agent:ada");
    for revision in 1..=5 {
        source.ingest(&agent(uri.as_str(), revision)).unwrap();
    }
    let blob = source.snapshot(&uri).unwrap();

    let dir = TempDir::new().unwrap();
    let target = sled_store(&dir, 2);
    assert_eq!(target.restore(&uri, &blob).unwrap(), 5);
    assert_eq!(target.history(&uri).unwrap(), source.history(&uri).unwrap());
    for version in 1..=5 {
        assert_eq!(
            target.get_at_version(&uri, version).unwrap(),
            source.get_at_version(&uri, version).unwrap()
        );
    }

    // Existing history is never overwritten
    assert!(matches!(
        target.restore(&uri, &blob),
        Err(StorageError::HistoryExists(_))
    ));

    // Appending continues the restored chain
    assert_eq!(target.ingest(&agent(uri.as_str(), 6)).unwrap(), 6);
}

#[test]
fn restore_rejects_mismatched_uri_and_garbage() {
    let source = TemporalStore::in_memory();
    let uri = Iri::new("urn:agent:ada");
    source.ingest(&agent(uri.as_str(), 1)).unwrap();
    let blob = source.snapshot(&uri).unwrap();

    let target = TemporalStore::in_memory();
    assert!(matches!(
        target.restore(&Iri::new("urn:agent:grace"), &blob),
        Err(StorageError::InvalidArchive(_))
    ));
    assert!(matches!(
        target.restore(&uri, b"not an archive"),
        Err(StorageError::InvalidArchive(_))
    ));
    assert!(target.uris().unwrap().is_empty());
}

#[test]
fn sled_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let uri = Iri::new("urn:agent:ada");
    {
        let store = sled_store(&dir, 8);
        store.ingest(&agent(uri.as_str(), 1)).unwrap();
        store.ingest(&agent(uri.as_str(), 2)).unwrap();
    }
    let store = sled_store(&dir, 8);
    assert_eq!(store.latest_version(&uri).unwrap(), Some(2));
    assert_eq!(store.get_latest(&uri).unwrap().quads, agent(uri.as_str(), 2).quads);
    assert_eq!(store.ingest(&agent(uri.as_str(), 3)).unwrap(), 3);
}

#[test]
fn query_matches_latest_versions_of_every_agent() {
    let store = TemporalStore::in_memory();
    store.ingest(&agent("urn:agent:ada", 1)).unwrap();
    store.ingest(&agent("urn:agent:ada", 2)).unwrap();
    store.ingest(&agent("urn:agent:grace", 3)).unwrap();

    let names = store
        .query(&TriplePattern::any().with_predicate(Predicate::Canonical(CanonicalPredicate::HasName)))
        .unwrap();
    assert_eq!(names.len(), 2);

    let ada_only = store
        .query(
            &TriplePattern::any()
                .with_subject(Iri::new("urn:agent:ada"))
                .with_predicate(Predicate::Canonical(CanonicalPredicate::UsesModel)),
        )
        .unwrap();
    assert_eq!(ada_only.len(), 1);
}
