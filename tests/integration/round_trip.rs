use agent_bridge::adapter::frameworks::{autogen, crewai, langchain, lmos, mcp, openai, usa};
use agent_bridge::adapter::{builtin_adapter, FieldKind, FrameworkAdapter, TableAdapter};
use agent_bridge::canonical::{FieldPath, NativeAgent};
use agent_bridge::framework::AgentFramework;
use proptest::prelude::*;
use semver::Version;
use serde_json::{json, Map, Value};

fn extra_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        prop::collection::vec("[a-z]{1,6}", 0..3).prop_map(|v| json!(v)),
        ("[a-z]{1,6}", any::<u16>()).prop_map(|(key, n)| {
            let mut nested = Map::new();
            nested.insert(key, json!(n));
            Value::Object(nested)
        }),
    ]
}

fn usa_document() -> impl Strategy<Value = Value> {
    (
        "[A-Z][a-z]{2,10}",
        prop::option::of("[A-Za-z ,.]{1,30}"),
        prop::collection::vec("[a-z_]{1,10}", 0..4),
        prop::option::of(1u32..100_000),
        prop::option::of(any::<bool>()),
        prop::collection::btree_map("x_[a-z]{1,8}", extra_value(), 0..4),
    )
        .prop_map(|(name, description, capabilities, max_tokens, delegation, extras)| {
            let mut doc = Map::new();
            doc.insert("name".to_string(), json!(name));
            if let Some(description) = description {
                doc.insert("description".to_string(), json!(description));
            }
            doc.insert("capabilities".to_string(), json!(capabilities));
            if let Some(max_tokens) = max_tokens {
                doc.insert("maxTokens".to_string(), json!(max_tokens));
            }
            if let Some(delegation) = delegation {
                doc.insert("allowDelegation".to_string(), json!(delegation));
            }
            for (key, value) in extras {
                doc.insert(key, value);
            }
            Value::Object(doc)
        })
}

proptest! {
    #[test]
    fn usa_documents_survive_their_own_adapter(data in usa_document()) {
        let adapter = builtin_adapter(AgentFramework::Usa);
        let native = NativeAgent::new(AgentFramework::Usa, data.clone(), Version::new(2, 0, 0));

        let lifted = adapter.to_canonical(&native).unwrap();
        let extras = data
            .as_object()
            .map(|o| o.keys().filter(|k| k.starts_with("x_")).count())
            .unwrap_or(0);
        prop_assert_eq!(lifted.value.extensions.len(), extras);

        let lowered = adapter.from_canonical(&lifted.value).unwrap();
        prop_assert_eq!(lowered.value.data, data);
        prop_assert!(lowered.report.defaulted_fields.is_empty());
    }
}

fn kind_value(kind: FieldKind) -> BoxedStrategy<Value> {
    match kind {
        FieldKind::String => "[A-Za-z][A-Za-z ,.]{0,15}".prop_map(Value::from).boxed(),
        FieldKind::Number => (0u32..200).prop_map(|n| json!(f64::from(n) / 10.0)).boxed(),
        FieldKind::Integer => (0u32..100_000).prop_map(|n| json!(n)).boxed(),
        FieldKind::Bool => any::<bool>().prop_map(Value::from).boxed(),
        FieldKind::StringList => prop::collection::vec("[a-z_]{1,10}", 0..4)
            .prop_map(|items| json!(items))
            .boxed(),
        // Tool-shaped objects satisfy both the MCP and OpenAI tool checks
        FieldKind::List => prop::collection::vec("[a-z]{1,8}", 0..3)
            .prop_map(|names| {
                Value::Array(
                    names
                        .into_iter()
                        .map(|name| json!({"type": "function", "name": name}))
                        .collect(),
                )
            })
            .boxed(),
        FieldKind::Object | FieldKind::Any => prop_oneof![
            "[a-z]{1,8}".prop_map(Value::from),
            any::<u16>().prop_map(Value::from),
            ("[a-z]{1,6}", any::<u16>()).prop_map(|(key, n)| {
                let mut nested = Map::new();
                nested.insert(key, json!(n));
                Value::Object(nested)
            }),
        ]
        .boxed(),
    }
}

/// Documents built from an adapter's own field table plus unmapped `x_` extras
fn table_document(adapter: &TableAdapter) -> BoxedStrategy<Value> {
    let rows: Vec<(FieldPath, FieldKind, bool)> = adapter
        .fields()
        .map(|(path, field)| (path.clone(), field.kind, field.required))
        .collect();
    let values: Vec<BoxedStrategy<Option<Value>>> = rows
        .iter()
        .map(|(_, kind, required)| {
            if *required {
                kind_value(*kind).prop_map(Some).boxed()
            } else {
                prop::option::of(kind_value(*kind)).boxed()
            }
        })
        .collect();
    (values, prop::collection::btree_map("x_[a-z]{1,8}", extra_value(), 0..4))
        .prop_map(move |(values, extras)| {
            let mut doc = Map::new();
            for ((path, _, _), value) in rows.iter().zip(values) {
                if let Some(value) = value {
                    path.set(&mut doc, value);
                }
            }
            for (key, value) in extras {
                doc.insert(key, value);
            }
            Value::Object(doc)
        })
        .boxed()
}

fn assert_round_trip(adapter: &TableAdapter, data: Value) -> Result<(), TestCaseError> {
    let native = NativeAgent::new(adapter.framework(), data.clone(), adapter.schema_version().clone());
    let lifted = adapter.to_canonical(&native).unwrap();
    let extras = data
        .as_object()
        .map(|o| o.keys().filter(|k| k.starts_with("x_")).count())
        .unwrap_or(0);
    prop_assert_eq!(lifted.value.extensions.len(), extras);

    let lowered = adapter.from_canonical(&lifted.value).unwrap();
    prop_assert_eq!(&lowered.value, &native);
    prop_assert!(lowered.report.defaulted_fields.is_empty());
    prop_assert!(lowered.report.dropped_predicates.is_empty());
    prop_assert!(adapter.validate(&lowered.value).is_valid());
    Ok(())
}

macro_rules! round_trip_property {
    ($name:ident, $framework:ident) => {
        proptest! {
            #[test]
            fn $name(data in table_document(&$framework::adapter())) {
                assert_round_trip(&$framework::adapter(), data)?;
            }
        }
    };
}

round_trip_property!(usa_table_documents_round_trip, usa);
round_trip_property!(lmos_table_documents_round_trip, lmos);
round_trip_property!(mcp_table_documents_round_trip, mcp);
round_trip_property!(langchain_table_documents_round_trip, langchain);
round_trip_property!(openai_table_documents_round_trip, openai);
round_trip_property!(crewai_table_documents_round_trip, crewai);
round_trip_property!(autogen_table_documents_round_trip, autogen);

#[test]
fn lmos_nested_memory_round_trips() {
    let adapter = builtin_adapter(AgentFramework::Lmos);
    let data = json!({
        "agent_id": "billing",
        "name": "Billing",
        "skills": [],
        "memory": {"kind": "vector", "size": 3},
        "routing": {"queue": "billing-high"}
    });
    let native = NativeAgent::new(AgentFramework::Lmos, data.clone(), Version::new(1, 0, 0));
    let lifted = adapter.to_canonical(&native).unwrap();
    let lowered = adapter.from_canonical(&lifted.value).unwrap();
    assert_eq!(lowered.value.data, data);
}
