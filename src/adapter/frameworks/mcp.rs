//! Model Context Protocol server manifest adapter.
//!
//! MCP versions are protocol dates (`2025.6.18` for `2025-06-18`).

use crate::adapter::table::{
    default_name, json_type, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::adapter::validation::ValidationResult;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;
use serde_json::{json, Value};

fn lower_tools(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => json!({"name": name}),
                    Value::Object(mut tool) => {
                        // OpenAI function tools carry their name one level down
                        if !tool.contains_key("name") {
                            if let Some(name) = tool
                                .get("function")
                                .and_then(|f| f.get("name"))
                                .cloned()
                            {
                                tool.insert("name".to_string(), name);
                            }
                        }
                        Value::Object(tool)
                    }
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn validate_tools(data: &Value, result: &mut ValidationResult) {
    let Some(tools) = data.get("tools").and_then(Value::as_array) else {
        return;
    };
    for (i, tool) in tools.iter().enumerate() {
        let named = tool.get("name").map_or(false, Value::is_string);
        result.add_check(&format!("tools[{}] has a name", i), named);
        if !named {
            result.add_error(
                format!("tools.{}", i),
                format!("expected an object with a string name, found {}", json_type(tool)),
            );
        }
    }
}

static FIELDS: &[FieldMapping] = &[
    FieldMapping::required("name", P::HasName, FieldKind::String, default_name),
    FieldMapping::optional("description", P::HasDescription, FieldKind::String),
    FieldMapping::optional("instructions", P::HasInstructions, FieldKind::String),
    FieldMapping::optional("tools", P::HasTool, FieldKind::List).lowered_with(lower_tools),
];

static INDICATORS: &[Indicator] = &[
    Indicator::present("protocolVersion"),
    Indicator::present("serverInfo"),
    Indicator::typed("capabilities", FieldKind::Object),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::Mcp,
        version_range((2024, 11, 5), None),
        Version::new(2025, 6, 18),
        FIELDS,
    )
    .with_name("name")
    .with_hook(validate_tools)
    .with_detection(INDICATORS, 1)
}
