//! OpenAI Assistants adapter.

use crate::adapter::table::{
    json_type, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::adapter::validation::ValidationResult;
use crate::canonical::CanonicalAgent;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;
use serde_json::{json, Value};

/// Model used when the canonical agent names none
pub const DEFAULT_MODEL: &str = "gpt-4o";

fn default_model(_: &CanonicalAgent) -> Value {
    Value::String(DEFAULT_MODEL.to_string())
}

/// Bare tool names become function tools
fn lower_tools(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => json!({"type": "function", "function": {"name": name}}),
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
        let typed = tool.get("type").map_or(false, Value::is_string);
        result.add_check(&format!("tools[{}] has a type", i), typed);
        if !typed {
            result.add_error(
                format!("tools.{}", i),
                format!("expected an object with a string type, found {}", json_type(tool)),
            );
        }
    }
}

static FIELDS: &[FieldMapping] = &[
    FieldMapping::optional("id", P::HasIdentity, FieldKind::String),
    FieldMapping::optional("name", P::HasName, FieldKind::String),
    FieldMapping::optional("description", P::HasDescription, FieldKind::String),
    FieldMapping::optional("instructions", P::HasInstructions, FieldKind::String),
    FieldMapping::required("model", P::UsesModel, FieldKind::String, default_model),
    FieldMapping::optional("tools", P::HasTool, FieldKind::List).lowered_with(lower_tools),
    FieldMapping::optional("temperature", P::HasTemperature, FieldKind::Number),
];

static INDICATORS: &[Indicator] = &[
    Indicator::typed("model", FieldKind::String),
    Indicator::present("instructions"),
    Indicator::present("tool_resources"),
    Indicator::present("response_format"),
    Indicator::present("top_p"),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::OpenAi,
        version_range((1, 0, 0), Some((3, 0, 0))),
        Version::new(2, 0, 0),
        FIELDS,
    )
    .with_identity("id")
    .with_name("name")
    .with_hook(validate_tools)
    .with_detection(INDICATORS, 2)
}
