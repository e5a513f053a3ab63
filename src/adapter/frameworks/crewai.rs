//! CrewAI adapter.
//!
//! CrewAI requires role, goal and backstory. Defaults derive them from the
//! closest canonical statements so that lowered agents always validate.

use crate::adapter::table::{
    default_name, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::canonical::CanonicalAgent;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;
use serde_json::Value;

fn first_text(agent: &CanonicalAgent, predicates: &[P]) -> Option<String> {
    predicates.iter().find_map(|p| match agent.value(*p) {
        Ok(Some(Value::String(s))) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn default_goal(agent: &CanonicalAgent) -> Value {
    Value::String(
        first_text(agent, &[P::HasDescription])
            .unwrap_or_else(|| "Complete the assigned tasks".to_string()),
    )
}

fn default_backstory(agent: &CanonicalAgent) -> Value {
    match first_text(agent, &[P::HasInstructions, P::HasDescription]) {
        Some(text) => Value::String(text),
        None => Value::String(format!("{} agent", agent.uri.local_name())),
    }
}

static FIELDS: &[FieldMapping] = &[
    FieldMapping::required("role", P::HasRole, FieldKind::String, default_name),
    FieldMapping::required("goal", P::HasGoal, FieldKind::String, default_goal),
    FieldMapping::required("backstory", P::HasBackstory, FieldKind::String, default_backstory),
    FieldMapping::optional("name", P::HasName, FieldKind::String),
    FieldMapping::optional("tools", P::HasTool, FieldKind::List),
    FieldMapping::optional("llm", P::UsesModel, FieldKind::String),
    FieldMapping::optional("allow_delegation", P::AllowsDelegation, FieldKind::Bool),
    FieldMapping::optional("memory", P::HasMemory, FieldKind::Bool),
];

static INDICATORS: &[Indicator] = &[
    Indicator::present("role"),
    Indicator::present("goal"),
    Indicator::present("backstory"),
    Indicator::present("allow_delegation"),
    Indicator::present("verbose"),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::CrewAi,
        version_range((0, 1, 0), Some((1, 0, 0))),
        Version::new(0, 80, 0),
        FIELDS,
    )
    .with_name("name")
    .with_detection(INDICATORS, 3)
}
