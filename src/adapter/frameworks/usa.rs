//! Uniform Semantic Agent adapter.
//!
//! USA is the richest schema in the set: every canonical predicate has a
//! native field, so USA round trips are lossless.

use crate::adapter::table::{
    default_name, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;

static FIELDS: &[FieldMapping] = &[
    FieldMapping::optional("id", P::HasIdentity, FieldKind::String),
    FieldMapping::required("name", P::HasName, FieldKind::String, default_name),
    FieldMapping::optional("description", P::HasDescription, FieldKind::String),
    FieldMapping::optional("role", P::HasRole, FieldKind::String),
    FieldMapping::optional("goal", P::HasGoal, FieldKind::String),
    FieldMapping::optional("backstory", P::HasBackstory, FieldKind::String),
    FieldMapping::optional("systemPrompt", P::HasInstructions, FieldKind::String),
    FieldMapping::optional("capabilities", P::HasCapability, FieldKind::StringList),
    FieldMapping::optional("tools", P::HasTool, FieldKind::List),
    FieldMapping::optional("allowDelegation", P::AllowsDelegation, FieldKind::Bool),
    FieldMapping::optional("model", P::UsesModel, FieldKind::String),
    FieldMapping::optional("temperature", P::HasTemperature, FieldKind::Number),
    FieldMapping::optional("maxTokens", P::HasMaxTokens, FieldKind::Integer),
    FieldMapping::optional("memory", P::HasMemory, FieldKind::Any),
    FieldMapping::optional("protocols", P::SupportsProtocol, FieldKind::StringList),
];

static INDICATORS: &[Indicator] = &[
    Indicator::typed("capabilities", FieldKind::StringList),
    Indicator::present("systemPrompt"),
    Indicator::present("allowDelegation"),
    Indicator::present("maxTokens"),
    Indicator::present("protocols"),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::Usa,
        version_range((1, 0, 0), Some((3, 0, 0))),
        Version::new(2, 0, 0),
        FIELDS,
    )
    .with_identity("id")
    .with_name("name")
    .with_detection(INDICATORS, 1)
}
