//! LangChain agent adapter.

use crate::adapter::table::{
    default_name, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;

static FIELDS: &[FieldMapping] = &[
    FieldMapping::required("name", P::HasName, FieldKind::String, default_name),
    FieldMapping::optional("prompt.template", P::HasInstructions, FieldKind::String),
    FieldMapping::optional("llm.model_name", P::UsesModel, FieldKind::String),
    FieldMapping::optional("llm.temperature", P::HasTemperature, FieldKind::Number),
    FieldMapping::optional("tools", P::HasTool, FieldKind::List),
    FieldMapping::optional("memory", P::HasMemory, FieldKind::Any),
];

static INDICATORS: &[Indicator] = &[
    Indicator::present("agent_type"),
    Indicator::typed("llm", FieldKind::Object),
    Indicator::typed("prompt", FieldKind::Object),
    Indicator::present("max_iterations"),
    Indicator::present("return_intermediate_steps"),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::LangChain,
        version_range((0, 1, 0), Some((1, 0, 0))),
        Version::new(0, 3, 0),
        FIELDS,
    )
    .with_name("name")
    .with_detection(INDICATORS, 2)
}
