//! AutoGen adapter.

use crate::adapter::table::{
    default_name, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;

static FIELDS: &[FieldMapping] = &[
    FieldMapping::required("name", P::HasName, FieldKind::String, default_name),
    FieldMapping::optional("description", P::HasDescription, FieldKind::String),
    FieldMapping::optional("system_message", P::HasInstructions, FieldKind::String),
    FieldMapping::optional("llm_config.model", P::UsesModel, FieldKind::String),
    FieldMapping::optional("llm_config.temperature", P::HasTemperature, FieldKind::Number),
    FieldMapping::optional("llm_config.max_tokens", P::HasMaxTokens, FieldKind::Integer),
];

static INDICATORS: &[Indicator] = &[
    Indicator::present("system_message"),
    Indicator::present("llm_config"),
    Indicator::present("human_input_mode"),
    Indicator::present("max_consecutive_auto_reply"),
    Indicator::present("code_execution_config"),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::AutoGen,
        version_range((0, 2, 0), Some((1, 0, 0))),
        Version::new(0, 4, 0),
        FIELDS,
    )
    .with_name("name")
    .with_detection(INDICATORS, 2)
}
