//! Language Model Operating System adapter.

use crate::adapter::table::{
    default_identity, default_name, version_range, FieldKind, FieldMapping, Indicator, TableAdapter,
};
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::CanonicalPredicate as P;
use semver::Version;

static FIELDS: &[FieldMapping] = &[
    FieldMapping::required("agent_id", P::HasIdentity, FieldKind::String, default_identity),
    FieldMapping::required("name", P::HasName, FieldKind::String, default_name),
    FieldMapping::optional("description", P::HasDescription, FieldKind::String),
    FieldMapping::optional("system_prompt", P::HasInstructions, FieldKind::String),
    FieldMapping::optional("skills", P::HasCapability, FieldKind::StringList),
    FieldMapping::optional("model", P::UsesModel, FieldKind::String),
    FieldMapping::optional("temperature", P::HasTemperature, FieldKind::Number),
    FieldMapping::optional("max_tokens", P::HasMaxTokens, FieldKind::Integer),
    FieldMapping::optional("memory", P::HasMemory, FieldKind::Any),
];

static INDICATORS: &[Indicator] = &[
    Indicator::present("agent_id"),
    Indicator::present("system_prompt"),
    Indicator::typed("skills", FieldKind::List),
    Indicator::typed("channels", FieldKind::List),
];

pub fn adapter() -> TableAdapter {
    TableAdapter::new(
        AgentFramework::Lmos,
        version_range((1, 0, 0), Some((2, 0, 0))),
        Version::new(1, 0, 0),
        FIELDS,
    )
    .with_identity("agent_id")
    .with_name("name")
    .with_detection(INDICATORS, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::contract::FrameworkAdapter;
    use crate::canonical::NativeAgent;
    use serde_json::json;

    #[test]
    fn test_agent_id_is_required_on_input() {
        let native = NativeAgent::new(
            AgentFramework::Lmos,
            json!({"name": "Billing"}),
            Version::new(1, 0, 0),
        );
        let err = adapter().to_canonical(&native).unwrap_err();
        assert_eq!(err.field_path(), Some("agent_id"));
    }

    #[test]
    fn test_identity_drives_uri() {
        let native = NativeAgent::new(
            AgentFramework::Lmos,
            json!({"agent_id": "billing-agent", "name": "Billing", "skills": ["refunds"]}),
            Version::new(1, 0, 0),
        );
        let lifted = adapter().to_canonical(&native).unwrap();
        assert_eq!(lifted.value.uri.as_str(), "urn:agent:billing-agent");
        assert!(lifted.value.extensions.is_empty());
    }
}
