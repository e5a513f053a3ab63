//! Adapter registry.
//!
//! Adapters register by `(framework, version range)`. The registry is owned by
//! an orchestrator instance; registration happens at startup or on explicit
//! reload, so steady-state lookups only take the read lock.

use crate::adapter::contract::FrameworkAdapter;
use crate::adapter::frameworks;
use crate::error::ApiError;
use crate::framework::AgentFramework;
use parking_lot::RwLock;
use semver::Version;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Built-in adapter for a framework
///
/// The match is exhaustive: a new [`AgentFramework`] variant does not compile
/// until its adapter exists.
pub fn builtin_adapter(framework: AgentFramework) -> Arc<dyn FrameworkAdapter> {
    match framework {
        AgentFramework::Usa => Arc::new(frameworks::usa::adapter()),
        AgentFramework::Lmos => Arc::new(frameworks::lmos::adapter()),
        AgentFramework::Mcp => Arc::new(frameworks::mcp::adapter()),
        AgentFramework::LangChain => Arc::new(frameworks::langchain::adapter()),
        AgentFramework::OpenAi => Arc::new(frameworks::openai::adapter()),
        AgentFramework::CrewAi => Arc::new(frameworks::crewai::adapter()),
        AgentFramework::AutoGen => Arc::new(frameworks::autogen::adapter()),
    }
}

/// Order `detect_framework` tries frameworks in; schemas with the most
/// distinctive markers come first
pub const DETECTION_ORDER: [AgentFramework; 7] = [
    AgentFramework::Usa,
    AgentFramework::Lmos,
    AgentFramework::AutoGen,
    AgentFramework::CrewAi,
    AgentFramework::Mcp,
    AgentFramework::LangChain,
    AgentFramework::OpenAi,
];

/// Registration summary returned by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    pub framework: AgentFramework,
    pub version_range: String,
    pub schema_version: String,
}

/// Registry of framework adapters keyed by framework tag
pub struct AdapterRegistry {
    /// Per framework, sorted by schema version, highest first
    adapters: RwLock<HashMap<AgentFramework, Vec<Arc<dyn FrameworkAdapter>>>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
        }
    }

    /// Registry holding one built-in adapter per framework
    pub fn with_builtin_adapters() -> Self {
        let registry = Self::new();
        for framework in AgentFramework::ALL {
            registry.register(builtin_adapter(framework));
        }
        registry
    }

    /// Register an adapter, replacing one with the same framework and schema version
    pub fn register(&self, adapter: Arc<dyn FrameworkAdapter>) {
        let framework = adapter.framework();
        debug!(
            framework = %framework,
            schema_version = %adapter.schema_version(),
            range = %adapter.version_range(),
            "Registering adapter"
        );
        let mut map = self.adapters.write();
        let entries = map.entry(framework).or_default();
        entries.retain(|existing| existing.schema_version() != adapter.schema_version());
        entries.push(adapter);
        entries.sort_by(|a, b| b.schema_version().cmp(a.schema_version()));
    }

    /// Remove every adapter registered for a framework
    pub fn unregister(&self, framework: AgentFramework) {
        self.adapters.write().remove(&framework);
    }

    /// Pick the adapter for `(framework, version)`
    ///
    /// With a version, the highest schema version whose range covers it wins.
    /// Without one, the highest registered schema version wins.
    pub fn resolve(
        &self,
        framework: AgentFramework,
        version: Option<&Version>,
    ) -> Result<Arc<dyn FrameworkAdapter>, ApiError> {
        let map = self.adapters.read();
        let candidates = map.get(&framework);
        let found = match version {
            Some(version) => candidates
                .and_then(|entries| entries.iter().find(|a| a.supports(version)).cloned()),
            None => candidates.and_then(|entries| entries.first().cloned()),
        };
        found.ok_or_else(|| ApiError::NoAdapter {
            framework,
            version: version.map(ToString::to_string),
        })
    }

    pub fn list(&self) -> Vec<AdapterInfo> {
        let map = self.adapters.read();
        let mut infos: Vec<AdapterInfo> = map
            .values()
            .flatten()
            .map(|adapter| AdapterInfo {
                framework: adapter.framework(),
                version_range: adapter.version_range().to_string(),
                schema_version: adapter.schema_version().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| {
            a.framework
                .cmp(&b.framework)
                .then_with(|| b.schema_version.cmp(&a.schema_version))
        });
        infos
    }

    /// First registered framework, in [`DETECTION_ORDER`], whose adapter recognises `data`
    pub fn detect_framework(&self, data: &Value) -> Option<AgentFramework> {
        let map = self.adapters.read();
        let detected = DETECTION_ORDER.into_iter().find(|framework| {
            map.get(framework)
                .map_or(false, |entries| entries.iter().any(|adapter| adapter.detect(data)))
        });
        debug!(framework = ?detected, "Framework detection");
        detected
    }

    pub fn is_registered(&self, framework: AgentFramework) -> bool {
        self.adapters
            .read()
            .get(&framework)
            .map_or(false, |entries| !entries.is_empty())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::table::{default_name, version_range, FieldKind, FieldMapping, TableAdapter};
    use crate::ontology::vocabulary::CanonicalPredicate;
    use serde_json::json;

    static LEGACY_FIELDS: &[FieldMapping] = &[FieldMapping::required(
        "title",
        CanonicalPredicate::HasName,
        FieldKind::String,
        default_name,
    )];

    fn legacy_usa() -> Arc<dyn FrameworkAdapter> {
        Arc::new(TableAdapter::new(
            AgentFramework::Usa,
            version_range((0, 1, 0), Some((1, 0, 0))),
            Version::new(0, 9, 0),
            LEGACY_FIELDS,
        ))
    }

    #[test]
    fn test_builtin_registry_covers_every_framework() {
        let registry = AdapterRegistry::with_builtin_adapters();
        for framework in AgentFramework::ALL {
            assert!(registry.is_registered(framework));
        }
        assert_eq!(registry.list().len(), AgentFramework::ALL.len());
    }

    #[test]
    fn test_resolve_by_version_range() {
        let registry = AdapterRegistry::with_builtin_adapters();
        registry.register(legacy_usa());

        let current = registry
            .resolve(AgentFramework::Usa, Some(&Version::new(2, 1, 0)))
            .unwrap();
        assert_eq!(current.schema_version(), &Version::new(2, 0, 0));

        let legacy = registry
            .resolve(AgentFramework::Usa, Some(&Version::new(0, 5, 0)))
            .unwrap();
        assert_eq!(legacy.schema_version(), &Version::new(0, 9, 0));

        let latest = registry.resolve(AgentFramework::Usa, None).unwrap();
        assert_eq!(latest.schema_version(), &Version::new(2, 0, 0));
    }

    #[test]
    fn test_uncovered_version_is_no_adapter() {
        let registry = AdapterRegistry::with_builtin_adapters();
        let err = registry
            .resolve(AgentFramework::Lmos, Some(&Version::new(7, 0, 0)))
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::NoAdapter { framework: AgentFramework::Lmos, .. }));
    }

    #[test]
    fn test_registries_are_isolated() {
        let a = AdapterRegistry::with_builtin_adapters();
        let b = AdapterRegistry::with_builtin_adapters();
        a.unregister(AgentFramework::CrewAi);
        assert!(!a.is_registered(AgentFramework::CrewAi));
        assert!(b.is_registered(AgentFramework::CrewAi));
        assert!(a.resolve(AgentFramework::CrewAi, None).is_err());
    }

    #[test]
    fn test_detects_each_builtin_schema() {
        let registry = AdapterRegistry::with_builtin_adapters();
        let cases = [
            (
                json!({"name": "Ada", "capabilities": ["code_gen"], "systemPrompt": "Be brief"}),
                AgentFramework::Usa,
            ),
            (
                json!({"agent_id": "billing", "name": "Billing", "skills": ["refunds"]}),
                AgentFramework::Lmos,
            ),
            (
                json!({"name": "coder", "system_message": "Write Python.", "llm_config": false}),
                AgentFramework::AutoGen,
            ),
            (
                json!({"role": "Analyst", "goal": "Find trends", "backstory": "Ex-quant"}),
                AgentFramework::CrewAi,
            ),
            (
                json!({"name": "weather", "capabilities": {"tools": {}}, "tools": []}),
                AgentFramework::Mcp,
            ),
            (
                json!({"name": "react", "agent_type": "zero-shot", "llm": {"model_name": "m"}}),
                AgentFramework::LangChain,
            ),
            (
                json!({"model": "gpt-4o", "instructions": "Help with math"}),
                AgentFramework::OpenAi,
            ),
        ];
        for (data, expected) in cases {
            assert_eq!(registry.detect_framework(&data), Some(expected), "{}", data);
        }
    }

    #[test]
    fn test_unrecognised_documents_detect_nothing() {
        let registry = AdapterRegistry::with_builtin_adapters();
        assert_eq!(registry.detect_framework(&json!({"name": "Ada"})), None);
        assert_eq!(registry.detect_framework(&json!("agent_id")), None);
        // One LMOS marker is not enough
        assert_eq!(registry.detect_framework(&json!({"agent_id": "x"})), None);
    }

    #[test]
    fn test_detection_skips_unregistered_frameworks() {
        let registry = AdapterRegistry::with_builtin_adapters();
        let crew = json!({"role": "Analyst", "goal": "Find trends", "backstory": "Ex-quant"});
        registry.unregister(AgentFramework::CrewAi);
        assert_eq!(registry.detect_framework(&crew), None);
    }
}
