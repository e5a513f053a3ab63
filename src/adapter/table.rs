//! Static field-table engine shared by every concrete adapter.
//!
//! Each framework declares a table of [`FieldMapping`] rows; [`TableAdapter`]
//! derives validation, lifting and lowering from that table. Anything the
//! table does not name is carried as an extension of the owning framework.

use crate::adapter::contract::{FrameworkAdapter, Mapped, MappingReport};
use crate::adapter::validation::ValidationResult;
use crate::canonical::{
    agent_uri, carried_uri, provenance, slugify, CanonicalAgent, ExtensionProperty, FieldPath,
    NativeAgent, CANONICAL_URI_KEY, NATIVE_METADATA_PREFIX,
};
use crate::error::AdapterError;
use crate::framework::AgentFramework;
use crate::ontology::vocabulary::{CanonicalPredicate, ONTOLOGY_VERSION};
use crate::types::content_hash_hex;
use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde_json::{Map, Value};
use std::fmt;

/// Accepted JSON shape of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Bool,
    StringList,
    List,
    Object,
    Any,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::StringList => value
                .as_array()
                .map_or(false, |items| items.iter().all(Value::is_string)),
            FieldKind::List => value.is_array(),
            FieldKind::Object => value.is_object(),
            FieldKind::Any => true,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "a string",
            FieldKind::Number => "a number",
            FieldKind::Integer => "an integer",
            FieldKind::Bool => "a boolean",
            FieldKind::StringList => "a list of strings",
            FieldKind::List => "a list",
            FieldKind::Object => "an object",
            FieldKind::Any => "any value",
        };
        f.write_str(name)
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fallback for a required field with no canonical value
pub type DefaultFn = fn(&CanonicalAgent) -> Value;

/// Reshape a canonical value into this framework's native form
pub type LowerFn = fn(Value) -> Value;

/// Framework-specific validation beyond the table
pub type ValidateHook = fn(&Value, &mut ValidationResult);

/// One row of a field table
#[derive(Clone, Copy)]
pub struct FieldMapping {
    pub path: &'static str,
    pub predicate: CanonicalPredicate,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<DefaultFn>,
    pub lower: Option<LowerFn>,
}

impl FieldMapping {
    pub const fn optional(path: &'static str, predicate: CanonicalPredicate, kind: FieldKind) -> Self {
        Self {
            path,
            predicate,
            kind,
            required: false,
            default: None,
            lower: None,
        }
    }

    /// Required on input; filled from `default` on output when absent
    pub const fn required(
        path: &'static str,
        predicate: CanonicalPredicate,
        kind: FieldKind,
        default: DefaultFn,
    ) -> Self {
        Self {
            path,
            predicate,
            kind,
            required: true,
            default: Some(default),
            lower: None,
        }
    }

    pub const fn lowered_with(self, lower: LowerFn) -> Self {
        Self {
            lower: Some(lower),
            ..self
        }
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("path", &self.path)
            .field("predicate", &self.predicate)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .finish()
    }
}

/// Marker field used to recognise a framework's raw documents
#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    pub path: &'static str,
    pub kind: Option<FieldKind>,
}

impl Indicator {
    pub const fn present(path: &'static str) -> Self {
        Self { path, kind: None }
    }

    pub const fn typed(path: &'static str, kind: FieldKind) -> Self {
        Self {
            path,
            kind: Some(kind),
        }
    }

    fn matches(&self, object: &Map<String, Value>) -> bool {
        FieldPath::parse(self.path)
            .get_in(object)
            .map_or(false, |value| self.kind.map_or(true, |kind| kind.accepts(value)))
    }
}

/// `>=min` or `>=min, <max`
pub fn version_range(min: (u64, u64, u64), max: Option<(u64, u64, u64)>) -> VersionReq {
    let comparator = |op, (major, minor, patch): (u64, u64, u64)| Comparator {
        op,
        major,
        minor: Some(minor),
        patch: Some(patch),
        pre: Prerelease::EMPTY,
    };
    let mut comparators = vec![comparator(Op::GreaterEq, min)];
    if let Some(max) = max {
        comparators.push(comparator(Op::Less, max));
    }
    VersionReq { comparators }
}

/// Name of the agent as a string default
pub fn default_name(agent: &CanonicalAgent) -> Value {
    match agent.value(CanonicalPredicate::HasName) {
        Ok(Some(Value::String(name))) if !name.trim().is_empty() => Value::String(name),
        _ => Value::String(agent.uri.local_name().to_string()),
    }
}

/// Slug of the canonical URI, stable across hops
pub fn default_identity(agent: &CanonicalAgent) -> Value {
    Value::String(agent.uri.local_name().to_string())
}

/// Adapter driven entirely by a static field table
pub struct TableAdapter {
    framework: AgentFramework,
    version_range: VersionReq,
    schema_version: Version,
    identity_path: Option<FieldPath>,
    name_path: Option<FieldPath>,
    fields: Vec<(FieldPath, FieldMapping)>,
    hook: Option<ValidateHook>,
    indicators: &'static [Indicator],
    min_indicators: usize,
}

impl TableAdapter {
    pub fn new(
        framework: AgentFramework,
        version_range: VersionReq,
        schema_version: Version,
        fields: &'static [FieldMapping],
    ) -> Self {
        Self {
            framework,
            version_range,
            schema_version,
            identity_path: None,
            name_path: None,
            fields: fields
                .iter()
                .map(|field| (FieldPath::parse(field.path), *field))
                .collect(),
            hook: None,
            indicators: &[],
            min_indicators: 1,
        }
    }

    /// Field whose value names the agent's stable identity
    pub fn with_identity(mut self, path: &str) -> Self {
        self.identity_path = Some(FieldPath::parse(path));
        self
    }

    /// Field used for the URI when no identity is present
    pub fn with_name(mut self, path: &str) -> Self {
        self.name_path = Some(FieldPath::parse(path));
        self
    }

    pub fn with_hook(mut self, hook: ValidateHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Recognise raw documents carrying at least `min` of `indicators`
    pub fn with_detection(mut self, indicators: &'static [Indicator], min: usize) -> Self {
        self.indicators = indicators;
        self.min_indicators = min.max(1);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldPath, &FieldMapping)> {
        self.fields.iter().map(|(path, field)| (path, field))
    }

    fn is_mapped(&self, path: &FieldPath) -> bool {
        self.fields.iter().any(|(p, _)| p == path)
    }

    fn has_mapped_below(&self, path: &FieldPath) -> bool {
        self.fields.iter().any(|(p, _)| path.is_prefix_of(p))
    }

    fn compatibility(&self, version: &Version) -> Option<AdapterError> {
        if version > &self.schema_version && self.version_range.matches(version) {
            Some(AdapterError::Compatibility {
                framework: self.framework,
                version: version.to_string(),
                supported: self.schema_version.to_string(),
            })
        } else {
            None
        }
    }

    fn string_at(&self, path: &Option<FieldPath>, object: &Map<String, Value>) -> Option<String> {
        path.as_ref()
            .and_then(|p| p.get_in(object))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Wrap every field the table does not name as an extension
    ///
    /// Objects are descended into only when a mapped path lies below them;
    /// everything else is captured whole.
    fn capture_unmapped(
        &self,
        object: &Map<String, Value>,
        parent: &FieldPath,
        agent: &mut CanonicalAgent,
        report: &mut MappingReport,
    ) {
        for (key, value) in object {
            let path = parent.child(key);
            if self.is_mapped(&path) {
                continue;
            }
            match value {
                Value::Object(inner) if !inner.is_empty() && self.has_mapped_below(&path) => {
                    self.capture_unmapped(inner, &path, agent, report);
                }
                _ => {
                    agent.put_extension(ExtensionProperty::new(
                        self.framework,
                        path.clone(),
                        value.clone(),
                    ));
                    report.extension_fields.push(path);
                }
            }
        }
    }

    fn restore_extension(
        &self,
        extension: &ExtensionProperty,
        data: &mut Map<String, Value>,
        report: &mut MappingReport,
    ) {
        let path = &extension.field_path;
        match path.get_in_mut(data) {
            None => {
                if path.set(data, extension.value.clone()) {
                    report.extension_fields.push(path.clone());
                } else {
                    report.warnings.push(format!(
                        "Extension {} could not be placed under a non-object parent",
                        extension.key()
                    ));
                }
            }
            Some(Value::Object(existing)) if extension.value.is_object() => {
                if let Value::Object(carried) = &extension.value {
                    for (key, value) in carried {
                        existing.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
                report.extension_fields.push(path.clone());
            }
            Some(_) => report.warnings.push(format!(
                "Extension {} is shadowed by a mapped field",
                extension.key()
            )),
        }
    }
}

impl FrameworkAdapter for TableAdapter {
    fn framework(&self) -> AgentFramework {
        self.framework
    }

    fn version_range(&self) -> &VersionReq {
        &self.version_range
    }

    fn schema_version(&self) -> &Version {
        &self.schema_version
    }

    fn detect(&self, data: &Value) -> bool {
        let Some(object) = data.as_object() else {
            return false;
        };
        !self.indicators.is_empty()
            && self.indicators.iter().filter(|i| i.matches(object)).count() >= self.min_indicators
    }

    fn validate(&self, native: &NativeAgent) -> ValidationResult {
        let mut result = ValidationResult::new(self.framework);

        result.add_check("framework matches adapter", native.framework == self.framework);
        if native.framework != self.framework {
            result.add_error(
                "$",
                format!("expected a {} document, found {}", self.framework, native.framework),
            );
            return result;
        }

        let in_range = self.version_range.matches(&native.version);
        result.add_check("version within supported range", in_range);
        if !in_range {
            result.add_warning(format!(
                "Version {} is outside supported range {}",
                native.version, self.version_range
            ));
        }
        result.add_check(
            "version not newer than schema",
            native.version <= self.schema_version,
        );

        let Some(object) = native.data.as_object() else {
            result.add_error("$", format!("expected an object, found {}", json_type(&native.data)));
            return result;
        };

        for (path, field) in &self.fields {
            match path.get_in(object) {
                None => {
                    result.add_check(&format!("{} present", path), !field.required);
                    if field.required {
                        result.add_error(path.to_string(), "required field is missing");
                    }
                }
                Some(value) => {
                    let accepted = field.kind.accepts(value);
                    result.add_check(&format!("{} is {}", path, field.kind), accepted);
                    if !accepted {
                        result.add_error(
                            path.to_string(),
                            format!("expected {}, found {}", field.kind, json_type(value)),
                        );
                    } else if field.required
                        && value.as_str().map_or(false, |s| s.trim().is_empty())
                    {
                        result.add_error(path.to_string(), "required field is blank");
                    }
                }
            }
        }

        if let Some(hook) = self.hook {
            hook(&native.data, &mut result);
        }
        result
    }

    fn to_canonical(&self, native: &NativeAgent) -> Result<Mapped<CanonicalAgent>, AdapterError> {
        let warnings = self.validate(native).into_result()?;
        let object = native.data.as_object().ok_or_else(|| {
            AdapterError::validation(self.framework, "$", "expected an object")
        })?;

        // An explicit identity wins; otherwise keep the URI an earlier hop recorded
        let identity = self
            .string_at(&self.identity_path, object)
            .filter(|id| !slugify(id).is_empty());
        let uri = match (identity, carried_uri(&native.metadata)) {
            (None, Some(uri)) => uri,
            (identity, _) => agent_uri(
                identity.as_deref(),
                self.string_at(&self.name_path, object).as_deref(),
                &native.data,
            ),
        };
        let mut agent = CanonicalAgent::new(uri, self.framework);
        let mut report = MappingReport {
            warnings,
            compatibility: self.compatibility(&native.version),
            ..MappingReport::default()
        };

        for (path, field) in &self.fields {
            if field.required {
                report.required_fields.push(path.clone());
            }
            if let Some(value) = path.get_in(object) {
                agent.set_value(field.predicate, value);
                report.mapped_fields.push(path.clone());
            }
        }
        self.capture_unmapped(object, &FieldPath::new(Vec::new()), &mut agent, &mut report);

        agent.metadata.insert(
            provenance::CONTENT_HASH.to_string(),
            content_hash_hex(native.data.to_string().as_bytes()),
        );
        agent.metadata.insert(
            provenance::SOURCE_FRAMEWORK.to_string(),
            self.framework.to_string(),
        );
        agent.metadata.insert(
            provenance::SOURCE_VERSION.to_string(),
            native.version.to_string(),
        );
        // Vocabulary version; the orchestrator restamps with the loaded ontology
        agent.metadata.insert(
            provenance::ONTOLOGY_VERSION.to_string(),
            ONTOLOGY_VERSION.to_string(),
        );
        for (key, value) in &native.metadata {
            agent
                .metadata
                .insert(format!("{}{}", NATIVE_METADATA_PREFIX, key), value.clone());
        }

        Ok(Mapped {
            value: agent,
            report,
        })
    }

    fn from_canonical(
        &self,
        canonical: &CanonicalAgent,
    ) -> Result<Mapped<NativeAgent>, AdapterError> {
        let mut data = Map::new();
        let mut report = MappingReport::default();

        for (path, field) in &self.fields {
            if field.required {
                report.required_fields.push(path.clone());
            }
            let value = canonical
                .value(field.predicate)
                .map_err(|e| AdapterError::mapping(self.framework, path.to_string(), e.to_string()))?
                .map(|value| match field.lower {
                    Some(lower) => lower(value),
                    None => value,
                });
            let value = match value {
                Some(value) if field.kind.accepts(&value) => Some(value),
                Some(value) => {
                    report.warnings.push(format!(
                        "{} cannot hold canonical {} value of type {}",
                        path,
                        field.predicate,
                        json_type(&value)
                    ));
                    None
                }
                None => None,
            };

            let (value, defaulted) = match (value, field.default) {
                (Some(value), _) => (value, false),
                (None, Some(default)) if field.required => (default(canonical), true),
                (None, _) => continue,
            };
            if !path.set(&mut data, value) {
                return Err(AdapterError::mapping(
                    self.framework,
                    path.to_string(),
                    "parent field is not an object",
                ));
            }
            if defaulted {
                report.defaulted_fields.push(path.clone());
            } else {
                report.mapped_fields.push(path.clone());
            }
        }

        for predicate in CanonicalPredicate::ALL {
            // Identity travels in the URI
            if predicate == CanonicalPredicate::HasIdentity || !canonical.has(predicate) {
                continue;
            }
            if !self.fields.iter().any(|(_, field)| field.predicate == predicate) {
                report.dropped_predicates.push(predicate);
            }
        }

        for extension in canonical.extensions_for(self.framework) {
            self.restore_extension(extension, &mut data, &mut report);
        }

        let native = if canonical.source_framework == self.framework {
            // Same-framework hop: hand back the source document's version and metadata
            let version = canonical
                .metadata
                .get(provenance::SOURCE_VERSION)
                .and_then(|v| Version::parse(v).ok())
                .unwrap_or_else(|| self.schema_version.clone());
            let mut native = NativeAgent::new(self.framework, Value::Object(data), version);
            native.metadata = canonical
                .metadata
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(NATIVE_METADATA_PREFIX)
                        .map(|key| (key.to_string(), value.clone()))
                })
                .collect();
            native
        } else {
            let mut native =
                NativeAgent::new(self.framework, Value::Object(data), self.schema_version.clone());
            native
                .metadata
                .insert(CANONICAL_URI_KEY.to_string(), canonical.uri.to_string());
            native
        };
        Ok(Mapped {
            value: native,
            report,
        })
    }
}
