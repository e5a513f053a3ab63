//! IRIs, literals and object terms.

use crate::ontology::vocabulary::xsd;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Internationalized resource identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(value: impl Into<String>) -> Self {
        Iri(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path or fragment segment, e.g. `ada` for `urn:agent:ada`
    pub fn local_name(&self) -> &str {
        self.0
            .rsplit(|c: char| c == '#' || c == '/' || c == ':')
            .next()
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Iri(value.to_string())
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Iri(value)
    }
}

/// Literal datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Boolean,
    Integer,
    Decimal,
    /// Any JSON value without a scalar XSD equivalent (objects, arrays, null)
    Json,
}

impl Datatype {
    pub fn iri(&self) -> &'static str {
        match self {
            Datatype::String => xsd::STRING,
            Datatype::Boolean => xsd::BOOLEAN,
            Datatype::Integer => xsd::INTEGER,
            Datatype::Decimal => xsd::DECIMAL,
            Datatype::Json => xsd::JSON,
        }
    }
}

/// Typed literal
///
/// `position` orders the items of a multi-valued field; scalar values have none.
/// The lexical form of non-string literals is their JSON serialization, so
/// decoding is exact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub position: Option<u32>,
    pub lexical: String,
    pub datatype: Datatype,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Literal {
            position: None,
            lexical: value.into(),
            datatype: Datatype::String,
        }
    }

    /// Encode a JSON value as a scalar literal
    pub fn from_json(value: &Value) -> Self {
        let (lexical, datatype) = match value {
            Value::String(s) => (s.clone(), Datatype::String),
            Value::Bool(b) => (b.to_string(), Datatype::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => (n.to_string(), Datatype::Integer),
            Value::Number(n) => (n.to_string(), Datatype::Decimal),
            other => (other.to_string(), Datatype::Json),
        };
        Literal {
            position: None,
            lexical,
            datatype,
        }
    }

    /// Encode one item of a multi-valued field
    pub fn item(value: &Value, position: u32) -> Self {
        Literal {
            position: Some(position),
            ..Literal::from_json(value)
        }
    }

    /// Decode back to the JSON value this literal was built from
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self.datatype {
            Datatype::String => Ok(Value::String(self.lexical.clone())),
            _ => serde_json::from_str(&self.lexical),
        }
    }
}

/// Object position of a quad
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            Term::Iri(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(literal) => {
                write!(f, "{:?}^^<{}>", literal.lexical, literal.datatype.iri())?;
                if let Some(position) = literal.position {
                    write!(f, "@{}", position)?;
                }
                Ok(())
            }
        }
    }
}
