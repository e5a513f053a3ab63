//! Agent framework tags.
//!
//! Every supported framework is a variant of [`AgentFramework`]. Registries and
//! extension namespaces are keyed by this tag, never by free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported agent frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentFramework {
    /// Uniform Semantic Agent
    Usa,
    /// Language Model Operating System
    Lmos,
    /// Model Context Protocol server manifest
    Mcp,
    #[serde(rename = "langchain")]
    LangChain,
    /// OpenAI Assistants definition
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "crewai")]
    CrewAi,
    #[serde(rename = "autogen")]
    AutoGen,
}

impl AgentFramework {
    pub const ALL: [AgentFramework; 7] = [
        AgentFramework::Usa,
        AgentFramework::Lmos,
        AgentFramework::Mcp,
        AgentFramework::LangChain,
        AgentFramework::OpenAi,
        AgentFramework::CrewAi,
        AgentFramework::AutoGen,
    ];

    /// Stable lowercase identifier used in IRIs, keys and config
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentFramework::Usa => "usa",
            AgentFramework::Lmos => "lmos",
            AgentFramework::Mcp => "mcp",
            AgentFramework::LangChain => "langchain",
            AgentFramework::OpenAi => "openai",
            AgentFramework::CrewAi => "crewai",
            AgentFramework::AutoGen => "autogen",
        }
    }
}

impl fmt::Display for AgentFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentFramework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        AgentFramework::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| format!("Unknown agent framework: {}", s))
    }
}
