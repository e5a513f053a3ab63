//! Concrete framework adapters, one static field table each.

pub mod autogen;
pub mod crewai;
pub mod langchain;
pub mod lmos;
pub mod mcp;
pub mod openai;
pub mod usa;
