//! Framework adapters: the bidirectional mapping contract, the shared
//! field-table engine, the concrete adapters and their registry.

pub mod contract;
pub mod frameworks;
pub mod registry;
pub mod table;
pub mod validation;

pub use contract::{FrameworkAdapter, Mapped, MappingReport};
pub use registry::{builtin_adapter, AdapterInfo, AdapterRegistry, DETECTION_ORDER};
pub use table::{FieldKind, FieldMapping, Indicator, TableAdapter};
pub use validation::ValidationResult;
