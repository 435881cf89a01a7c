//! Domain model (configuration, arguments, task definitions).

pub mod arguments;
pub mod config;
pub mod task;

pub use arguments::{TaskArguments, ToolArguments};
pub use config::{NetworkConfig, ProjectPaths, ResolvedConfig, SolcConfig};
pub use task::{TaskDefinition, TaskId, TaskKind};
