use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Arguments given to the tool itself (as opposed to a task).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolArguments {
    /// Overrides `ResolvedConfig::default_network` when set.
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub config: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub show_stack_traces: bool,
}

impl ToolArguments {
    pub fn with_network(network: impl Into<String>) -> Self {
        Self {
            network: Some(network.into()),
            ..Self::default()
        }
    }
}

/// Arguments passed to a task action.
pub type TaskArguments = serde_json::Map<String, serde_json::Value>;
