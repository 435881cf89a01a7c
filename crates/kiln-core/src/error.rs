use thiserror::Error;

#[derive(Debug, Error)]
pub enum KilnError {
    #[error("network config not found for network={network}")]
    NetworkConfigNotFound { network: String },

    #[error("unrecognized task {task}")]
    UnrecognizedTask { task: String },

    #[error("runSuper is not available for task {task_name}: it does not override another task")]
    RunSuperNotAvailable { task_name: String },

    #[error("{name} is a core environment field and cannot be replaced by an extension")]
    ReservedField { name: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("task {task} failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl KilnError {
    /// Stable error code, printed by the CLI next to the message.
    ///
    /// Codes are grouped by area: 1xx network, 3xx arguments, 6xx task
    /// definitions, 9xx everything else. Never renumber an existing code.
    pub fn code(&self) -> &'static str {
        match self {
            KilnError::NetworkConfigNotFound { .. } => "KLN100",
            KilnError::Provider(_) => "KLN101",
            KilnError::UnrecognizedTask { .. } => "KLN303",
            KilnError::RunSuperNotAvailable { .. } => "KLN607",
            KilnError::ReservedField { .. } => "KLN608",
            KilnError::TaskFailed { .. } => "KLN900",
            KilnError::Other(_) => "KLN999",
        }
    }

    pub fn task_failed(task: impl Into<String>, message: impl Into<String>) -> Self {
        KilnError::TaskFailed {
            task: task.into(),
            message: message.into(),
        }
    }
}
