use std::fmt;
use std::sync::Arc;

use crate::ports::TaskAction;

/// Stable index of a definition inside a `TaskRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-def-{}", self.0)
    }
}

/// Where a definition sits in its override chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Base,
    /// Replaces `parent`, which stays reachable through runSuper.
    Override { parent: TaskId },
}

#[derive(Clone)]
pub struct TaskDefinition {
    name: String,
    description: Option<String>,
    action: Arc<dyn TaskAction>,
    kind: TaskKind,
}

impl TaskDefinition {
    pub(crate) fn new(
        name: String,
        description: Option<String>,
        action: Arc<dyn TaskAction>,
        kind: TaskKind,
    ) -> Self {
        Self {
            name,
            description,
            action,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action(&self) -> &Arc<dyn TaskAction> {
        &self.action
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn parent(&self) -> Option<TaskId> {
        match self.kind {
            TaskKind::Base => None,
            TaskKind::Override { parent } => Some(parent),
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self.kind, TaskKind::Override { .. })
    }
}

impl fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
