//! TaskRegistry - task 定義の arena
//!
//! Definitions are stored in a `Vec` and never removed, so a `TaskId` stays
//! valid for the registry's lifetime. Each name maps to its newest
//! definition; older ones remain reachable only through the override chain.
//!
//! Registering a name twice does not fail: the second definition overrides
//! the first, and the first becomes its parent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{TaskDefinition, TaskId, TaskKind};
use crate::ports::TaskAction;

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    definitions: Vec<TaskDefinition>,
    by_name: HashMap<String, TaskId>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`, overriding any existing definition.
    pub fn define(&mut self, name: impl Into<String>, action: Arc<dyn TaskAction>) -> TaskId {
        self.push(name.into(), None, action)
    }

    pub fn define_with_description(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        action: Arc<dyn TaskAction>,
    ) -> TaskId {
        self.push(name.into(), Some(description.into()), action)
    }

    fn push(
        &mut self,
        name: String,
        description: Option<String>,
        action: Arc<dyn TaskAction>,
    ) -> TaskId {
        let id = TaskId::new(self.definitions.len());
        let (kind, description) = match self.by_name.get(&name) {
            Some(&parent) => {
                // an override without its own description keeps the parent's
                let inherited = description.or_else(|| {
                    self.get(parent)
                        .and_then(|d| d.description().map(str::to_string))
                });
                (TaskKind::Override { parent }, inherited)
            }
            None => (TaskKind::Base, description),
        };

        self.definitions
            .push(TaskDefinition::new(name.clone(), description, action, kind));
        self.by_name.insert(name, id);
        id
    }

    /// Newest definition id for `name`.
    pub fn resolve(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskDefinition> {
        self.definitions.get(id.index())
    }

    pub fn definition(&self, name: &str) -> Option<&TaskDefinition> {
        self.resolve(name).and_then(|id| self.get(id))
    }

    /// Override chain for `name`, newest first. Empty if unknown.
    pub fn chain(&self, name: &str) -> Vec<TaskId> {
        let mut chain = Vec::new();
        let mut cursor = self.resolve(name);
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.get(id).and_then(TaskDefinition::parent);
        }
        chain
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct task names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
