use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{TaskArguments, TaskId};
use crate::error::KilnError;
use crate::ports::TaskResult;
use crate::runtime::Environment;

/// Calls the definition one link up the override chain.
///
/// Bound to a single chain level: `call()` forwards the arguments that level
/// received, not the ones given to the top-level `run`.
#[derive(Clone)]
pub struct RunSuper {
    env: Arc<Environment>,
    task_name: String,
    parent: Option<TaskId>,
    args: TaskArguments,
}

impl RunSuper {
    pub(crate) fn new(
        env: Arc<Environment>,
        task_name: String,
        parent: Option<TaskId>,
        args: TaskArguments,
    ) -> Self {
        Self {
            env,
            task_name,
            parent,
            args,
        }
    }

    /// True iff this level overrides another definition.
    pub fn is_defined(&self) -> bool {
        self.parent.is_some()
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub async fn call(&self) -> TaskResult {
        self.call_with(self.args.clone()).await
    }

    pub async fn call_with(&self, args: TaskArguments) -> TaskResult {
        let Some(parent) = self.parent else {
            return Err(KilnError::RunSuperNotAvailable {
                task_name: self.task_name.clone(),
            });
        };

        debug!(task = %self.task_name, "running super");
        self.env.execute(parent, args).await
    }
}

impl fmt::Debug for RunSuper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSuper")
            .field("task_name", &self.task_name)
            .field("parent", &self.parent)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
