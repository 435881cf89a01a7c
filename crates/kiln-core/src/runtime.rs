//! Runtime environment - task の実行環境
//!
//! `Environment` is created once per top-level invocation of the tool. It
//! owns the resolved configuration, the task registry and the network
//! binding, and dispatches `run(name, args)` through the override chain of
//! `name`.
//!
//! # 実行の流れ
//! 1. `run` が名前から最新の定義を引く（なければ `UnrecognizedTask`）
//! 2. `execute` が chain の 1 段を実行する
//!    - `RunSuper` を作り `runSuper` slot に bind
//!    - exposed fields を ambient scope に inject
//!    - action を await
//!    - inject を戻し、`runSuper` slot を戻す（エラー時も同じ順序）
//! 3. action が `RunSuper::call` すると 1 段上の定義で 2 を繰り返す

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::ambient::{AmbientScope, AmbientValue, Injection, RUN_SUPER_SLOT};
use crate::app::EnvironmentBuilder;
use crate::domain::{NetworkConfig, ResolvedConfig, TaskArguments, TaskId, ToolArguments};
use crate::error::KilnError;
use crate::lazy::LazyValue;
use crate::ports::{EnvironmentExtender, ProviderFactory, SharedProvider, TaskResult};
use crate::tasks::{RunSuper, TaskRegistry};

pub type LazyProvider = LazyValue<SharedProvider>;

pub const CONFIG: &str = "config";
pub const ARGUMENTS: &str = "arguments";
pub const TASKS: &str = "tasks";
pub const NETWORK: &str = "network";
pub const ETHEREUM: &str = "ethereum";
pub const RUN: &str = "run";

/// Names of the fields copied onto the ambient scope, besides extensions.
pub const EXPOSED_FIELDS: [&str; 6] = [CONFIG, ARGUMENTS, TASKS, NETWORK, ETHEREUM, RUN];

/// Entry points that must never be reachable ambiently.
pub const DEFAULT_BLACKLIST: &[&str] = &["inject_to_global", "execute"];

type TaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send + 'static>>;

/// The network selected for this run.
pub struct Network {
    pub name: String,
    pub config: NetworkConfig,
    /// Same instance as `Environment::ethereum`.
    pub provider: Arc<LazyProvider>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("provider_initialized", &self.provider.is_initialized())
            .finish()
    }
}

pub struct Environment {
    config: Arc<ResolvedConfig>,
    arguments: Arc<ToolArguments>,
    tasks: Arc<TaskRegistry>,
    network: Arc<Network>,
    ethereum: Arc<LazyProvider>,
    extenders: Vec<Arc<dyn EnvironmentExtender>>,
    extensions: BTreeMap<String, AmbientValue>,
    ambient: Arc<AmbientScope>,
}

impl Environment {
    pub fn builder(
        config: ResolvedConfig,
        arguments: ToolArguments,
        tasks: TaskRegistry,
    ) -> EnvironmentBuilder {
        EnvironmentBuilder::new(config, arguments, tasks)
    }

    /// Builds an environment bound to the process-wide ambient scope.
    pub fn new(
        config: ResolvedConfig,
        arguments: ToolArguments,
        tasks: TaskRegistry,
        extenders: Vec<Arc<dyn EnvironmentExtender>>,
        provider_factory: Arc<dyn ProviderFactory>,
    ) -> Result<Arc<Self>, KilnError> {
        Self::create(
            config,
            arguments,
            tasks,
            extenders,
            provider_factory,
            AmbientScope::global(),
        )
    }

    /// Fails with `NetworkConfigNotFound` before anything is built when the
    /// effective network is not configured.
    pub(crate) fn create(
        config: ResolvedConfig,
        arguments: ToolArguments,
        tasks: TaskRegistry,
        extenders: Vec<Arc<dyn EnvironmentExtender>>,
        provider_factory: Arc<dyn ProviderFactory>,
        ambient: Arc<AmbientScope>,
    ) -> Result<Arc<Self>, KilnError> {
        debug!("creating runtime environment");

        let network_name = arguments
            .network
            .clone()
            .unwrap_or_else(|| config.default_network.clone());

        let network_config = config.network(&network_name).cloned().ok_or_else(|| {
            KilnError::NetworkConfigNotFound {
                network: network_name.clone(),
            }
        })?;

        let config = Arc::new(config);

        let provider = {
            let name = network_name.clone();
            let network_config = network_config.clone();
            let config = Arc::clone(&config);
            Arc::new(LazyValue::new(move || {
                debug!(network = %name, "creating provider");
                provider_factory.create(
                    &name,
                    &network_config,
                    config.toolchain_version(),
                    &config.paths,
                )
            }))
        };

        let network = Arc::new(Network {
            name: network_name,
            config: network_config,
            provider: Arc::clone(&provider),
        });

        let mut env = Environment {
            config,
            arguments: Arc::new(arguments),
            tasks: Arc::new(tasks),
            network,
            ethereum: provider,
            extenders: extenders.clone(),
            extensions: BTreeMap::new(),
            ambient,
        };

        for extender in &extenders {
            extender.extend(&mut env);
        }

        Ok(Arc::new(env))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn arguments(&self) -> &ToolArguments {
        &self.arguments
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The network's provider. Constructed on first request.
    pub fn ethereum(&self) -> &Arc<LazyProvider> {
        &self.ethereum
    }

    pub fn extender_count(&self) -> usize {
        self.extenders.len()
    }

    pub fn ambient(&self) -> &Arc<AmbientScope> {
        &self.ambient
    }

    /// Replaces the network's provider. `network.provider` and `ethereum`
    /// keep pointing at the same instance.
    pub fn set_provider(&mut self, provider: Arc<LazyProvider>) {
        self.network = Arc::new(Network {
            name: self.network.name.clone(),
            config: self.network.config.clone(),
            provider: Arc::clone(&provider),
        });
        self.ethereum = provider;
    }

    /// Attach a named field. Only meaningful while extenders run.
    ///
    /// Names in `EXPOSED_FIELDS` are rejected with `ReservedField`; swap the
    /// provider with `set_provider` instead.
    pub fn insert_extension<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<Option<AmbientValue>, KilnError> {
        let name = name.into();
        if EXPOSED_FIELDS.contains(&name.as_str()) {
            return Err(KilnError::ReservedField { name });
        }
        Ok(self.extensions.insert(name, Arc::new(value)))
    }

    pub fn extension<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.extensions.get(name)?.clone().downcast::<T>().ok()
    }

    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    pub fn runner(self: &Arc<Self>) -> TaskRunner {
        TaskRunner {
            env: Arc::clone(self),
        }
    }

    /// Every field the ambient scope may receive, in injection order.
    pub fn exposed_fields(self: &Arc<Self>) -> Vec<(String, AmbientValue)> {
        let config: AmbientValue = self.config.clone();
        let arguments: AmbientValue = self.arguments.clone();
        let tasks: AmbientValue = self.tasks.clone();
        let network: AmbientValue = self.network.clone();
        let ethereum: AmbientValue = self.ethereum.clone();
        let run: AmbientValue = Arc::new(self.runner());

        let mut fields = vec![
            (CONFIG.to_string(), config),
            (ARGUMENTS.to_string(), arguments),
            (TASKS.to_string(), tasks),
            (NETWORK.to_string(), network),
            (ETHEREUM.to_string(), ethereum),
            (RUN.to_string(), run),
        ];
        fields.extend(
            self.extensions
                .iter()
                .map(|(name, value)| (name.clone(), Arc::clone(value))),
        );
        fields
    }

    /// Copies the exposed fields onto the ambient scope, skipping
    /// `DEFAULT_BLACKLIST`. Dropping or restoring the result undoes it.
    pub fn inject_to_global(self: &Arc<Self>) -> Injection {
        self.inject_to_global_except(DEFAULT_BLACKLIST)
    }

    pub fn inject_to_global_except(self: &Arc<Self>, blacklist: &[&str]) -> Injection {
        let fields = self
            .exposed_fields()
            .into_iter()
            .filter(|(name, _)| !blacklist.contains(&name.as_str()));
        self.ambient.inject(fields)
    }

    /// Runs the task registered under `name`.
    pub async fn run(self: &Arc<Self>, name: &str, args: TaskArguments) -> TaskResult {
        debug!(task = name, "running task");

        let id = self
            .tasks
            .resolve(name)
            .ok_or_else(|| KilnError::UnrecognizedTask {
                task: name.to_string(),
            })?;

        self.execute(id, args).await
    }

    /// `run` with empty task arguments.
    pub async fn run_default(self: &Arc<Self>, name: &str) -> TaskResult {
        self.run(name, TaskArguments::new()).await
    }

    /// Executes one link of an override chain.
    ///
    /// Boxed because it recurses through `RunSuper`.
    pub(crate) fn execute(self: &Arc<Self>, id: TaskId, args: TaskArguments) -> TaskFuture {
        let env = Arc::clone(self);
        Box::pin(async move {
            let definition = env.tasks.get(id).cloned().ok_or_else(|| {
                KilnError::Other(format!("{id} is not in this environment's registry"))
            })?;

            let run_super = RunSuper::new(
                Arc::clone(&env),
                definition.name().to_string(),
                definition.parent(),
                args.clone(),
            );

            // Both guards also restore on drop, so an action that panics or a
            // future that is dropped mid-await leaves the scope as it found it.
            let super_slot = env
                .ambient
                .bind(RUN_SUPER_SLOT, Arc::new(run_super.clone()));
            let injection = env.inject_to_global();

            let result = definition
                .action()
                .run(args, Arc::clone(&env), run_super)
                .await;

            injection.restore();
            super_slot.restore();

            result
        })
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("network", &self.network)
            .field("tasks", &self.tasks.names())
            .field("extensions", &self.extension_names())
            .field("extenders", &self.extenders.len())
            .finish_non_exhaustive()
    }
}

/// Ambient handle for starting tasks; the value of the `run` slot.
#[derive(Clone)]
pub struct TaskRunner {
    env: Arc<Environment>,
}

impl TaskRunner {
    pub async fn run(&self, name: &str, args: TaskArguments) -> TaskResult {
        self.env.run(name, args).await
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }
}

impl fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunner").finish_non_exhaustive()
    }
}
