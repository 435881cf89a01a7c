//! EnvironmentBuilder - Environment の構築とワイヤリング
//!
//! # 起動時検証（Fail-fast）
//! - `build()` は network 名の解決に失敗すると `NetworkConfigNotFound` を返す
//! - 失敗時に中途半端な Environment が外に出ることはない

use std::sync::Arc;

use crate::ambient::AmbientScope;
use crate::domain::{ResolvedConfig, ToolArguments};
use crate::error::KilnError;
use crate::impls::LocalProviderFactory;
use crate::ports::{EnvironmentExtender, ProviderFactory};
use crate::runtime::Environment;
use crate::tasks::TaskRegistry;

/// EnvironmentBuilder は Environment を構築
///
/// # 使用例
/// ```ignore
/// let env = Environment::builder(config, arguments, tasks)
///     .extender(|env: &mut Environment| {
///         env.insert_extension("artifacts", Artifacts::new()).expect("not a core field");
///     })
///     .provider_factory(Arc::new(HttpProviderFactory::new()))
///     .build()?;
/// ```
///
/// Defaults: no extenders, `LocalProviderFactory`, the process-wide
/// `AmbientScope`.
pub struct EnvironmentBuilder {
    config: ResolvedConfig,
    arguments: ToolArguments,
    tasks: TaskRegistry,
    extenders: Vec<Arc<dyn EnvironmentExtender>>,
    provider_factory: Option<Arc<dyn ProviderFactory>>,
    ambient: Option<Arc<AmbientScope>>,
}

impl EnvironmentBuilder {
    pub fn new(config: ResolvedConfig, arguments: ToolArguments, tasks: TaskRegistry) -> Self {
        Self {
            config,
            arguments,
            tasks,
            extenders: Vec::new(),
            provider_factory: None,
            ambient: None,
        }
    }

    /// Append one extender. Extenders run in the order they were added.
    pub fn extender(mut self, extender: impl EnvironmentExtender + 'static) -> Self {
        self.extenders.push(Arc::new(extender));
        self
    }

    pub fn extenders(mut self, extenders: Vec<Arc<dyn EnvironmentExtender>>) -> Self {
        self.extenders.extend(extenders);
        self
    }

    pub fn provider_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.provider_factory = Some(factory);
        self
    }

    /// Use a private ambient scope instead of the process-wide one.
    pub fn ambient(mut self, scope: Arc<AmbientScope>) -> Self {
        self.ambient = Some(scope);
        self
    }

    pub fn build(self) -> Result<Arc<Environment>, KilnError> {
        let provider_factory = self
            .provider_factory
            .unwrap_or_else(|| Arc::new(LocalProviderFactory));
        let ambient = self.ambient.unwrap_or_else(AmbientScope::global);

        Environment::create(
            self.config,
            self.arguments,
            self.tasks,
            self.extenders,
            provider_factory,
            ambient,
        )
    }
}
