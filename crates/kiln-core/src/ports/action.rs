//! TaskAction port - task の本体（ユーザー定義のロジック）
//!
//! # 二層構造
//! - **trait**: `TaskAction` - struct で実装する場合
//! - **closure**: `action_fn` - async closure をそのまま登録する場合

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::TaskArguments;
use crate::error::KilnError;
use crate::runtime::Environment;
use crate::tasks::RunSuper;

pub type TaskResult = Result<Value, KilnError>;

/// TaskAction は task の引数・実行環境・runSuper を受け取って結果を返す
///
/// # 使用例
/// ```ignore
/// struct Compile;
///
/// #[async_trait]
/// impl TaskAction for Compile {
///     async fn run(
///         &self,
///         args: TaskArguments,
///         env: Arc<Environment>,
///         _run_super: RunSuper,
///     ) -> TaskResult {
///         Ok(json!({ "solc": env.config().toolchain_version() }))
///     }
/// }
/// ```
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(
        &self,
        args: TaskArguments,
        env: Arc<Environment>,
        run_super: RunSuper,
    ) -> TaskResult;
}

/// Adapter that lets an async closure act as a `TaskAction`.
pub struct FnAction<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(TaskArguments, Arc<Environment>, RunSuper) -> Fut + Send + Sync,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    async fn run(
        &self,
        args: TaskArguments,
        env: Arc<Environment>,
        run_super: RunSuper,
    ) -> TaskResult {
        (self.f)(args, env, run_super).await
    }
}

pub fn action_fn<F, Fut>(f: F) -> Arc<dyn TaskAction>
where
    F: Fn(TaskArguments, Arc<Environment>, RunSuper) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    Arc::new(FnAction { f })
}
