//! Ports - 抽象化レイヤー
//!
//! runtime が外部（task 本体, plugin, ネットワーク接続）に対して要求する
//! インターフェースを定義します。

pub mod action;
pub mod extender;
pub mod provider;

pub use self::action::{FnAction, TaskAction, TaskResult, action_fn};
pub use self::extender::EnvironmentExtender;
pub use self::provider::{Provider, ProviderFactory, SharedProvider};
