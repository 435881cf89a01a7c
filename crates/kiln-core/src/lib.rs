//! kiln-core
//!
//! Runtime environment of the kiln build tool: task dispatch through
//! override chains, ambient exposure of the environment to task code, and
//! lazy construction of the network provider.
//!
//! # モジュール構成
//! - **domain**: 設定・引数・task 定義（ResolvedConfig, ToolArguments, TaskDefinition）
//! - **ports**: 外部とのインターフェース（TaskAction, Provider, ProviderFactory, EnvironmentExtender）
//! - **tasks**: TaskRegistry（override chain の arena）と RunSuper
//! - **runtime**: Environment（run / execute / inject_to_global）
//! - **app**: EnvironmentBuilder
//! - **ambient**: 共有名前空間と復元ガード
//! - **lazy**: LazyValue
//! - **impls**: 開発用の LocalProvider

pub mod ambient;
pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod lazy;
pub mod ports;
pub mod runtime;
pub mod tasks;

pub use self::ambient::{AmbientScope, Injection};
pub use self::app::EnvironmentBuilder;
pub use self::domain::{TaskArguments, ToolArguments};
pub use self::error::KilnError;
pub use self::lazy::LazyValue;
pub use self::ports::{Provider, ProviderFactory, TaskAction, TaskResult, action_fn};
pub use self::runtime::{Environment, Network, TaskRunner};
pub use self::tasks::{RunSuper, TaskRegistry};
