//! Provider port - ネットワーク接続の抽象化
//!
//! 具体的な Provider の構築（HTTP, in-process node など）は外部の関心事です。
//! runtime は「いつ・何回」factory を呼ぶかだけを決めます（最初の利用時に 1 回）。
//!
//! # 実装
//! - **LocalProvider** (`impls::local_provider`): 開発用の in-process provider

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{NetworkConfig, ProjectPaths};
use crate::error::KilnError;

/// Provider は JSON-RPC 形式のリクエストを処理する
#[async_trait]
pub trait Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, KilnError>;
}

pub type SharedProvider = Arc<dyn Provider>;

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, KilnError> {
        (**self).request(method, params).await
    }
}

/// ProviderFactory は network 名と設定から Provider を構築する
///
/// May perform I/O. Called at most once per `Environment`, on first use of
/// the provider.
pub trait ProviderFactory: Send + Sync {
    fn create(
        &self,
        network_name: &str,
        network_config: &NetworkConfig,
        toolchain_version: &str,
        paths: &ProjectPaths,
    ) -> Result<SharedProvider, KilnError>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&str, &NetworkConfig, &str, &ProjectPaths) -> Result<SharedProvider, KilnError>
        + Send
        + Sync,
{
    fn create(
        &self,
        network_name: &str,
        network_config: &NetworkConfig,
        toolchain_version: &str,
        paths: &ProjectPaths,
    ) -> Result<SharedProvider, KilnError> {
        self(network_name, network_config, toolchain_version, paths)
    }
}
