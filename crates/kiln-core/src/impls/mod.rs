//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **LocalProvider / LocalProviderFactory**: ノード不要の in-process provider
//!
//! HTTP などの本番用 provider は別クレートで `ProviderFactory` を実装します。

pub mod local_provider;

pub use self::local_provider::{LocalProvider, LocalProviderFactory};
