//! Tasks - task 定義の登録と override chain

pub mod registry;
pub mod run_super;

pub use self::registry::TaskRegistry;
pub use self::run_super::RunSuper;
