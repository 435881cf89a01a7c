//! App - Environment の組み立て
//!
//! - **builder**: EnvironmentBuilder（extenders, provider factory, ambient scope の指定）

pub mod builder;

pub use self::builder::EnvironmentBuilder;
