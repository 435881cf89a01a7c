//! EnvironmentExtender port - plugin による Environment の拡張
//!
//! Extenders run once, in registration order, while the `Environment` is
//! still being built. The order encodes plugin layering: a later extender
//! sees (and may replace) what an earlier one attached.

use crate::runtime::Environment;

pub trait EnvironmentExtender: Send + Sync {
    fn extend(&self, env: &mut Environment);
}

impl<F> EnvironmentExtender for F
where
    F: Fn(&mut Environment) + Send + Sync,
{
    fn extend(&self, env: &mut Environment) {
        self(env)
    }
}
