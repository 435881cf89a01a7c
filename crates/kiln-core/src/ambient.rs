//! Ambient scope - task コードから暗黙に参照できる共有名前空間
//!
//! Task actions always receive the `Environment` explicitly. The ambient
//! scope exists for code that cannot take it as a parameter (plugins written
//! against the old global style, an interactive console): the runtime copies
//! the environment's fields onto named slots while an action runs and puts
//! every slot back afterwards.
//!
//! # 契約
//! - 復元は injection ごとに必ず 1 回（明示的な `restore()` か drop 時）
//! - 注入前に存在しなかった slot は復元後も存在しない
//! - 復元はスタック順（最後に注入したものから戻す）
//! - 1 つの scope 上で同時に走れる call tree は 1 本だけ。
//!   入れ子（runSuper, task から別 task の run）は安全、並行する top-level
//!   呼び出しは互いの復元を壊すので呼び出し側で直列化すること

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use tracing::trace;

pub type AmbientValue = Arc<dyn Any + Send + Sync>;

/// Slot holding the `RunSuper` of the innermost running chain level.
pub const RUN_SUPER_SLOT: &str = "runSuper";

static GLOBAL_SCOPE: Lazy<Arc<AmbientScope>> = Lazy::new(|| Arc::new(AmbientScope::new()));

#[derive(Default)]
pub struct AmbientScope {
    slots: Mutex<HashMap<String, AmbientValue>>,
}

impl AmbientScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide scope.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_SCOPE)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, AmbientValue>> {
        // Slot updates never leave the map half-written, so a poisoned lock
        // still guards consistent data.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<AmbientValue> {
        self.slots().get(name).cloned()
    }

    /// Typed read; `None` when the slot is absent or holds another type.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name)?.downcast::<T>().ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    /// Sets (`Some`) or removes (`None`) a slot, returning what was there.
    pub fn replace(&self, name: &str, value: Option<AmbientValue>) -> Option<AmbientValue> {
        let mut slots = self.slots();
        match value {
            Some(value) => slots.insert(name.to_string(), value),
            None => slots.remove(name),
        }
    }

    /// Binds one slot until the returned guard is restored or dropped.
    pub fn bind(self: &Arc<Self>, name: &str, value: AmbientValue) -> SlotGuard {
        let previous = self.replace(name, Some(value));
        SlotGuard {
            scope: Arc::clone(self),
            name: name.to_string(),
            previous: Some(previous),
        }
    }

    /// Overwrites every given slot, remembering what each held before.
    pub fn inject<I>(self: &Arc<Self>, fields: I) -> Injection
    where
        I: IntoIterator<Item = (String, AmbientValue)>,
    {
        let mut previous = Vec::new();
        {
            let mut slots = self.slots();
            for (name, value) in fields {
                let before = slots.insert(name.clone(), value);
                previous.push((name, before));
            }
        }
        trace!(
            slots = ?previous.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            "ambient injection opened"
        );
        Injection {
            scope: Arc::clone(self),
            previous,
            restored: false,
        }
    }
}

impl fmt::Debug for AmbientScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientScope")
            .field("slots", &self.names())
            .finish()
    }
}

/// Restores a single slot bound with `AmbientScope::bind`.
pub struct SlotGuard {
    scope: Arc<AmbientScope>,
    name: String,
    previous: Option<Option<AmbientValue>>,
}

impl SlotGuard {
    pub fn restore(mut self) {
        self.restore_now();
    }

    fn restore_now(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.scope.replace(&self.name, previous);
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.restore_now();
    }
}

/// An open injection. Restores every touched slot exactly once.
pub struct Injection {
    scope: Arc<AmbientScope>,
    previous: Vec<(String, Option<AmbientValue>)>,
    restored: bool,
}

impl Injection {
    /// Names of the slots this injection overwrote, in injection order.
    pub fn injected(&self) -> Vec<&str> {
        self.previous.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn restore(mut self) {
        self.restore_now();
    }

    fn restore_now(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        let mut slots = self.scope.slots();
        // reverse: a name injected twice ends at its oldest value
        for (name, previous) in self.previous.drain(..).rev() {
            match previous {
                Some(value) => {
                    slots.insert(name, value);
                }
                None => {
                    slots.remove(&name);
                }
            }
        }
        trace!("ambient injection restored");
    }
}

impl Drop for Injection {
    fn drop(&mut self) {
        self.restore_now();
    }
}

impl fmt::Debug for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injection")
            .field("slots", &self.injected())
            .field("restored", &self.restored)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<T: Any + Send + Sync>(v: T) -> AmbientValue {
        Arc::new(v)
    }

    #[test]
    fn restore_removes_slots_that_were_absent() {
        let scope = Arc::new(AmbientScope::new());

        let injection = scope.inject(vec![("config".to_string(), value(1u32))]);
        assert_eq!(*scope.get_as::<u32>("config").unwrap(), 1);

        injection.restore();
        assert!(!scope.contains("config"));
        assert!(scope.is_empty());
    }

    #[test]
    fn restore_puts_back_the_exact_previous_value() {
        let scope = Arc::new(AmbientScope::new());
        let original = value("user value".to_string());
        scope.replace("network", Some(original.clone()));

        let injection = scope.inject(vec![
            ("network".to_string(), value("develop".to_string())),
            ("tasks".to_string(), value(3usize)),
        ]);
        assert_eq!(*scope.get_as::<String>("network").unwrap(), "develop");

        assert_eq!(scope.len(), 2);

        injection.restore();
        assert!(Arc::ptr_eq(&scope.get("network").unwrap(), &original));
        assert!(!scope.contains("tasks"));
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.names(), vec!["network".to_string()]);
    }

    #[test]
    fn dropping_an_injection_restores() {
        let scope = Arc::new(AmbientScope::new());
        {
            let _injection = scope.inject(vec![("ethereum".to_string(), value(()))]);
            assert!(scope.contains("ethereum"));
        }
        assert!(!scope.contains("ethereum"));
    }

    #[test]
    fn nested_injections_unwind_in_stack_order() {
        let scope = Arc::new(AmbientScope::new());

        let outer = scope.inject(vec![("config".to_string(), value("outer"))]);
        let inner = scope.inject(vec![("config".to_string(), value("inner"))]);
        assert_eq!(*scope.get_as::<&str>("config").unwrap(), "inner");

        inner.restore();
        assert_eq!(*scope.get_as::<&str>("config").unwrap(), "outer");

        outer.restore();
        assert!(!scope.contains("config"));
    }

    #[test]
    fn duplicate_names_in_one_injection_restore_to_the_oldest() {
        let scope = Arc::new(AmbientScope::new());
        scope.replace("run", Some(value(0u8)));

        let injection = scope.inject(vec![
            ("run".to_string(), value(1u8)),
            ("run".to_string(), value(2u8)),
        ]);
        assert_eq!(*scope.get_as::<u8>("run").unwrap(), 2);

        injection.restore();
        assert_eq!(*scope.get_as::<u8>("run").unwrap(), 0);
    }

    #[test]
    fn slot_guard_restores_previous_binding() {
        let scope = Arc::new(AmbientScope::new());

        let first = scope.bind(RUN_SUPER_SLOT, value(1i32));
        let second = scope.bind(RUN_SUPER_SLOT, value(2i32));
        assert_eq!(*scope.get_as::<i32>(RUN_SUPER_SLOT).unwrap(), 2);

        drop(second);
        assert_eq!(*scope.get_as::<i32>(RUN_SUPER_SLOT).unwrap(), 1);

        first.restore();
        assert!(!scope.contains(RUN_SUPER_SLOT));
    }

    #[test]
    fn typed_read_of_wrong_type_is_none() {
        let scope = Arc::new(AmbientScope::new());
        scope.replace("config", Some(value(5u64)));
        assert!(scope.get_as::<String>("config").is_none());
        assert!(scope.get_as::<u64>("config").is_some());
    }
}
