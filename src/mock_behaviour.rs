//! This module provides ways to tweak storage backends, so that they can return errors on some tests
#![cfg(any(test, feature = "mock_behaviour"))]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::traits::{BackendError, StorageBackend};

/// This stores some behaviour tweaks, that describe how a mocked backend will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    pub get_item_behaviour: (u32, u32),
    pub set_item_behaviour: (u32, u32),
    pub remove_item_behaviour: (u32, u32),
    pub keys_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All actions will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            get_item_behaviour: (0, n_fails),
            set_item_behaviour: (0, n_fails),
            remove_item_behaviour: (0, n_fails),
            keys_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_get_item(&mut self) -> Result<(), BackendError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_item_behaviour, "get_item")
    }
    pub fn can_set_item(&mut self) -> Result<(), BackendError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.set_item_behaviour, "set_item")
    }
    pub fn can_remove_item(&mut self) -> Result<(), BackendError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.remove_item_behaviour, "remove_item")
    }
    pub fn can_list_keys(&mut self) -> Result<(), BackendError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.keys_behaviour, "keys")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), BackendError> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}


/// A backend that forwards to another one, unless its [`MockBehaviour`] says the call must fail
pub struct MockedBackend {
    inner: Arc<dyn StorageBackend>,
    behaviour: Mutex<MockBehaviour>,
}

impl MockedBackend {
    pub fn new(inner: Arc<dyn StorageBackend>, behaviour: MockBehaviour) -> Self {
        Self { inner, behaviour: Mutex::new(behaviour) }
    }

    /// Replace the current behaviour
    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        if let Ok(mut current) = self.behaviour.lock() {
            *current = behaviour;
        }
    }

    fn check<F>(&self, f: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<(), BackendError>,
    {
        let mut behaviour = self.behaviour.lock().map_err(|_| "mock behaviour lock is poisoned")?;
        f(&mut *behaviour)
    }
}

#[async_trait]
impl StorageBackend for MockedBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.check(MockBehaviour::can_get_item)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.check(MockBehaviour::can_set_item)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.check(MockBehaviour::can_remove_item)?;
        self.inner.remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        self.check(MockBehaviour::can_list_keys)?;
        self.inner.keys().await
    }
}
