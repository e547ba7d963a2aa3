use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{ReactiveError, Source};

/// A thread-safe mutable cell. Clones share the same cell.
#[derive(Default)]
pub struct Value<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Value<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Overwrites the content. Dependents see the new content on their next read.
    pub fn set(&self, value: T) {
        *self.inner.lock() = value;
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// True if both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Value<T> {
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for Value<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&*self.inner.lock()).finish()
    }
}

impl<T> Source<T> for Value<T>
where
    T: Clone + Send,
{
    fn read(&self) -> Result<T, ReactiveError> {
        Ok(self.get())
    }
}
