//! # Handoff Stack
//!
//! Many threads push, one owner drains everything at once. The owner never
//! waits on a producer for longer than one `Vec::push`.

use parking_lot::Mutex;

/// A multi-producer stack drained in one call.
///
/// Backed by a `parking_lot::Mutex<Vec<T>>`, so it is not lock-free: `push`
/// holds the lock for one `Vec::push` and `pop_all` for one `mem::take`.
/// Neither side ever blocks for longer than that.
///
/// # Example
///
/// ```rust
/// use strata_tasks::HandoffStack;
///
/// let stack = HandoffStack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop_all(), vec![2, 1]);
/// assert!(stack.is_empty());
/// ```
#[derive(Debug)]
pub struct HandoffStack<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for HandoffStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandoffStack<T> {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Pushes an item. Callable from any thread.
    pub fn push(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Takes every item, newest first.
    #[must_use]
    pub fn pop_all(&self) -> Vec<T> {
        let mut items = std::mem::take(&mut *self.items.lock());
        items.reverse();
        items
    }

    /// Number of items waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// True if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
