//! Completion handles for animations.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::Value;

type DoneCallback = Box<dyn FnOnce(&Value) + Send>;
type CancelCallback = Box<dyn FnOnce() + Send>;

/// Lifecycle state of an animation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationState {
    /// Still running.
    Pending,
    /// Reached its destination value.
    Done(Value),
    /// Cancelled before completion.
    Cancelled,
}

struct Inner {
    state: AnimationState,
    on_done: Vec<DoneCallback>,
    on_cancel: Vec<CancelCallback>,
}

/// Shared handle resolved when an animation completes or is cancelled.
///
/// Handles are cheap to clone and can be observed from any thread.
/// Callbacks registered after resolution run immediately.
#[derive(Clone)]
pub struct AnimationFuture {
    inner: Arc<Mutex<Inner>>,
}

impl AnimationFuture {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: AnimationState::Pending,
                on_done: Vec::new(),
                on_cancel: Vec::new(),
            })),
        }
    }

    /// Current state.
    pub fn state(&self) -> AnimationState {
        self.inner.lock().state.clone()
    }

    /// Whether the animation reached its destination.
    pub fn is_done(&self) -> bool {
        matches!(self.inner.lock().state, AnimationState::Done(_))
    }

    /// Whether the animation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().state == AnimationState::Cancelled
    }

    /// Final value, once done.
    pub fn value(&self) -> Option<Value> {
        match &self.inner.lock().state {
            AnimationState::Done(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Whether two handles refer to the same animation.
    pub fn same_as(&self, other: &AnimationFuture) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` with the final value when the animation completes.
    pub fn after(&self, f: impl FnOnce(&Value) + Send + 'static) -> &Self {
        let mut inner = self.inner.lock();
        match &inner.state {
            AnimationState::Done(v) => {
                let v = v.clone();
                drop(inner);
                f(&v);
            }
            AnimationState::Pending => inner.on_done.push(Box::new(f)),
            AnimationState::Cancelled => {}
        }
        self
    }

    /// Run `f` if the animation is cancelled.
    pub fn on_cancel(&self, f: impl FnOnce() + Send + 'static) -> &Self {
        let mut inner = self.inner.lock();
        match inner.state {
            AnimationState::Cancelled => {
                drop(inner);
                f();
            }
            AnimationState::Pending => inner.on_cancel.push(Box::new(f)),
            AnimationState::Done(_) => {}
        }
        self
    }

    pub(crate) fn resolve(&self, value: Value) {
        let callbacks = {
            let mut inner = self.inner.lock();
            if inner.state != AnimationState::Pending {
                return;
            }
            inner.state = AnimationState::Done(value.clone());
            inner.on_cancel.clear();
            std::mem::take(&mut inner.on_done)
        };
        for cb in callbacks {
            cb(&value);
        }
    }

    pub(crate) fn cancel(&self) {
        let callbacks = {
            let mut inner = self.inner.lock();
            if inner.state != AnimationState::Pending {
                return;
            }
            inner.state = AnimationState::Cancelled;
            inner.on_done.clear();
            std::mem::take(&mut inner.on_cancel)
        };
        for cb in callbacks {
            cb();
        }
    }
}

impl fmt::Debug for AnimationFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationFuture").field("state", &self.state()).finish()
    }
}

static_assertions::assert_impl_all!(AnimationFuture: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_resolve_runs_callbacks_once() {
        let future = AnimationFuture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        future.after(move |v| {
            assert_eq!(*v, Value::Number(1.0));
            h.fetch_add(1, Ordering::SeqCst);
        });
        future.resolve(Value::Number(1.0));
        future.resolve(Value::Number(2.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(future.value(), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_late_callback_runs_immediately() {
        let future = AnimationFuture::new();
        future.resolve(Value::Nil);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        future.after(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel() {
        let future = AnimationFuture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        future.on_cancel(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        future.cancel();
        future.resolve(Value::Nil);
        assert!(future.is_cancelled());
        assert!(!future.is_done());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
