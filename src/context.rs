//! Process-wide host execution token.
//!
//! Only one thread may run host-side code at a time. Engine workers take
//! the token through [`HostContext::acquire`] and hold the returned
//! [`HostToken`] for the whole host invocation; dropping the token releases
//! it on every exit path, unwinding included.
//!
//! The token is re-entrant on the owning thread, like the Python GIL: a
//! host function that triggers another callback on the same thread gets a
//! nested token instead of deadlocking. The mutex guard lives in a
//! thread-local, not in any particular token, and is released only when the
//! last token on the thread is dropped, whatever the drop order.
//!
//! This is a separate, coarser resource from the callback registry's map
//! lock. Never hold the registry lock while acquiring it.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

/// Global execution context shared by every registry in the process.
static HOST_CONTEXT: HostContext = HostContext::new();

thread_local! {
    /// Number of live tokens on this thread.
    static DEPTH: Cell<usize> = const { Cell::new(0) };

    /// The mutex guard, present while `DEPTH > 0`.
    static HELD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

pub struct HostContext {
    lock: Mutex<()>,
}

impl HostContext {
    const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// The process-wide context.
    pub fn global() -> &'static HostContext {
        &HOST_CONTEXT
    }

    /// Block until this thread owns the host execution context.
    ///
    /// A host function that panicked while holding the token poisons the
    /// mutex. The poison is cleared on the next acquisition: `()` carries
    /// no state that could have been left inconsistent.
    pub fn acquire(&'static self) -> HostToken {
        let depth = DEPTH.with(Cell::get);
        if depth == 0 {
            let guard = match self.lock.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    tracing::warn!("host execution context poisoned by a panicking callback");
                    let guard = poisoned.into_inner();
                    self.lock.clear_poison();
                    guard
                }
            };
            HELD.with(|held| *held.borrow_mut() = Some(guard));
            tracing::trace!("host execution context acquired");
        } else {
            tracing::trace!(depth, "host execution context re-entered");
        }
        DEPTH.with(|d| d.set(depth + 1));
        HostToken {
            _not_send: PhantomData,
        }
    }

    /// Whether the current thread holds a token.
    pub fn is_held_by_current_thread() -> bool {
        Self::depth() > 0
    }

    /// Number of live tokens on the current thread.
    pub fn depth() -> usize {
        DEPTH.with(Cell::get)
    }
}

/// Proof that the current thread owns the host execution context.
///
/// Not `Send`: the token belongs to the thread that acquired it.
#[must_use = "the host execution context is released as soon as the token is dropped"]
pub struct HostToken {
    _not_send: PhantomData<*const ()>,
}

impl Drop for HostToken {
    fn drop(&mut self) {
        let remaining = DEPTH.with(|d| {
            let remaining = d.get().saturating_sub(1);
            d.set(remaining);
            remaining
        });
        if remaining == 0 {
            // Unlocks the mutex.
            let guard = HELD.with(|held| held.borrow_mut().take());
            drop(guard);
            tracing::trace!("host execution context released");
        }
    }
}
