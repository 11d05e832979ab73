//! Callback registry: maps names to host functions.
//!
//! Rule bodies call host actions by name. The engine may fire rules from
//! several worker threads, so the map sits behind an `RwLock` that is held
//! only for the lookup or insert. The matching entry is cloned out and the
//! lock released *before* the host execution token is taken and the
//! function runs, so a long host call never blocks registration or lookups
//! from other threads, and a callback may itself register or call.
//!
//! Registration is last-write-wins: binding a name that is already bound
//! replaces the previous function and reports [`Binding::Replaced`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::argument::Argument;
use crate::context::{HostContext, HostToken};
use crate::error::{BridgeError, HostFailure, Result};

/// A host-side function that rule bodies can invoke.
///
/// `invoke` only runs while the caller owns the host execution context;
/// the token is passed in as proof.
pub trait HostCallable: Send + Sync {
    /// # Errors
    ///
    /// Returns whatever the host function raised, unchanged.
    fn invoke(&self, token: &HostToken, args: &[Argument]) -> std::result::Result<(), HostFailure>;
}

impl<F> HostCallable for F
where
    F: Fn(&[Argument]) -> std::result::Result<(), HostFailure> + Send + Sync,
{
    fn invoke(&self, _token: &HostToken, args: &[Argument]) -> std::result::Result<(), HostFailure> {
        self(args)
    }
}

/// Outcome of [`CallbackRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The name was unbound before.
    Bound,
    /// The name was bound; the previous function was dropped.
    Replaced,
}

/// Name-indexed table of host functions, one per embedding session.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RwLock<HashMap<String, Arc<dyn HostCallable>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a closure, replacing any previous binding.
    pub fn register<F>(&self, name: impl Into<String>, function: F) -> Binding
    where
        F: Fn(&[Argument]) -> std::result::Result<(), HostFailure> + Send + Sync + 'static,
    {
        self.register_arc(name, Arc::new(function))
    }

    /// Bind `name` to any [`HostCallable`], replacing any previous binding.
    pub fn register_callable<C>(&self, name: impl Into<String>, callable: C) -> Binding
    where
        C: HostCallable + 'static,
    {
        self.register_arc(name, Arc::new(callable))
    }

    /// Bind `name` to an already shared function.
    pub fn register_arc(&self, name: impl Into<String>, function: Arc<dyn HostCallable>) -> Binding {
        let name = name.into();
        let previous = {
            let mut map = self
                .callbacks
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            map.insert(name.clone(), function)
        }; // lock released before the old function is dropped
        match previous {
            Some(_) => {
                tracing::debug!(callback = %name, "callback rebound, previous binding replaced");
                Binding::Replaced
            }
            None => {
                tracing::debug!(callback = %name, "callback bound");
                Binding::Bound
            }
        }
    }

    /// Invoke the function bound to `name` with `args`.
    ///
    /// Blocks until the host execution context is free, runs the function,
    /// and releases the context before returning, whether the function
    /// succeeded, returned an error, or panicked.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UnregisteredCallback`] if `name` is unbound. A
    ///   warning is logged as well; nothing is invoked.
    /// - [`BridgeError::Host`] carrying the host function's own error.
    pub fn call(&self, name: &str, args: &[Argument]) -> Result<()> {
        // Clone the entry while holding the lock, then release it.
        let function = {
            let map = self
                .callbacks
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            map.get(name).cloned()
        };
        let Some(function) = function else {
            let err = BridgeError::UnregisteredCallback(name.to_string());
            tracing::warn!(callback = name, code = err.code(), "callback not found in registry");
            return Err(err);
        };

        tracing::debug!(callback = name, args = args.len(), "invoking callback");
        let token = HostContext::global().acquire();
        let outcome = function.invoke(&token, args);
        drop(token);

        outcome.map_err(|source| {
            let err = BridgeError::Host {
                name: name.to_string(),
                source,
            };
            tracing::debug!(
                callback = name,
                code = err.code(),
                error = %err,
                "callback raised"
            );
            err
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}
