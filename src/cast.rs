//! Text casters: rendered string → ground value, per kind.
//!
//! Every kind has a built-in caster ([`ValueKind::cast`]). A host that
//! renders values its own way can register an override for a kind; the
//! override is consulted first and must produce a ground value of that kind.
//! The set of kinds itself stays closed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::argument::{Argument, ValueKind};
use crate::error::{BridgeError, Result};
use crate::registry::Binding;

/// A caster override for one kind.
pub type CastFn = Arc<dyn Fn(&str) -> Result<Argument> + Send + Sync>;

/// Per-kind caster overrides on top of the built-in casters.
#[derive(Default)]
pub struct Casters {
    overrides: RwLock<HashMap<ValueKind, CastFn>>,
}

impl Casters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `caster` for `kind`, replacing any earlier override.
    pub fn register<F>(&self, kind: ValueKind, caster: F) -> Binding
    where
        F: Fn(&str) -> Result<Argument> + Send + Sync + 'static,
    {
        let previous = self
            .overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, Arc::new(caster));
        tracing::debug!(kind = kind.as_str(), "caster override installed");
        match previous {
            Some(_) => Binding::Replaced,
            None => Binding::Bound,
        }
    }

    /// Drop the override for `kind`, restoring the built-in caster.
    pub fn unregister(&self, kind: ValueKind) -> bool {
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
            .is_some()
    }

    pub fn is_overridden(&self, kind: ValueKind) -> bool {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }

    /// Parse `input` as a value of `kind`, through the override if one is
    /// installed.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Cast`] when the caster rejects `input`, or
    /// when an override returns something other than a `kind` ground value.
    pub fn cast(&self, kind: ValueKind, input: &str) -> Result<Argument> {
        let caster = self
            .overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned();
        let Some(caster) = caster else {
            return kind.cast(input);
        };

        let value = caster(input)?;
        if value.kind() != Some(kind) {
            let err = BridgeError::Cast {
                input: input.to_string(),
                kind,
            };
            tracing::warn!(
                kind = kind.as_str(),
                produced = value.type_tag(),
                code = err.code(),
                "caster override produced the wrong kind"
            );
            return Err(err);
        }
        Ok(value)
    }
}

impl fmt::Debug for Casters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overrides = self
            .overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut kinds: Vec<_> = overrides.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Casters").field("overrides", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no(input: &str) -> Result<Argument> {
        match input {
            "yes" => Ok(Argument::Boolean(true)),
            "no" => Ok(Argument::Boolean(false)),
            _ => Err(BridgeError::Cast {
                input: input.to_string(),
                kind: ValueKind::Boolean,
            }),
        }
    }

    #[test]
    fn test_builtin_without_override() {
        let casters = Casters::new();
        assert_eq!(
            casters.cast(ValueKind::Integer, "12").unwrap(),
            Argument::Integer(12)
        );
        assert!(casters.cast(ValueKind::Boolean, "yes").is_err());
    }

    #[test]
    fn test_override_wins() {
        let casters = Casters::new();
        assert_eq!(casters.register(ValueKind::Boolean, yes_no), Binding::Bound);

        assert_eq!(
            casters.cast(ValueKind::Boolean, "yes").unwrap(),
            Argument::Boolean(true)
        );
        // The built-in literals no longer apply.
        assert!(casters.cast(ValueKind::Boolean, "true").is_err());
        // Other kinds keep their built-in caster.
        assert_eq!(
            casters.cast(ValueKind::Float, "0.5").unwrap(),
            Argument::Float(0.5)
        );
    }

    #[test]
    fn test_last_override_wins_and_unregister_restores() {
        let casters = Casters::new();
        casters.register(ValueKind::Integer, |_| Ok(Argument::Integer(1)));
        let binding = casters.register(ValueKind::Integer, |_| Ok(Argument::Integer(2)));
        assert_eq!(binding, Binding::Replaced);
        assert_eq!(
            casters.cast(ValueKind::Integer, "7").unwrap(),
            Argument::Integer(2)
        );

        assert!(casters.unregister(ValueKind::Integer));
        assert!(!casters.is_overridden(ValueKind::Integer));
        assert_eq!(
            casters.cast(ValueKind::Integer, "7").unwrap(),
            Argument::Integer(7)
        );
    }

    #[test]
    fn test_override_of_wrong_kind_rejected() {
        let casters = Casters::new();
        casters.register(ValueKind::Integer, |input| Ok(Argument::Text(input.to_string())));
        let err = casters.cast(ValueKind::Integer, "3").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Cast { kind: ValueKind::Integer, ref input } if input == "3"
        ));
    }

    #[test]
    fn test_debug_lists_overridden_kinds() {
        let casters = Casters::new();
        casters.register(ValueKind::Text, |input| Ok(Argument::Text(input.trim().to_string())));
        assert_eq!(format!("{casters:?}"), r#"Casters { overrides: ["text"] }"#);
    }
}
