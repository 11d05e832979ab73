//! Engine-side resolution of arguments against typed rule slots.
//!
//! When a constraint is posted, each [`Argument`] has to become either a
//! ground value of the slot's type or one of the engine's logical variables.
//! A [`VariableScope`] holds the variables declared for one classification
//! pass, keyed by name, which is what makes two references with the same
//! name denote the same variable.

use std::collections::HashMap;

use crate::argument::{Argument, ExpectedType, ValueKind};
use crate::error::{BridgeError, Result};

/// Rust types that can fill a rule slot.
pub trait GroundType: Sized {
    const KIND: ValueKind;

    /// The payload, if `arg` is a ground value of this kind.
    fn from_argument(arg: &Argument) -> Option<Self>;
}

impl GroundType for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_argument(arg: &Argument) -> Option<Self> {
        match arg {
            Argument::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl GroundType for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_argument(arg: &Argument) -> Option<Self> {
        match arg {
            Argument::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl GroundType for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_argument(arg: &Argument) -> Option<Self> {
        match arg {
            Argument::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl GroundType for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_argument(arg: &Argument) -> Option<Self> {
        match arg {
            Argument::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

/// A resolved slot: a ground value or an engine variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Term<T, V> {
    Value(T),
    Var(V),
}

/// Logical variables declared for one pass, by name.
#[derive(Debug, Clone)]
pub struct VariableScope<V> {
    vars: HashMap<String, (ValueKind, V)>,
}

impl<V> Default for VariableScope<V> {
    fn default() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }
}

impl<V: Clone> VariableScope<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as a variable of `kind`. Returns the variable it
    /// replaced, if any.
    pub fn declare(&mut self, name: impl Into<String>, kind: ValueKind, var: V) -> Option<V> {
        self.vars
            .insert(name.into(), (kind, var))
            .map(|(_, old)| old)
    }

    pub fn get(&self, name: &str) -> Option<(ValueKind, &V)> {
        self.vars.get(name).map(|(kind, var)| (*kind, var))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Resolve `arg` for a slot of type `T` at `position` (1-based, for
    /// diagnostics).
    ///
    /// A variable whose expected type is unknown takes the slot's type.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::TypeMismatch`] if a ground value has another kind or
    ///   a variable claims another type.
    /// - [`BridgeError::UnknownVariable`] if no variable of that name and
    ///   type is declared.
    pub fn resolve<T: GroundType>(&self, arg: &Argument, position: usize) -> Result<Term<T, V>> {
        let Argument::Variable(var) = arg else {
            return T::from_argument(arg)
                .map(Term::Value)
                .ok_or_else(|| BridgeError::TypeMismatch {
                    position,
                    expected: T::KIND,
                    found: arg.type_tag().to_string(),
                });
        };

        let claimed = match var.expected() {
            ExpectedType::Known(kind) => kind,
            ExpectedType::Unknown => T::KIND,
        };
        if claimed != T::KIND {
            return Err(BridgeError::TypeMismatch {
                position,
                expected: T::KIND,
                found: claimed.to_string(),
            });
        }

        match self.vars.get(var.name()) {
            Some((kind, engine_var)) if *kind == T::KIND => Ok(Term::Var(engine_var.clone())),
            _ => Err(BridgeError::UnknownVariable {
                name: var.name().to_string(),
                kind: T::KIND,
            }),
        }
    }
}
