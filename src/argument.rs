//! Argument model: the values exchanged between the host and the engine.
//!
//! An [`Argument`] is either a ground value (integer, float, text, boolean)
//! or a reference to a logical variable by name. Arguments are immutable
//! once built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// The primitive kinds a ground value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    Text,
    Boolean,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
        }
    }

    /// Parse a rendered string back into a ground value of this kind.
    ///
    /// Used when the host reads a logical variable's textual rendering and
    /// wants a typed value. Integers and floats ignore surrounding
    /// whitespace; booleans accept `true`/`false` (any case) and `1`/`0`;
    /// text is taken verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Cast`] when `input` is not a valid literal of
    /// this kind.
    pub fn cast(self, input: &str) -> Result<Argument> {
        let fail = || BridgeError::Cast {
            input: input.to_string(),
            kind: self,
        };
        match self {
            ValueKind::Integer => input
                .trim()
                .parse::<i64>()
                .map(Argument::Integer)
                .map_err(|_| fail()),
            ValueKind::Float => input
                .trim()
                .parse::<f64>()
                .map(Argument::Float)
                .map_err(|_| fail()),
            ValueKind::Text => Ok(Argument::Text(input.to_string())),
            ValueKind::Boolean => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Argument::Boolean(true)),
                "false" | "0" => Ok(Argument::Boolean(false)),
                _ => Err(fail()),
            },
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier knows about a logical variable's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    Known(ValueKind),
    /// Classified from the name capability; the rule slot decides the type.
    Unknown,
}

impl ExpectedType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpectedType::Known(kind) => kind.as_str(),
            ExpectedType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an engine logical variable by the name the host used.
///
/// Two references with the same name denote the same variable within one
/// classification pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LogicalVarRef {
    name: String,
    expected: ExpectedType,
}

impl LogicalVarRef {
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidVariableName`] if `name` is empty.
    pub fn new(name: impl Into<String>, expected: ExpectedType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BridgeError::InvalidVariableName);
        }
        Ok(Self { name, expected })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected(&self) -> ExpectedType {
        self.expected
    }
}

/// A value crossing the host/engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Argument {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Variable(LogicalVarRef),
}

impl Argument {
    /// Stable identifier of this argument's kind.
    ///
    /// Ground values report their kind; variables report their expected
    /// type (`"unknown"` when the classifier could not tell), which is what
    /// the engine matches against a rule slot.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Argument::Integer(_) => ValueKind::Integer.as_str(),
            Argument::Float(_) => ValueKind::Float.as_str(),
            Argument::Text(_) => ValueKind::Text.as_str(),
            Argument::Boolean(_) => ValueKind::Boolean.as_str(),
            Argument::Variable(var) => var.expected().as_str(),
        }
    }

    /// Kind of a ground value, `None` for variables.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Argument::Integer(_) => Some(ValueKind::Integer),
            Argument::Float(_) => Some(ValueKind::Float),
            Argument::Text(_) => Some(ValueKind::Text),
            Argument::Boolean(_) => Some(ValueKind::Boolean),
            Argument::Variable(_) => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Argument::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&LogicalVarRef> {
        match self {
            Argument::Variable(var) => Some(var),
            _ => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Integer(v) => write!(f, "{v}"),
            Argument::Float(v) => write!(f, "{v}"),
            Argument::Text(v) => write!(f, "{v:?}"),
            Argument::Boolean(v) => write!(f, "{v}"),
            Argument::Variable(var) => f.write_str(var.name()),
        }
    }
}
