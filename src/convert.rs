//! Host value classification.
//!
//! [`classify`] turns one untyped host value into an [`Argument`] by walking
//! an ordered decision list; the first capability that matches wins:
//!
//! 1. boolean  → `Argument::Boolean`
//! 2. integer  → `Argument::Integer`
//! 3. float    → `Argument::Float`
//! 4. text     → `Argument::Variable` if the first character is uppercase,
//!    else `Argument::Text`
//! 5. `name` capability → `Argument::Variable` with unknown type
//! 6. anything else → `BridgeError::ConversionFailure`
//!
//! Booleans come first because hosts like Python treat `bool` as a subtype
//! of `int`. The `name` check is last and the most permissive.
//!
//! Hosts plug in through [`HostValue`]. The JSON representation is always
//! available; the PyO3 one lives in `crate::python`.

use std::borrow::Cow;

use serde_json::Value;

use crate::argument::{Argument, ExpectedType, LogicalVarRef, ValueKind};
use crate::error::{BridgeError, Result};

/// Capability checks the classifier needs from a host value.
///
/// Each check answers only for its own kind and returns `None` otherwise.
/// Implementations should not try to coerce between kinds; ordering is the
/// classifier's job.
pub trait HostValue {
    /// Host-side type name, for diagnostics.
    fn type_name(&self) -> String;

    fn as_boolean(&self) -> Option<bool>;

    /// Integers that do not fit in an `i64` answer `None`.
    fn as_integer(&self) -> Option<i64>;

    fn as_float(&self) -> Option<f64>;

    fn as_text(&self) -> Option<Cow<'_, str>>;

    /// Text value of the host's `name` attribute, if there is one.
    fn name_attribute(&self) -> Option<String>;
}

/// Classify a single host value.
///
/// # Errors
///
/// Returns [`BridgeError::ConversionFailure`] when no capability matches, and
/// [`BridgeError::InvalidVariableName`] when the `name` capability yields an
/// empty string.
pub fn classify<H: HostValue + ?Sized>(value: &H) -> Result<Argument> {
    if let Some(b) = value.as_boolean() {
        return Ok(Argument::Boolean(b));
    }
    if let Some(i) = value.as_integer() {
        return Ok(Argument::Integer(i));
    }
    if let Some(f) = value.as_float() {
        return Ok(Argument::Float(f));
    }
    if let Some(text) = value.as_text() {
        return classify_text(text.into_owned());
    }
    if let Some(name) = value.name_attribute() {
        return LogicalVarRef::new(name, ExpectedType::Unknown).map(Argument::Variable);
    }
    let type_name = value.type_name();
    tracing::debug!(type_name = %type_name, "host value matched no classifier shape");
    Err(BridgeError::ConversionFailure { type_name })
}

/// Classify every value, stopping at the first failure.
///
/// # Errors
///
/// Propagates the first error returned by [`classify`].
pub fn classify_all<'a, H, I>(values: I) -> Result<Vec<Argument>>
where
    H: HostValue + ?Sized + 'a,
    I: IntoIterator<Item = &'a H>,
{
    values.into_iter().map(classify).collect()
}

/// Uppercase-initial text names a logical variable; anything else,
/// including the empty string, is a literal.
fn classify_text(text: String) -> Result<Argument> {
    match text.chars().next() {
        Some(first) if first.is_uppercase() => {
            LogicalVarRef::new(text, ExpectedType::Known(ValueKind::Text)).map(Argument::Variable)
        }
        _ => Ok(Argument::Text(text)),
    }
}

// ==================== JSON host ====================

impl HostValue for Value {
    fn type_name(&self) -> String {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
        .to_string()
    }

    fn as_boolean(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn as_integer(&self) -> Option<i64> {
        Value::as_i64(self)
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_f64() => n.as_f64(),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        self.as_str().map(Cow::Borrowed)
    }

    fn name_attribute(&self) -> Option<String> {
        self.get("name")?.as_str().map(str::to_owned)
    }
}
