//! Logical variable rendering: engine → host, text only.
//!
//! The engine's logical variables are shown to the host through their own
//! textual form and nothing else. There is no structural reconstruction,
//! and this is not the inverse of classification: feeding the rendered
//! string back through `convert::classify` is a separate operation.

use serde_json::Value;

/// Engine-side logical variable, as far as the bridge is concerned.
pub trait LogicalVariable {
    /// The variable's textual form, bound or unbound, as the engine prints it.
    fn render(&self) -> String;
}

/// Textual rendering of `var`, exactly as the variable produces it.
pub fn render<V: LogicalVariable + ?Sized>(var: &V) -> String {
    var.render()
}

/// Rendering handed back as a JSON host string.
pub fn render_json<V: LogicalVariable + ?Sized>(var: &V) -> Value {
    Value::String(var.render())
}
