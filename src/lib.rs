//! chrbridge: value and control bridge between a CHR rule engine and a
//! dynamically typed host.
//!
//! The engine works with typed ground values and logical variables; the
//! host (Python, or anything that implements [`convert::HostValue`]) hands
//! over untyped values and registers functions that rule bodies call.
//!
//! - [`argument`]: the closed set of values exchanged across the boundary
//! - [`cast`]: rendered text → ground value, with per-kind overrides
//! - [`convert`]: host value → [`Argument`] classification
//! - [`render`]: engine logical variable → host text
//! - [`registry`]: named host callbacks, invoked under the host token
//! - [`context`]: the process-wide host execution token
//! - [`resolve`]: typed resolution of arguments on the engine side
//! - `python` (feature `python`): PyO3 binding and the `chrbridge` module

pub mod argument;
pub mod cast;
pub mod context;
pub mod convert;
pub mod error;
pub mod logging;
#[cfg(feature = "python")]
pub mod python;
pub mod registry;
pub mod render;
pub mod resolve;

pub use argument::{Argument, ExpectedType, LogicalVarRef, ValueKind};
pub use cast::{CastFn, Casters};
pub use context::{HostContext, HostToken};
pub use convert::{classify, classify_all, HostValue};
pub use error::{BridgeError, HostFailure, Result};
pub use registry::{Binding, CallbackRegistry, HostCallable};
pub use render::{render, LogicalVariable};
pub use resolve::{GroundType, Term, VariableScope};
