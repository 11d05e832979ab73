//! Python host binding (feature `python`).
//!
//! - `Bound<PyAny>` implements [`HostValue`], so any Python object can be
//!   classified. `bool` is a subclass of `int` in Python; the classifier's
//!   ordering keeps `True` a boolean.
//! - [`PyCallback`] wraps a Python callable as a [`HostCallable`]. It takes
//!   the GIL *inside* the host execution token.
//! - The `chrbridge` extension module exposes `CallbackRegistry`,
//!   `Argument`, `classify` and `init_logging` to Python.
//!
//! **Lock order:** host execution token, then GIL. Python-facing methods
//! that enter the registry release the GIL first (`allow_threads`), so a
//! thread never waits for the token while holding the GIL.

use std::borrow::Cow;
use std::sync::Arc;

use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyInt, PyString, PyTuple};

use crate::argument::Argument;
use crate::context::HostToken;
use crate::convert::{self, HostValue};
use crate::error::{BridgeError, HostFailure};
use crate::logging::{self, Profile};
use crate::registry::{Binding, CallbackRegistry, HostCallable};
use crate::render::{self, LogicalVariable};

// ==================== Classification ====================

impl HostValue for Bound<'_, PyAny> {
    fn type_name(&self) -> String {
        self.get_type()
            .name()
            .map(|n| n.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string())
    }

    fn as_boolean(&self) -> Option<bool> {
        self.downcast::<PyBool>().ok().map(|b| b.is_true())
    }

    fn as_integer(&self) -> Option<i64> {
        self.downcast::<PyInt>().ok()?.extract::<i64>().ok()
    }

    fn as_float(&self) -> Option<f64> {
        self.downcast::<PyFloat>().ok().map(|f| f.value())
    }

    fn as_text(&self) -> Option<Cow<'_, str>> {
        self.downcast::<PyString>()
            .ok()?
            .extract::<String>()
            .ok()
            .map(Cow::Owned)
    }

    fn name_attribute(&self) -> Option<String> {
        self.getattr("name").ok()?.extract::<String>().ok()
    }
}

/// Convert an argument into the Python object a callback receives.
///
/// Variables are passed as their name.
pub fn argument_to_py<'py>(py: Python<'py>, arg: &Argument) -> PyResult<Bound<'py, PyAny>> {
    Ok(match arg {
        Argument::Integer(v) => (*v).into_pyobject(py)?.into_any(),
        Argument::Float(v) => (*v).into_pyobject(py)?.into_any(),
        Argument::Text(v) => v.as_str().into_pyobject(py)?.into_any(),
        Argument::Boolean(v) => PyBool::new(py, *v).to_owned().into_any(),
        Argument::Variable(var) => var.name().into_pyobject(py)?.into_any(),
    })
}

/// Rendering of an engine variable as a Python `str`.
pub fn render_py<'py, V: LogicalVariable + ?Sized>(py: Python<'py>, var: &V) -> Bound<'py, PyString> {
    PyString::new(py, &render::render(var))
}

// ==================== Errors ====================

/// Human-readable form of a `PyErr`, traceback first when there is one.
pub fn pyerr_to_string(py: Python<'_>, err: &PyErr) -> String {
    let msg = format!("{err}");
    if let Some(tb) = err.traceback(py) {
        if let Ok(formatted) = tb.format() {
            return format!("{formatted}{msg}");
        }
    }
    msg
}

impl From<BridgeError> for PyErr {
    fn from(err: BridgeError) -> PyErr {
        let message = err.to_string();
        match err {
            // Re-raise the callback's own exception unchanged.
            BridgeError::Host { source, .. } => match source.downcast::<PyErr>() {
                Ok(original) => *original,
                Err(other) => PyRuntimeError::new_err(other.to_string()),
            },
            BridgeError::ConversionFailure { .. } => PyTypeError::new_err(message),
            BridgeError::UnregisteredCallback(_) => PyRuntimeError::new_err(message),
            BridgeError::InvalidVariableName
            | BridgeError::TypeMismatch { .. }
            | BridgeError::UnknownVariable { .. }
            | BridgeError::Cast { .. } => PyValueError::new_err(message),
        }
    }
}

// ==================== Callbacks ====================

/// A Python callable registered as a host function.
pub struct PyCallback {
    function: Py<PyAny>,
}

impl PyCallback {
    pub fn new(function: Py<PyAny>) -> Self {
        Self { function }
    }
}

impl HostCallable for PyCallback {
    fn invoke(&self, _token: &HostToken, args: &[Argument]) -> Result<(), HostFailure> {
        Python::with_gil(|py| {
            let objects = args
                .iter()
                .map(|arg| argument_to_py(py, arg))
                .collect::<PyResult<Vec<_>>>()?;
            let tuple = PyTuple::new(py, objects)?;
            self.function.bind(py).call1(tuple).map(|_| ()).inspect_err(|err| {
                tracing::debug!(traceback = %pyerr_to_string(py, err), "python callback raised");
            })
        })
        .map_err(HostFailure::from)
    }
}

// ==================== Python classes ====================

/// Classified argument, as seen from Python.
#[pyclass(name = "Argument", frozen)]
pub struct PyArgument {
    inner: Argument,
}

impl PyArgument {
    pub fn argument(&self) -> &Argument {
        &self.inner
    }
}

#[pymethods]
impl PyArgument {
    #[getter]
    fn type_tag(&self) -> &'static str {
        self.inner.type_tag()
    }

    #[getter]
    fn is_variable(&self) -> bool {
        self.inner.is_variable()
    }

    /// Variable name, `None` for ground values.
    #[getter]
    fn name(&self) -> Option<String> {
        self.inner.as_variable().map(|v| v.name().to_owned())
    }

    #[getter]
    fn value<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        argument_to_py(py, &self.inner)
    }

    fn __repr__(&self) -> String {
        format!("Argument({}: {})", self.inner.type_tag(), self.inner)
    }
}

/// Python face of [`CallbackRegistry`].
#[pyclass(name = "CallbackRegistry", frozen)]
pub struct PyCallbackRegistry {
    inner: Arc<CallbackRegistry>,
}

impl PyCallbackRegistry {
    /// Shared handle for the engine side of the session.
    pub fn registry(&self) -> Arc<CallbackRegistry> {
        Arc::clone(&self.inner)
    }
}

#[pymethods]
impl PyCallbackRegistry {
    #[new]
    fn new() -> Self {
        Self {
            inner: Arc::new(CallbackRegistry::new()),
        }
    }

    /// Bind `name` to `func`. Returns `True` if an earlier binding was
    /// replaced.
    fn register_function(&self, name: String, func: Bound<'_, PyAny>) -> PyResult<bool> {
        if !func.is_callable() {
            return Err(PyTypeError::new_err(format!(
                "callback `{name}` must be callable"
            )));
        }
        let binding = self
            .inner
            .register_callable(name, PyCallback::new(func.unbind()));
        Ok(binding == Binding::Replaced)
    }

    /// Classify `args` and invoke the callback bound to `name`.
    #[pyo3(signature = (name, *args))]
    fn call(&self, py: Python<'_>, name: String, args: &Bound<'_, PyTuple>) -> PyResult<()> {
        let values: Vec<_> = args.iter().collect();
        let arguments = convert::classify_all(&values)?;
        let registry = Arc::clone(&self.inner);
        py.allow_threads(move || registry.call(&name, &arguments))
            .map_err(PyErr::from)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names()
    }

    fn __contains__(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

#[pyfunction]
#[pyo3(name = "classify")]
fn py_classify(value: &Bound<'_, PyAny>) -> PyResult<PyArgument> {
    Ok(PyArgument {
        inner: convert::classify(value)?,
    })
}

/// Install the crate's tracing subscriber. `profile` defaults to
/// `CHRBRIDGE_LOG_PROFILE`.
#[pyfunction]
#[pyo3(signature = (profile = None))]
fn init_logging(profile: Option<&str>) -> PyResult<()> {
    let profile = match profile {
        Some(name) => Profile::parse(name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown logging profile `{name}`")))?,
        None => Profile::from_env(),
    };
    logging::init(profile);
    Ok(())
}

#[pymodule]
fn chrbridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyArgument>()?;
    m.add_class::<PyCallbackRegistry>()?;
    m.add_function(wrap_pyfunction!(py_classify, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    Ok(())
}
