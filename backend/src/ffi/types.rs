//! Type conversion utilities for FFI boundary
//!
//! Converts between Python dicts and the FAIR parameter types.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyList, PyLong, PyString, PyTuple};
use serde_json::{Map, Number, Value};

use crate::models::parameter::{FairEstimate, FairParameters};
use crate::quant::{LossSummary, QuantError};

// ========================================================================
// Python to JSON
// ========================================================================

/// Convert a Python value built from dicts, lists, strings, numbers, bools
/// and `None` into a JSON value
///
/// `path` names the value in error messages (`TEF.min`).
fn py_to_json(value: &Bound<'_, PyAny>, path: &str) -> PyResult<Value> {
    if value.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subclass of int in Python, so it is checked first
    if let Ok(flag) = value.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if value.is_instance_of::<PyLong>() {
        if let Ok(n) = value.extract::<i64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = value.extract::<u64>() {
            return Ok(Value::from(n));
        }
        return float_to_json(value.extract::<f64>()?, path);
    }
    if value.is_instance_of::<PyFloat>() {
        return float_to_json(value.extract::<f64>()?, path);
    }
    if let Ok(text) = value.downcast::<PyString>() {
        return Ok(Value::String(text.to_cow()?.into_owned()));
    }
    if let Ok(dict) = value.downcast::<PyDict>() {
        let mut map = Map::new();
        for (key, item) in dict.iter() {
            let key: String = key.extract().map_err(|_| {
                PyValueError::new_err(format!("Keys of '{}' must be strings", path))
            })?;
            let child = py_to_json(&item, &child_path(path, &key))?;
            map.insert(key, child);
        }
        return Ok(Value::Object(map));
    }
    if let Ok(list) = value.downcast::<PyList>() {
        return list
            .iter()
            .enumerate()
            .map(|(i, item)| py_to_json(&item, &child_path(path, &i.to_string())))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = value.downcast::<PyTuple>() {
        return tuple
            .iter()
            .enumerate()
            .map(|(i, item)| py_to_json(&item, &child_path(path, &i.to_string())))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }

    Err(PyValueError::new_err(format!(
        "'{}' has unsupported type {}",
        path,
        value.get_type().name()?
    )))
}

fn float_to_json(n: f64, path: &str) -> PyResult<Value> {
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| PyValueError::new_err(format!("'{}' is not a finite number", path)))
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

// ========================================================================
// Parameter Parsers
// ========================================================================

/// Convert a Python dict keyed by `TEF`, `Vuln`, `LM_Primary`,
/// `LM_Secondary` into `FairParameters`
///
/// Goes through the same serde path as the `fair_parameters` slot, so flat
/// and composite factors are told apart by shape, and the
/// `{"justification": ..., "parameters": {...}}` envelope is accepted too.
/// Missing keys stay missing; the simulation substitutes zero for them.
pub fn parse_fair_parameters(py_params: &Bound<'_, PyDict>) -> PyResult<FairParameters> {
    let value = py_to_json(py_params.as_any(), "")?;
    FairEstimate::from_value(&value)
        .map(|estimate| estimate.parameters)
        .map_err(quant_error_to_py)
}

// ========================================================================
// Result Conversion
// ========================================================================

pub fn summary_to_py(py: Python<'_>, summary: &LossSummary) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("trials", summary.trials)?;
    dict.set_item("mean", summary.mean)?;
    dict.set_item("median", summary.median)?;
    dict.set_item("p90", summary.p90)?;
    dict.set_item("p95", summary.p95)?;
    dict.set_item("p99", summary.p99)?;
    dict.set_item("min", summary.min)?;
    dict.set_item("max", summary.max)?;
    dict.set_item("zero_loss_fraction", summary.zero_loss_fraction)?;
    Ok(dict.unbind())
}

pub fn quant_error_to_py(err: QuantError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
