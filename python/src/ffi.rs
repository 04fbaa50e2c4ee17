//! ffi.rs
//! `ZstdDict` class, `compress`/`decompress` functions and error mapping.
//!
//! Notes:
//! - The class is frozen; all state lives in the shared core handle.
//! - Mode getters return `(ZstdDict, mode)` tuples, the form `zstd_dict=` accepts.
//! - Engine work runs with the GIL released.

use std::sync::Arc;

use pyo3::buffer::PyBuffer;
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyMemoryError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use zstd_dict_core::compression::{decompress_frames, Compressor, SessionConfig, ZstdCompressor, ZstdDecompressor};
use zstd_dict_core::constants::{mode_ids, DEFAULT_LEVEL};
use zstd_dict_core::dictionary::{DictMode, ZstdDict};
use zstd_dict_core::types::DictError;

create_exception!(zstd_dict, ZstdError, PyException);

pub(crate) fn to_py_err(err: DictError) -> PyErr {
    match &err {
        DictError::Type { .. } => PyTypeError::new_err(err.to_string()),
        DictError::Format { .. } => PyValueError::new_err(err.to_string()),
        DictError::Allocation { .. } => PyMemoryError::new_err(err.to_string()),
        _ => ZstdError::new_err(err.to_string()),
    }
}

// Copy any buffer-protocol object; anything else is a TypeError.
fn buffer_bytes(py: Python<'_>, obj: &Bound<'_, PyAny>) -> PyResult<Vec<u8>> {
    let buffer = PyBuffer::<u8>::get_bound(obj).map_err(|_| {
        to_py_err(DictError::Type { got: obj.get_type().to_string() })
    })?;
    buffer.to_vec(py)
}

/// Represents a zstd dictionary, which can be used for compression/decompression.
///
/// It's thread-safe, and can be shared by multiple compress/decompress calls.
#[pyclass(name = "ZstdDict", module = "zstd_dict", frozen)]
pub struct PyZstdDict {
    inner: Arc<ZstdDict>,
}

#[pymethods]
impl PyZstdDict {
    /// `is_raw=True` means `dict_content` is a "raw content" dictionary,
    /// free of any format restriction.
    #[new]
    #[pyo3(signature = (dict_content, is_raw = None))]
    fn new(py: Python<'_>, dict_content: &Bound<'_, PyAny>, is_raw: Option<&Bound<'_, PyAny>>) -> PyResult<Self> {
        let is_raw = match is_raw {
            Some(flag) => flag.is_truthy()?,
            None => false,
        };
        let content = buffer_bytes(py, dict_content)?;
        Ok(Self { inner: Arc::new(ZstdDict::new(content, is_raw)) })
    }

    #[getter]
    fn dict_id(&self) -> u32 {
        self.inner.dict_id()
    }

    #[getter]
    fn dict_content<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new_bound(py, self.inner.content())
    }

    /// Load as a digested dictionary to compressor.
    /// Some advanced compression parameters may be overridden by the dictionary.
    #[getter]
    fn as_digested_dict(slf: Py<Self>) -> (Py<Self>, u8) {
        (slf, mode_ids::DIGESTED)
    }

    /// Load as an undigested dictionary to compressor.
    /// Costly to load repeatedly; parameters are not overridden.
    #[getter]
    fn as_undigested_dict(slf: Py<Self>) -> (Py<Self>, u8) {
        (slf, mode_ids::UNDIGESTED)
    }

    /// Load as a prefix for the first frame only.
    /// Decompression must use the same prefix.
    #[getter]
    fn as_prefix(slf: Py<Self>) -> (Py<Self>, u8) {
        (slf, mode_ids::PREFIX)
    }

    /// Counters and cached levels as a JSON string.
    fn telemetry_json(&self) -> PyResult<String> {
        self.inner
            .telemetry()
            .to_json()
            .map_err(|e| ZstdError::new_err(e.to_string()))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

// Accept a bare ZstdDict (default mode) or a (ZstdDict, mode) tuple.
fn resolve_dict<'py>(obj: &Bound<'py, PyAny>, default_mode: DictMode) -> PyResult<(Arc<ZstdDict>, DictMode)> {
    if let Ok(dict) = obj.downcast::<PyZstdDict>() {
        return Ok((Arc::clone(&dict.get().inner), default_mode));
    }
    let (dict, raw_mode): (Bound<'py, PyZstdDict>, u8) = obj.extract().map_err(|_| {
        PyTypeError::new_err("zstd_dict argument should be a ZstdDict object or a (ZstdDict, mode) tuple")
    })?;
    let mode = DictMode::try_from(raw_mode)
        .map_err(|_| PyValueError::new_err(format!("unknown dictionary mode {raw_mode}")))?;
    let inner = Arc::clone(&dict.get().inner);
    Ok((inner, mode))
}

/// Compress `data` into a single zstd frame.
/// A bare ZstdDict is loaded undigested.
#[pyfunction]
#[pyo3(signature = (data, level = DEFAULT_LEVEL, zstd_dict = None))]
fn compress<'py>(
    py: Python<'py>,
    data: &Bound<'py, PyAny>,
    level: i32,
    zstd_dict: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let input = buffer_bytes(py, data)?;
    let dict = zstd_dict.map(|d| resolve_dict(d, DictMode::Undigested)).transpose()?;

    let out = py
        .allow_threads(move || -> Result<Vec<u8>, DictError> {
            let view = dict.map(|(d, mode)| d.view(mode, level)).transpose()?;
            let mut compressor = ZstdCompressor::new(SessionConfig::with_level(level), view)?;
            let mut out = Vec::new();
            compressor.compress_frame(&input, &mut out)?;
            Ok(out)
        })
        .map_err(to_py_err)?;
    Ok(PyBytes::new_bound(py, &out))
}

/// Decompress one or more concatenated zstd frames.
/// A bare ZstdDict is loaded digested.
#[pyfunction]
#[pyo3(signature = (data, zstd_dict = None))]
fn decompress<'py>(
    py: Python<'py>,
    data: &Bound<'py, PyAny>,
    zstd_dict: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let input = buffer_bytes(py, data)?;
    let dict = zstd_dict.map(|d| resolve_dict(d, DictMode::Digested)).transpose()?;

    let out = py
        .allow_threads(move || -> Result<Vec<u8>, DictError> {
            let view = dict.map(|(d, mode)| d.view_for_decompression(mode)).transpose()?;
            let mut decompressor = ZstdDecompressor::new(SessionConfig::default(), view);
            decompress_frames(&input, &mut decompressor)
        })
        .map_err(to_py_err)?;
    Ok(PyBytes::new_bound(py, &out))
}

pub(crate) fn register(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyZstdDict>()?;
    m.add_function(wrap_pyfunction!(compress, m)?)?;
    m.add_function(wrap_pyfunction!(decompress, m)?)?;
    m.add("ZstdError", py.get_type_bound::<ZstdError>())?;
    m.add("DICT_TYPE_DIGESTED", mode_ids::DIGESTED)?;
    m.add("DICT_TYPE_UNDIGESTED", mode_ids::UNDIGESTED)?;
    m.add("DICT_TYPE_PREFIX", mode_ids::PREFIX)?;
    Ok(())
}
