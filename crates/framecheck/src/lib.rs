//! Structural type checking for Arrow record batches and arrays at function
//! boundaries.
//!
//! A caller declares, for a function's parameters and return value, the
//! expected column layout and per-column element type (or a full validation
//! schema). The wrapper enforces the declaration on every call: all
//! violations across all arguments and the return value are collected into
//! one report, surfaced as an error or demoted to a single log event.
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{Array, ArrayRef, Int64Array};
//! use arrow::datatypes::DataType;
//! use framecheck::{CallArgs, SeriesArgument, SeriesReturnValue, TypeCheck, TypeSpec};
//!
//! let doubled = TypeCheck::new(vec![
//!     TypeSpec::from(SeriesArgument::new("values", DataType::Int64)),
//!     TypeSpec::from(SeriesReturnValue::new(DataType::Int64)),
//! ])
//! .wrap("doubled", &["values"], |args: &CallArgs| -> ArrayRef {
//!     let values = args.series("values").unwrap();
//!     let values = values.as_any().downcast_ref::<Int64Array>().unwrap();
//!     Arc::new(values.iter().map(|v| v.map(|v| v * 2)).collect::<Int64Array>())
//! });
//!
//! let series: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
//! let result = doubled.call(&CallArgs::new().with_series("values", series)).unwrap();
//! assert_eq!(result.len(), 3);
//! ```
//!
//! # Modules
//!
//! - [`spec`]: the four spec variants and the comparison algorithm
//! - [`check`]: the binder wrapping functions with a spec list
//! - [`schema`]: pluggable validation schemas (dtype, nullability, value checks)
//! - [`config`]: process-wide enable/strict/log flags
//! - [`error`]: violations, failure kinds, report formatting
//! - [`dtype`]: pandas-style dtype names for Arrow types

pub mod check;
pub mod config;
pub mod dtype;
pub mod error;
pub mod schema;
pub mod spec;

pub use check::{ArgValue, CallArgs, CheckedFn, TabularValue, TypeCheck};
pub use config::{config, TypeCheckConfig};
pub use error::{build_error_message, Error, SpecError, TypeCheckError, TypeCheckViolation};
pub use schema::{
    Check, ColumnSchema, DataFrameSchema, FailureCase, FrameSchema, SchemaColumn, SchemaDefError,
    SchemaFailure, SeriesSchema,
};
pub use spec::{
    DataFrameArgument, DataFrameReturnValue, FrameType, SeriesArgument, SeriesReturnValue,
    SeriesType, TypeSpec, ValueKind,
};
