//! Type specifications and the comparison algorithm.
//!
//! Four spec variants describe the expected shape of a function's tabular
//! arguments and return value: [`SeriesArgument`], [`SeriesReturnValue`],
//! [`DataFrameArgument`] and [`DataFrameReturnValue`], collected into the
//! closed [`TypeSpec`] enum the binder dispatches on. Specs are immutable
//! after construction and carry no per-call state, so one spec list can be
//! reused across any number of invocations.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::dtype::dtype_name;
use crate::error::TypeCheckViolation;
use crate::schema::{FrameSchema, SeriesSchema};

/// The runtime kind of a value at the checking boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A record batch with named columns.
    DataFrame,
    /// A single array.
    Series,
    /// Anything the checker does not inspect.
    Other,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::DataFrame => write!(f, "DataFrame"),
            ValueKind::Series => write!(f, "Series"),
            ValueKind::Other => write!(f, "non-tabular"),
        }
    }
}

/// Expected type for a series: a plain dtype or a validation schema.
#[derive(Debug, Clone)]
pub enum SeriesType {
    /// Exact element type.
    DType(DataType),
    /// Opaque validation schema; replaces the dtype comparison entirely.
    Schema(Arc<dyn SeriesSchema>),
}

impl From<DataType> for SeriesType {
    fn from(dtype: DataType) -> Self {
        SeriesType::DType(dtype)
    }
}

impl From<Arc<dyn SeriesSchema>> for SeriesType {
    fn from(schema: Arc<dyn SeriesSchema>) -> Self {
        SeriesType::Schema(schema)
    }
}

/// Expected type for a data frame: an ordered column→dtype map or a
/// validation schema.
///
/// The column map is ordered; declaration order drives the order of
/// diagnostics, keeping reports reproducible. An empty map is legal: it
/// matches any frame in non-strict mode and only column-less frames in
/// strict mode.
#[derive(Debug, Clone)]
pub enum FrameType {
    /// Per-column expected element types, in declaration order.
    Columns(Vec<(String, DataType)>),
    /// Opaque validation schema; replaces the per-column comparison.
    Schema(Arc<dyn FrameSchema>),
}

impl FrameType {
    /// Column names forming the reference column set for strict mode.
    fn reference_columns(&self) -> Vec<String> {
        match self {
            FrameType::Columns(columns) => columns.iter().map(|(name, _)| name.clone()).collect(),
            FrameType::Schema(schema) => schema.column_names(),
        }
    }
}

impl From<Vec<(String, DataType)>> for FrameType {
    fn from(columns: Vec<(String, DataType)>) -> Self {
        FrameType::Columns(columns)
    }
}

impl From<Vec<(&str, DataType)>> for FrameType {
    fn from(columns: Vec<(&str, DataType)>) -> Self {
        FrameType::Columns(
            columns
                .into_iter()
                .map(|(name, dtype)| (name.to_string(), dtype))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, DataType); N]> for FrameType {
    fn from(columns: [(&str, DataType); N]) -> Self {
        FrameType::Columns(
            columns
                .into_iter()
                .map(|(name, dtype)| (name.to_string(), dtype))
                .collect(),
        )
    }
}

impl From<Arc<dyn FrameSchema>> for FrameType {
    fn from(schema: Arc<dyn FrameSchema>) -> Self {
        FrameType::Schema(schema)
    }
}

/// Expected type for a series return value.
#[derive(Debug, Clone)]
pub struct SeriesReturnValue {
    /// Expected dtype or schema.
    pub expected: SeriesType,
}

impl SeriesReturnValue {
    pub fn new(expected: impl Into<SeriesType>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Compare an array against the expectation, collecting violations.
    pub fn type_check(&self, series: &ArrayRef) -> Vec<TypeCheckViolation> {
        check_series(&self.expected, series)
    }
}

/// Expected type for a named series argument.
#[derive(Debug, Clone)]
pub struct SeriesArgument {
    /// Name of the target parameter.
    pub name: String,
    /// Expected dtype or schema.
    pub expected: SeriesType,
}

impl SeriesArgument {
    pub fn new(name: impl Into<String>, expected: impl Into<SeriesType>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Compare an array against the expectation, collecting violations.
    pub fn type_check(&self, series: &ArrayRef) -> Vec<TypeCheckViolation> {
        check_series(&self.expected, series)
    }
}

/// Expected type for a data frame return value.
#[derive(Debug, Clone)]
pub struct DataFrameReturnValue {
    /// Expected column map or schema.
    pub expected: FrameType,
}

impl DataFrameReturnValue {
    pub fn new(expected: impl Into<FrameType>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Compare a record batch against the expectation, collecting violations.
    pub fn type_check(&self, frame: &RecordBatch, strict: bool) -> Vec<TypeCheckViolation> {
        check_frame(&self.expected, frame, strict)
    }
}

/// Expected type for a named data frame argument.
#[derive(Debug, Clone)]
pub struct DataFrameArgument {
    /// Name of the target parameter.
    pub name: String,
    /// Expected column map or schema.
    pub expected: FrameType,
}

impl DataFrameArgument {
    pub fn new(name: impl Into<String>, expected: impl Into<FrameType>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Compare a record batch against the expectation, collecting violations.
    pub fn type_check(&self, frame: &RecordBatch, strict: bool) -> Vec<TypeCheckViolation> {
        check_frame(&self.expected, frame, strict)
    }
}

/// A type specification for one argument or the return value.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    SeriesArg(SeriesArgument),
    SeriesReturn(SeriesReturnValue),
    FrameArg(DataFrameArgument),
    FrameReturn(DataFrameReturnValue),
}

impl TypeSpec {
    /// The tabular kind this spec targets.
    pub fn target_kind(&self) -> ValueKind {
        match self {
            TypeSpec::SeriesArg(_) | TypeSpec::SeriesReturn(_) => ValueKind::Series,
            TypeSpec::FrameArg(_) | TypeSpec::FrameReturn(_) => ValueKind::DataFrame,
        }
    }

    /// Whether this spec targets the return value.
    pub fn is_return(&self) -> bool {
        matches!(self, TypeSpec::SeriesReturn(_) | TypeSpec::FrameReturn(_))
    }

    /// The target parameter name, for argument specs.
    pub fn arg_name(&self) -> Option<&str> {
        match self {
            TypeSpec::SeriesArg(spec) => Some(&spec.name),
            TypeSpec::FrameArg(spec) => Some(&spec.name),
            TypeSpec::SeriesReturn(_) | TypeSpec::FrameReturn(_) => None,
        }
    }

    pub(crate) fn check_frame(&self, frame: &RecordBatch, strict: bool) -> Vec<TypeCheckViolation> {
        match self {
            TypeSpec::FrameArg(spec) => spec.type_check(frame, strict),
            TypeSpec::FrameReturn(spec) => spec.type_check(frame, strict),
            TypeSpec::SeriesArg(_) | TypeSpec::SeriesReturn(_) => Vec::new(),
        }
    }

    pub(crate) fn check_series(&self, series: &ArrayRef) -> Vec<TypeCheckViolation> {
        match self {
            TypeSpec::SeriesArg(spec) => spec.type_check(series),
            TypeSpec::SeriesReturn(spec) => spec.type_check(series),
            TypeSpec::FrameArg(_) | TypeSpec::FrameReturn(_) => Vec::new(),
        }
    }
}

impl From<SeriesArgument> for TypeSpec {
    fn from(spec: SeriesArgument) -> Self {
        TypeSpec::SeriesArg(spec)
    }
}

impl From<SeriesReturnValue> for TypeSpec {
    fn from(spec: SeriesReturnValue) -> Self {
        TypeSpec::SeriesReturn(spec)
    }
}

impl From<DataFrameArgument> for TypeSpec {
    fn from(spec: DataFrameArgument) -> Self {
        TypeSpec::FrameArg(spec)
    }
}

impl From<DataFrameReturnValue> for TypeSpec {
    fn from(spec: DataFrameReturnValue) -> Self {
        TypeSpec::FrameReturn(spec)
    }
}

fn check_series(expected: &SeriesType, series: &ArrayRef) -> Vec<TypeCheckViolation> {
    match expected {
        SeriesType::Schema(schema) => schema
            .validate(series)
            .into_iter()
            .map(|failure| failure.into_violation())
            .collect(),
        SeriesType::DType(dtype) => {
            if series.data_type() == dtype {
                Vec::new()
            } else {
                vec![TypeCheckViolation::new(format!(
                    "Expected Series of type '{}' but found type '{}'",
                    dtype_name(dtype),
                    dtype_name(series.data_type())
                ))
                .with_expected(dtype.clone())
                .with_actual(series.data_type().clone())]
            }
        }
    }
}

fn check_frame(expected: &FrameType, frame: &RecordBatch, strict: bool) -> Vec<TypeCheckViolation> {
    let mut violations = Vec::new();

    // Strict mode rejects columns outside the reference set, in the order
    // they occur in the value. Runs for schema expectations too.
    if strict {
        let reference: HashSet<String> = expected.reference_columns().into_iter().collect();
        let schema = frame.schema();
        for field in schema.fields().iter() {
            if !reference.contains(field.name().as_str()) {
                violations.push(
                    TypeCheckViolation::new(format!(
                        "Found unspecified column in data frame: '{}'",
                        field.name()
                    ))
                    .with_actual(field.data_type().clone())
                    .with_column(field.name().as_str()),
                );
            }
        }
    }

    match expected {
        FrameType::Schema(schema) => {
            for failure in schema.validate(frame) {
                violations.push(failure.into_violation());
            }
        }
        FrameType::Columns(columns) => {
            for (name, dtype) in columns {
                match frame.column_by_name(name) {
                    None => violations.push(
                        TypeCheckViolation::new(format!("Missing column in DataFrame: '{name}'"))
                            .with_expected(dtype.clone())
                            .with_column(name.as_str()),
                    ),
                    Some(column) => {
                        if column.data_type() != dtype {
                            // The misplaced quote before the column name is
                            // kept for message compatibility with existing
                            // consumers.
                            violations.push(
                                TypeCheckViolation::new(format!(
                                    "Expected type '{}' for column {}' but found type '{}'",
                                    dtype_name(dtype),
                                    name,
                                    dtype_name(column.data_type())
                                ))
                                .with_expected(dtype.clone())
                                .with_actual(column.data_type().clone())
                                .with_column(name.as_str()),
                            );
                        }
                    }
                }
            }
        }
    }

    violations
}
