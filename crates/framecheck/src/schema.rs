//! Pluggable validation schemas.
//!
//! A spec can carry a validation schema instead of a plain dtype/column map.
//! Schemas validate lazily: every failure is collected, never just the first.
//! The traits are the seam; [`DataFrameSchema`] and [`ColumnSchema`] are the
//! built-in implementations covering dtype, nullability and value checks.

use std::fmt;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    LargeStringArray, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dtype::{dtype_name, parse_dtype};
use crate::error::TypeCheckViolation;

/// One failure-case row reported by a schema validator: which check failed,
/// on which value, at which row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCase {
    /// Column the case belongs to, if attributable.
    pub column: Option<String>,
    /// Name of the failed check, e.g. `lt(2)` or `not_nullable`.
    pub check: String,
    /// Rendered offending value.
    pub failure_case: String,
    /// Row index of the offending value.
    pub index: Option<usize>,
}

/// One schema validation failure, convertible into a violation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFailure {
    /// Validator-native failure text.
    pub message: String,
    /// Column the failure is attributable to, if any.
    pub column: Option<String>,
    /// Per-row failure cases backing this failure.
    pub failure_cases: Vec<FailureCase>,
}

impl SchemaFailure {
    pub(crate) fn into_violation(self) -> TypeCheckViolation {
        let mut violation = TypeCheckViolation::new(self.message);
        if let Some(column) = self.column {
            violation = violation.with_column(column);
        }
        if !self.failure_cases.is_empty() {
            violation = violation.with_failure_cases(self.failure_cases);
        }
        violation
    }
}

/// Validation schema for a whole record batch.
///
/// `column_names` feeds the strict-mode reference column set; `validate`
/// must collect all failures rather than stopping at the first.
pub trait FrameSchema: fmt::Debug + Send + Sync {
    /// Column names the schema declares, in declaration order.
    fn column_names(&self) -> Vec<String>;

    /// Validate the batch, collecting every failure.
    fn validate(&self, frame: &RecordBatch) -> Vec<SchemaFailure>;
}

/// Validation schema for a single array.
pub trait SeriesSchema: fmt::Debug + Send + Sync {
    /// Validate the array, collecting every failure.
    fn validate(&self, series: &ArrayRef) -> Vec<SchemaFailure>;
}

/// A value-level check applied element-wise to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Numeric strictly-less-than bound.
    Lt(f64),
    /// Numeric less-or-equal bound.
    Le(f64),
    /// Numeric strictly-greater-than bound.
    Gt(f64),
    /// Numeric greater-or-equal bound.
    Ge(f64),
    /// String prefix requirement.
    StrStartswith(String),
    /// String membership in a fixed set.
    Isin(Vec<String>),
}

impl Check {
    /// Short name used in failure messages and failure cases.
    pub fn describe(&self) -> String {
        match self {
            Check::Lt(bound) => format!("lt({bound})"),
            Check::Le(bound) => format!("le({bound})"),
            Check::Gt(bound) => format!("gt({bound})"),
            Check::Ge(bound) => format!("ge({bound})"),
            Check::StrStartswith(prefix) => format!("str_startswith('{prefix}')"),
            Check::Isin(values) => format!("isin({values:?})"),
        }
    }

    /// Rows failing the check, with the offending value rendered.
    ///
    /// Null rows never fail a value check; nullability is checked separately.
    /// Rows whose type the check cannot read (e.g. a numeric bound over a
    /// string column) count as failures, rendered under their dtype name.
    fn failing_rows(&self, array: &dyn Array) -> Vec<(usize, String)> {
        let mut failing = Vec::new();
        for row in 0..array.len() {
            if array.is_null(row) {
                continue;
            }
            let outcome = match self {
                Check::Lt(bound) => numeric_at(array, row).map(|v| (v < *bound, render_f64(v))),
                Check::Le(bound) => numeric_at(array, row).map(|v| (v <= *bound, render_f64(v))),
                Check::Gt(bound) => numeric_at(array, row).map(|v| (v > *bound, render_f64(v))),
                Check::Ge(bound) => numeric_at(array, row).map(|v| (v >= *bound, render_f64(v))),
                Check::StrStartswith(prefix) => {
                    string_at(array, row).map(|s| (s.starts_with(prefix.as_str()), s))
                }
                Check::Isin(values) => {
                    string_at(array, row).map(|s| (values.iter().any(|v| *v == s), s))
                }
            };
            match outcome {
                Some((true, _)) => {}
                Some((false, rendered)) => failing.push((row, rendered)),
                None => failing.push((row, format!("<{}>", dtype_name(array.data_type())))),
            }
        }
        failing
    }
}

fn render_f64(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn numeric_at(array: &dyn Array, row: usize) -> Option<f64> {
    let any = array.as_any();
    match array.data_type() {
        DataType::Int8 => any.downcast_ref::<Int8Array>().map(|a| f64::from(a.value(row))),
        DataType::Int16 => any.downcast_ref::<Int16Array>().map(|a| f64::from(a.value(row))),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| f64::from(a.value(row))),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::UInt8 => any.downcast_ref::<UInt8Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt16 => any.downcast_ref::<UInt16Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt32 => any.downcast_ref::<UInt32Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt64 => any.downcast_ref::<UInt64Array>().map(|a| a.value(row) as f64),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| f64::from(a.value(row))),
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        _ => None,
    }
}

fn string_at(array: &dyn Array, row: usize) -> Option<String> {
    let any = array.as_any();
    match array.data_type() {
        DataType::Utf8 => any.downcast_ref::<StringArray>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    }
}

/// Column definition inside a [`DataFrameSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaColumn {
    /// Column name (must match exactly).
    pub name: String,
    /// Expected element type.
    pub dtype: DataType,
    /// Whether null values are allowed.
    pub nullable: bool,
    /// Element-wise value checks.
    pub checks: Vec<Check>,
}

impl SchemaColumn {
    /// A required (non-nullable) column.
    pub fn required(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
            checks: Vec::new(),
        }
    }

    /// An optional (nullable) column.
    pub fn optional(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: true,
            checks: Vec::new(),
        }
    }

    /// Add a value check.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// Built-in record-batch schema: ordered columns with dtype, nullability and
/// value checks, validated lazily.
#[derive(Debug, Clone, Default)]
pub struct DataFrameSchema {
    columns: Vec<SchemaColumn>,
}

impl DataFrameSchema {
    /// Build a schema from ordered column definitions.
    pub fn new(columns: Vec<SchemaColumn>) -> Self {
        Self { columns }
    }

    /// Load a schema definition from JSON.
    ///
    /// Accepts `{"columns": [{"name", "dtype", "nullable"}]}` or a bare
    /// array of column objects. An empty column list is legal and matches
    /// any batch in non-strict mode.
    pub fn from_json(raw: &str) -> Result<Self, SchemaDefError> {
        let repr: SchemaDefRepr = serde_json::from_str(raw)?;
        let defs = match repr {
            SchemaDefRepr::Object { columns } => columns,
            SchemaDefRepr::Columns(columns) => columns,
        };

        let mut columns = Vec::with_capacity(defs.len());
        for def in defs {
            let dtype = parse_dtype(&def.dtype).map_err(|reason| SchemaDefError::Dtype {
                column: def.name.clone(),
                reason,
            })?;
            columns.push(SchemaColumn {
                name: def.name,
                dtype,
                nullable: def.nullable,
                checks: Vec::new(),
            });
        }
        Ok(Self { columns })
    }

    /// The schema's column definitions, in declaration order.
    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }
}

impl FrameSchema for DataFrameSchema {
    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn validate(&self, frame: &RecordBatch) -> Vec<SchemaFailure> {
        let mut failures = Vec::new();
        for column in &self.columns {
            match frame.column_by_name(&column.name) {
                None => failures.push(SchemaFailure {
                    message: format!("column '{}' not in dataframe", column.name),
                    column: Some(column.name.clone()),
                    failure_cases: Vec::new(),
                }),
                Some(array) => failures.extend(validate_array(
                    array.as_ref(),
                    Some(&column.name),
                    &column.dtype,
                    column.nullable,
                    &column.checks,
                )),
            }
        }
        failures
    }
}

/// Built-in single-array schema: dtype, nullability and value checks.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    dtype: DataType,
    nullable: bool,
    checks: Vec<Check>,
}

impl ColumnSchema {
    /// A nullable schema expecting the given element type.
    pub fn new(dtype: DataType) -> Self {
        Self {
            dtype,
            nullable: true,
            checks: Vec::new(),
        }
    }

    /// Set whether null values are allowed.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Add a value check.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

impl SeriesSchema for ColumnSchema {
    fn validate(&self, series: &ArrayRef) -> Vec<SchemaFailure> {
        validate_array(series.as_ref(), None, &self.dtype, self.nullable, &self.checks)
    }
}

fn validate_array(
    array: &dyn Array,
    column: Option<&str>,
    dtype: &DataType,
    nullable: bool,
    checks: &[Check],
) -> Vec<SchemaFailure> {
    let mut failures = Vec::new();

    if array.data_type() != dtype {
        let message = match column {
            Some(name) => format!(
                "expected series '{}' to have type {}, got {}",
                name,
                dtype_name(dtype),
                dtype_name(array.data_type())
            ),
            None => format!(
                "expected series to have type {}, got {}",
                dtype_name(dtype),
                dtype_name(array.data_type())
            ),
        };
        failures.push(SchemaFailure {
            message,
            column: column.map(str::to_string),
            failure_cases: Vec::new(),
        });
    }

    if !nullable && array.null_count() > 0 {
        let cases: Vec<FailureCase> = (0..array.len())
            .filter(|&row| array.is_null(row))
            .map(|row| FailureCase {
                column: column.map(str::to_string),
                check: "not_nullable".to_string(),
                failure_case: "null".to_string(),
                index: Some(row),
            })
            .collect();
        let message = match column {
            Some(name) => format!("non-nullable series '{name}' contains null values"),
            None => "non-nullable series contains null values".to_string(),
        };
        failures.push(SchemaFailure {
            message,
            column: column.map(str::to_string),
            failure_cases: cases,
        });
    }

    for check in checks {
        let failing = check.failing_rows(array);
        if failing.is_empty() {
            continue;
        }
        let cases: Vec<FailureCase> = failing
            .iter()
            .map(|(row, value)| FailureCase {
                column: column.map(str::to_string),
                check: check.describe(),
                failure_case: value.clone(),
                index: Some(*row),
            })
            .collect();
        let message = match column {
            Some(name) => format!(
                "column '{}' failed check {}: {} failure cases",
                name,
                check.describe(),
                cases.len()
            ),
            None => format!(
                "series failed check {}: {} failure cases",
                check.describe(),
                cases.len()
            ),
        };
        failures.push(SchemaFailure {
            message,
            column: column.map(str::to_string),
            failure_cases: cases,
        });
    }

    failures
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaDefRepr {
    Object { columns: Vec<ColumnDefJson> },
    Columns(Vec<ColumnDefJson>),
}

#[derive(Debug, Deserialize)]
struct ColumnDefJson {
    name: String,
    dtype: String,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

/// Error loading a schema definition from JSON.
#[derive(Error, Debug)]
pub enum SchemaDefError {
    #[error("schema definition is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dtype for column '{column}': {reason}")]
    Dtype { column: String, reason: String },
}
