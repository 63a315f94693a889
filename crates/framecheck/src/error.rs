//! Violation records, the two failure kinds, and report formatting.
//!
//! A [`TypeCheckViolation`] describes one structural mismatch. Violations are
//! only ever accumulated into a `Vec`; an empty vec is the canonical
//! "no error" result. The formatted report keeps exact message compatibility
//! with the pandas-side checker this crate mirrors, including its known
//! quoting quirk in the column-type-mismatch line.

use arrow::datatypes::DataType;
use thiserror::Error;

use crate::schema::FailureCase;
use crate::spec::ValueKind;

/// One detected structural mismatch.
///
/// Created by the comparison algorithm, consumed by report formatting.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheckViolation {
    /// Human-readable message, rendered verbatim into the report.
    pub message: String,

    /// Expected element type, when the violation is a type-level mismatch.
    pub expected_type: Option<DataType>,

    /// Actual element type found in the data.
    pub actual_type: Option<DataType>,

    /// Column the violation is attributable to, if any.
    pub column_name: Option<String>,

    /// Failure-case rows reported by a schema validator, if any.
    pub failure_cases: Option<Vec<FailureCase>>,
}

impl TypeCheckViolation {
    /// Create a violation carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected_type: None,
            actual_type: None,
            column_name: None,
            failure_cases: None,
        }
    }

    /// Set the expected element type.
    pub fn with_expected(mut self, dtype: DataType) -> Self {
        self.expected_type = Some(dtype);
        self
    }

    /// Set the actual element type.
    pub fn with_actual(mut self, dtype: DataType) -> Self {
        self.actual_type = Some(dtype);
        self
    }

    /// Set the column the violation refers to.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    /// Attach validator failure-case rows.
    pub fn with_failure_cases(mut self, cases: Vec<FailureCase>) -> Self {
        self.failure_cases = Some(cases);
        self
    }
}

/// Misuse of the checking API itself.
///
/// These are programming errors, not data errors: they are raised
/// unconditionally, never demoted to a log line, and never suppressed by the
/// `enable_type_checks` kill switch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A spec names a parameter the wrapped function does not declare.
    #[error("Function '{function}' has no parameter '{name}'")]
    UnknownParameter { function: String, name: String },

    /// A declared parameter has no value bound in the call.
    #[error("No value bound for parameter '{name}' in call to '{function}'")]
    UnboundArgument { function: String, name: String },

    /// An argument value is not of the spec's tabular kind.
    #[error("Expected {expected} value for argument '{name}' but found {actual} value")]
    ArgumentKindMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The return value is not of the return spec's tabular kind.
    #[error("Expected {expected} return value but found {actual} value")]
    ReturnKindMismatch { expected: ValueKind, actual: ValueKind },

    /// More than one return-value spec was registered.
    #[error("Only one return value type marker allowed.")]
    MultipleReturnSpecs,
}

/// One or more structural mismatches between actual data and its spec.
///
/// All violations across all arguments and the return value are collected
/// before this is produced, so a caller sees every mismatch in one report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TypeCheckError {
    /// The full formatted report, see [`build_error_message`].
    pub message: String,
}

/// Any failure produced by a checked call.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    TypeCheck(#[from] TypeCheckError),
}

/// Format accumulated violations into a single multi-line report.
///
/// Argument blocks appear in the order the map was populated (spec
/// declaration order); the return-value block appears only when non-empty.
pub fn build_error_message(
    function: &str,
    arg_errors: &[(String, Vec<TypeCheckViolation>)],
    return_errors: &[TypeCheckViolation],
) -> String {
    let mut message = format!("Pandas type error in function '{function}'");

    for (arg_name, violations) in arg_errors {
        message.push_str(&format!("\nType error in argument '{arg_name}':"));
        for violation in violations {
            message.push_str("\n\t");
            message.push_str(&violation.message);
        }
    }

    if !return_errors.is_empty() {
        message.push_str("\nType error in return value:");
        for violation in return_errors {
            message.push_str("\n\t");
            message.push_str(&violation.message);
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(msg: &str) -> TypeCheckViolation {
        TypeCheckViolation::new(msg)
    }

    #[test]
    fn test_report_arguments_in_insertion_order() {
        let arg_errors = vec![
            ("data".to_string(), vec![violation("first"), violation("second")]),
            ("filter".to_string(), vec![violation("third")]),
        ];

        let message = build_error_message("f", &arg_errors, &[]);
        assert_eq!(
            message,
            "Pandas type error in function 'f'\n\
             Type error in argument 'data':\n\tfirst\n\tsecond\n\
             Type error in argument 'filter':\n\tthird"
        );
    }

    #[test]
    fn test_report_return_block_only_when_present() {
        let message = build_error_message("f", &[], &[violation("ret")]);
        assert_eq!(
            message,
            "Pandas type error in function 'f'\nType error in return value:\n\tret"
        );

        let empty = build_error_message("f", &[], &[]);
        assert_eq!(empty, "Pandas type error in function 'f'");
    }

    #[test]
    fn test_violation_builder() {
        let v = TypeCheckViolation::new("msg")
            .with_expected(DataType::Int64)
            .with_actual(DataType::Float64)
            .with_column("A");

        assert_eq!(v.expected_type, Some(DataType::Int64));
        assert_eq!(v.actual_type, Some(DataType::Float64));
        assert_eq!(v.column_name.as_deref(), Some("A"));
        assert!(v.failure_cases.is_none());
    }

    #[test]
    fn test_spec_error_messages() {
        let err = SpecError::MultipleReturnSpecs;
        assert_eq!(err.to_string(), "Only one return value type marker allowed.");

        let err = SpecError::UnknownParameter {
            function: "f".to_string(),
            name: "data".to_string(),
        };
        assert_eq!(err.to_string(), "Function 'f' has no parameter 'data'");
    }
}
