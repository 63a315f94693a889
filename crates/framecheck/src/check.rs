//! The binder: wraps a function with a spec list and checks every call.
//!
//! Rust has no decorator syntax and no runtime signature introspection, so
//! the wrap is explicit: [`TypeCheck`] holds the ordered spec list,
//! [`TypeCheck::wrap`] binds it to a function together with the function's
//! declared parameter names, and the resulting [`CheckedFn`] runs the
//! per-invocation state machine: resolve arguments, check arguments, invoke,
//! check the return value, report.
//!
//! Checks never short-circuit execution: the wrapped function runs even when
//! argument violations were found, and all violations across all arguments
//! and the return value end up in one report.

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;

use crate::config::{config, TypeCheckConfig};
use crate::error::{build_error_message, Error, SpecError, TypeCheckError, TypeCheckViolation};
use crate::spec::{TypeSpec, ValueKind};

/// An actual argument value bound by name in a [`CallArgs`].
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// A record batch argument.
    DataFrame(RecordBatch),
    /// A single-array argument.
    Series(ArrayRef),
    /// A non-tabular argument, present only so the binding is complete.
    Other,
}

impl ArgValue {
    /// The runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ArgValue::DataFrame(_) => ValueKind::DataFrame,
            ArgValue::Series(_) => ValueKind::Series,
            ArgValue::Other => ValueKind::Other,
        }
    }
}

/// Call arguments bound by parameter name, in call order.
///
/// Record batches and arrays are cheap to clone (column buffers are shared),
/// so `CallArgs` owns its values.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    entries: Vec<(String, ArgValue)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a record batch to a parameter name.
    pub fn with_frame(mut self, name: impl Into<String>, frame: RecordBatch) -> Self {
        self.entries.push((name.into(), ArgValue::DataFrame(frame)));
        self
    }

    /// Bind an array to a parameter name.
    pub fn with_series(mut self, name: impl Into<String>, series: ArrayRef) -> Self {
        self.entries.push((name.into(), ArgValue::Series(series)));
        self
    }

    /// Record a non-tabular argument so the binding covers the signature.
    pub fn with_other(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), ArgValue::Other));
        self
    }

    /// The value bound to a parameter name, if any.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// The record batch bound to a parameter name, if any.
    pub fn frame(&self, name: &str) -> Option<&RecordBatch> {
        match self.get(name) {
            Some(ArgValue::DataFrame(frame)) => Some(frame),
            _ => None,
        }
    }

    /// The array bound to a parameter name, if any.
    pub fn series(&self, name: &str) -> Option<&ArrayRef> {
        match self.get(name) {
            Some(ArgValue::Series(series)) => Some(series),
            _ => None,
        }
    }
}

/// Capability of a return value to expose its tabular kind.
///
/// Implemented for `RecordBatch`, `ArrayRef`, `()` and `Option` of those;
/// other return types implement it in one line to declare themselves
/// non-tabular (or tabular, for wrapper types).
pub trait TabularValue {
    /// The runtime kind of this value.
    fn tabular_kind(&self) -> ValueKind {
        ValueKind::Other
    }

    fn as_frame(&self) -> Option<&RecordBatch> {
        None
    }

    fn as_series(&self) -> Option<&ArrayRef> {
        None
    }
}

impl TabularValue for RecordBatch {
    fn tabular_kind(&self) -> ValueKind {
        ValueKind::DataFrame
    }

    fn as_frame(&self) -> Option<&RecordBatch> {
        Some(self)
    }
}

impl TabularValue for ArrayRef {
    fn tabular_kind(&self) -> ValueKind {
        ValueKind::Series
    }

    fn as_series(&self) -> Option<&ArrayRef> {
        Some(self)
    }
}

impl TabularValue for () {}

impl<T: TabularValue> TabularValue for Option<T> {
    fn tabular_kind(&self) -> ValueKind {
        match self {
            Some(value) => value.tabular_kind(),
            None => ValueKind::Other,
        }
    }

    fn as_frame(&self) -> Option<&RecordBatch> {
        self.as_ref().and_then(TabularValue::as_frame)
    }

    fn as_series(&self) -> Option<&ArrayRef> {
        self.as_ref().and_then(TabularValue::as_series)
    }
}

/// Builder binding an ordered spec list to a function.
#[derive(Debug, Clone)]
pub struct TypeCheck {
    specs: Vec<TypeSpec>,
    strict: Option<bool>,
    config: Option<Arc<TypeCheckConfig>>,
}

impl TypeCheck {
    /// Start from an ordered list of specs.
    pub fn new<I>(specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TypeSpec>,
    {
        Self {
            specs: specs.into_iter().map(Into::into).collect(),
            strict: None,
            config: None,
        }
    }

    /// Override the configuration's strict-mode default for this wrapper.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Use a local configuration instead of the process-wide one.
    pub fn with_config(mut self, config: Arc<TypeCheckConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Wrap a function, keeping its name and declared parameter names for
    /// diagnostics. Spec names are validated against `params` at call time,
    /// not here, matching the checked-at-invocation contract.
    pub fn wrap<F, R>(self, name: impl Into<String>, params: &[&str], func: F) -> CheckedFn<F>
    where
        F: Fn(&CallArgs) -> R,
        R: TabularValue,
    {
        CheckedFn {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            specs: self.specs,
            strict: self.strict,
            config: self.config,
            func,
        }
    }
}

/// A wrapped function whose tabular arguments and return value are checked
/// on every call.
pub struct CheckedFn<F> {
    name: String,
    params: Vec<String>,
    specs: Vec<TypeSpec>,
    strict: Option<bool>,
    config: Option<Arc<TypeCheckConfig>>,
    func: F,
}

impl<F, R> CheckedFn<F>
where
    F: Fn(&CallArgs) -> R,
    R: TabularValue,
{
    /// The wrapped function's name, as used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the wrapped function, checking arguments and return value.
    ///
    /// Configuration is read fresh on every call. Spec misuse surfaces as
    /// [`SpecError`] regardless of the kill switch; data mismatches surface
    /// as [`TypeCheckError`] or, with `log_type_errors`, as a single
    /// error-level tracing event while the result is still returned.
    pub fn call(&self, args: &CallArgs) -> Result<R, Error> {
        let local = self.config.as_deref();
        let cfg = local.unwrap_or_else(|| config());
        let enabled = cfg.enable_type_checks();
        let strict = self.strict.unwrap_or_else(|| cfg.strict_type_checks());

        // Resolve-Args runs unconditionally: spec misuse is a programming
        // error, not a data error, and is never suppressed.
        let mut return_spec: Option<&TypeSpec> = None;
        let mut resolved: Vec<(&str, &TypeSpec, &ArgValue)> = Vec::new();
        for spec in &self.specs {
            if spec.is_return() {
                if return_spec.is_some() {
                    return Err(SpecError::MultipleReturnSpecs.into());
                }
                return_spec = Some(spec);
                continue;
            }

            let name = spec.arg_name().unwrap_or_default();
            if !self.params.iter().any(|param| param == name) {
                return Err(SpecError::UnknownParameter {
                    function: self.name.clone(),
                    name: name.to_string(),
                }
                .into());
            }
            let value = args.get(name).ok_or_else(|| SpecError::UnboundArgument {
                function: self.name.clone(),
                name: name.to_string(),
            })?;
            if value.kind() != spec.target_kind() {
                return Err(SpecError::ArgumentKindMismatch {
                    name: name.to_string(),
                    expected: spec.target_kind(),
                    actual: value.kind(),
                }
                .into());
            }
            resolved.push((name, spec, value));
        }

        let mut arg_errors: Vec<(String, Vec<TypeCheckViolation>)> = Vec::new();
        if enabled {
            for (name, spec, value) in &resolved {
                let violations = match value {
                    ArgValue::DataFrame(frame) => spec.check_frame(frame, strict),
                    ArgValue::Series(series) => spec.check_series(series),
                    ArgValue::Other => Vec::new(),
                };
                if !violations.is_empty() {
                    arg_errors.push(((*name).to_string(), violations));
                }
            }
        }

        // Checks never block execution; the function always runs.
        let result = (self.func)(args);

        let mut return_errors: Vec<TypeCheckViolation> = Vec::new();
        if enabled {
            if let Some(spec) = return_spec {
                let kind = result.tabular_kind();
                if kind != spec.target_kind() {
                    return Err(SpecError::ReturnKindMismatch {
                        expected: spec.target_kind(),
                        actual: kind,
                    }
                    .into());
                }
                return_errors = if let Some(frame) = result.as_frame() {
                    spec.check_frame(frame, strict)
                } else if let Some(series) = result.as_series() {
                    spec.check_series(series)
                } else {
                    Vec::new()
                };
            }
        }

        if enabled && (!arg_errors.is_empty() || !return_errors.is_empty()) {
            let message = build_error_message(&self.name, &arg_errors, &return_errors);
            if cfg.log_type_errors() {
                tracing::error!(function = %self.name, "{message}");
            } else {
                return Err(TypeCheckError { message }.into());
            }
        }

        Ok(result)
    }
}
