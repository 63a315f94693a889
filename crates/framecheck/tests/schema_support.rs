//! Checks for the pluggable schema backend: validator-native messages flow
//! into reports, failure cases ride along, strict mode composes with schema
//! expectations, and custom schema implementations plug into the same seam.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use framecheck::{
    CallArgs, Check, ColumnSchema, DataFrameArgument, DataFrameReturnValue, DataFrameSchema,
    Error, FrameSchema, SchemaColumn, SchemaFailure, SeriesArgument, SeriesSchema, TypeCheck,
};

fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

fn abc_schema() -> Arc<dyn FrameSchema> {
    Arc::new(DataFrameSchema::new(vec![
        SchemaColumn::optional("A", DataType::Float64),
        SchemaColumn::optional("B", DataType::Int64),
        SchemaColumn::optional("C", DataType::Utf8),
    ]))
}

fn abc_frame() -> RecordBatch {
    batch(vec![
        ("A", Arc::new(Float64Array::from(vec![1.0])) as ArrayRef),
        ("B", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
        ("C", Arc::new(StringArray::from(vec!["foo"])) as ArrayRef),
    ])
}

fn type_check_error(err: Error) -> String {
    match err {
        Error::TypeCheck(err) => err.message,
        Error::Spec(err) => panic!("expected TypeCheckError, got SpecError: {err}"),
    }
}

#[test]
fn test_conforming_frame_passes_schema_argument() {
    let checked = TypeCheck::new([DataFrameArgument::new("arg", abc_schema())])
        .wrap("identity", &["arg"], |args: &CallArgs| {
            args.frame("arg").unwrap().clone()
        });

    let result = checked
        .call(&CallArgs::new().with_frame("arg", abc_frame()))
        .unwrap();
    assert_eq!(result, abc_frame());
}

#[test]
fn test_schema_failures_use_validator_text() {
    let checked = TypeCheck::new([DataFrameArgument::new("arg", abc_schema())])
        .wrap("consume", &["arg"], |_args| ());

    // B missing, A has the wrong element type.
    let wrong = batch(vec![
        ("A", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
        ("C", Arc::new(StringArray::from(vec!["foo"])) as ArrayRef),
    ]);
    let err = checked
        .call(&CallArgs::new().with_frame("arg", wrong))
        .unwrap_err();

    assert_eq!(
        type_check_error(err),
        "Pandas type error in function 'consume'\n\
         Type error in argument 'arg':\n\
         \texpected series 'A' to have type float64, got int64\n\
         \tcolumn 'B' not in dataframe"
    );
}

#[test]
fn test_schema_return_value_check() {
    let checked = TypeCheck::new([DataFrameReturnValue::new(abc_schema())])
        .wrap("produce", &[], |_args| {
            batch(vec![
                ("A", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
                ("C", Arc::new(StringArray::from(vec!["foo"])) as ArrayRef),
            ])
        });

    let err = checked.call(&CallArgs::new()).unwrap_err();
    let message = type_check_error(err);
    assert!(message.contains("Type error in return value:"));
    assert!(message.contains("expected series 'A' to have type float64, got int64"));
    assert!(message.contains("column 'B' not in dataframe"));
}

#[test]
fn test_value_checks_are_collected_lazily() {
    let schema: Arc<dyn FrameSchema> = Arc::new(DataFrameSchema::new(vec![
        SchemaColumn::optional("A", DataType::Float64).with_check(Check::Le(10.0)),
        SchemaColumn::optional("B", DataType::Int64).with_check(Check::Lt(2.0)),
        SchemaColumn::optional("C", DataType::Utf8)
            .with_check(Check::StrStartswith("f".to_string())),
    ]));
    let checked = TypeCheck::new([DataFrameArgument::new("arg", schema)])
        .wrap("consume", &["arg"], |_args| ());

    let frame = batch(vec![
        ("A", Arc::new(Float64Array::from(vec![1.0, 20.0])) as ArrayRef),
        ("B", Arc::new(Int64Array::from(vec![1, 5])) as ArrayRef),
        ("C", Arc::new(StringArray::from(vec!["foo", "bar"])) as ArrayRef),
    ]);
    let err = checked
        .call(&CallArgs::new().with_frame("arg", frame))
        .unwrap_err();

    // All three failing checks appear in one report, not just the first.
    let message = type_check_error(err);
    assert!(message.contains("column 'A' failed check le(10): 1 failure cases"));
    assert!(message.contains("column 'B' failed check lt(2): 1 failure cases"));
    assert!(message.contains("column 'C' failed check str_startswith('f'): 1 failure cases"));
}

#[test]
fn test_series_schema_replaces_dtype_fallback() {
    let schema: Arc<dyn SeriesSchema> =
        Arc::new(ColumnSchema::new(DataType::Int64).with_check(Check::Ge(0.0)));
    let checked = TypeCheck::new([SeriesArgument::new("s", schema)])
        .wrap("consume", &["s"], |_args| ());

    let series: ArrayRef = Arc::new(Int64Array::from(vec![3, -1]));
    let err = checked
        .call(&CallArgs::new().with_series("s", series))
        .unwrap_err();

    assert_eq!(
        type_check_error(err),
        "Pandas type error in function 'consume'\n\
         Type error in argument 's':\n\
         \tseries failed check ge(0): 1 failure cases"
    );
}

#[test]
fn test_strict_mode_composes_with_schema_expectation() {
    let schema: Arc<dyn FrameSchema> = Arc::new(DataFrameSchema::new(vec![
        SchemaColumn::optional("A", DataType::Float64),
    ]));
    let checked = TypeCheck::new([DataFrameArgument::new("arg", schema)])
        .strict(true)
        .wrap("consume", &["arg"], |_args| ());

    let err = checked
        .call(&CallArgs::new().with_frame("arg", abc_frame()))
        .unwrap_err();

    // Unspecified-column violations precede the schema's own findings.
    assert_eq!(
        type_check_error(err),
        "Pandas type error in function 'consume'\n\
         Type error in argument 'arg':\n\
         \tFound unspecified column in data frame: 'B'\n\
         \tFound unspecified column in data frame: 'C'"
    );
}

#[test]
fn test_json_loaded_schema_behaves_like_built_one() {
    let json = r#"{"columns": [
        {"name": "A", "dtype": "float64"},
        {"name": "B", "dtype": "int64"},
        {"name": "C", "dtype": "string"}
    ]}"#;
    let loaded: Arc<dyn FrameSchema> = Arc::new(DataFrameSchema::from_json(json).unwrap());
    let built = abc_schema();

    let wrong = batch(vec![(
        "A",
        Arc::new(Int64Array::from(vec![1])) as ArrayRef,
    )]);

    let from_loaded: Vec<String> =
        loaded.validate(&wrong).into_iter().map(|f| f.message).collect();
    let from_built: Vec<String> =
        built.validate(&wrong).into_iter().map(|f| f.message).collect();
    assert_eq!(from_loaded, from_built);
}

/// A schema implementation outside this crate's built-ins still plugs into
/// the spec seam.
#[derive(Debug)]
struct EvenColumnCount;

impl FrameSchema for EvenColumnCount {
    fn column_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn validate(&self, frame: &RecordBatch) -> Vec<SchemaFailure> {
        if frame.num_columns() % 2 == 0 {
            Vec::new()
        } else {
            vec![SchemaFailure {
                message: format!("expected an even column count, got {}", frame.num_columns()),
                column: None,
                failure_cases: Vec::new(),
            }]
        }
    }
}

#[test]
fn test_custom_schema_implementation() {
    let schema: Arc<dyn FrameSchema> = Arc::new(EvenColumnCount);
    let checked = TypeCheck::new([DataFrameArgument::new("arg", schema)])
        .wrap("consume", &["arg"], |_args| ());

    let err = checked
        .call(&CallArgs::new().with_frame("arg", abc_frame()))
        .unwrap_err();
    assert!(type_check_error(err).contains("expected an even column count, got 3"));
}
