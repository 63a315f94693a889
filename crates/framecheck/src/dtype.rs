//! Pandas-style names for Arrow data types.
//!
//! Diagnostics render element types the way pandas prints them (`int64`,
//! `float64`, `bool`, `string`) so that reports read naturally next to the
//! data they describe. The parser accepts the usual aliases seen in schema
//! definitions coming from pandas/polars land.

use arrow::datatypes::{DataType, TimeUnit};

/// Render an Arrow data type under its pandas-style lowercase name.
pub fn dtype_name(dtype: &DataType) -> String {
    match dtype {
        DataType::Null => "null".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::Int8 => "int8".to_string(),
        DataType::Int16 => "int16".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::UInt8 => "uint8".to_string(),
        DataType::UInt16 => "uint16".to_string(),
        DataType::UInt32 => "uint32".to_string(),
        DataType::UInt64 => "uint64".to_string(),
        DataType::Float16 => "float16".to_string(),
        DataType::Float32 => "float32".to_string(),
        DataType::Float64 => "float64".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "string".to_string(),
        DataType::Binary | DataType::LargeBinary => "bytes".to_string(),
        DataType::Date32 => "date32".to_string(),
        DataType::Date64 => "date64".to_string(),
        DataType::Timestamp(unit, None) => format!("datetime64[{}]", time_unit_name(unit)),
        DataType::Timestamp(unit, Some(tz)) => {
            format!("datetime64[{}, {}]", time_unit_name(unit), tz)
        }
        DataType::Duration(unit) => format!("timedelta64[{}]", time_unit_name(unit)),
        DataType::Decimal128(precision, scale) => format!("decimal128({},{})", precision, scale),
        DataType::Dictionary(_, _) => "category".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn time_unit_name(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

/// Parse a dtype string into an Arrow data type.
///
/// Accepts pandas/polars-flavored aliases (`int`, `integer`, `object`,
/// `utf8`, `datetime`, ...). Unsigned widths are kept as-is rather than
/// widened; pandas distinguishes them and so does the comparison.
pub fn parse_dtype(raw: &str) -> Result<DataType, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("dtype is empty".to_string());
    }

    let dtype = match trimmed.to_lowercase().as_str() {
        "bool" | "boolean" => DataType::Boolean,
        "int8" => DataType::Int8,
        "int16" => DataType::Int16,
        "int32" => DataType::Int32,
        "int" | "integer" | "int64" => DataType::Int64,
        "uint8" => DataType::UInt8,
        "uint16" => DataType::UInt16,
        "uint32" => DataType::UInt32,
        "uint64" => DataType::UInt64,
        "float16" => DataType::Float16,
        "float32" => DataType::Float32,
        "float" | "double" | "float64" => DataType::Float64,
        "str" | "string" | "utf8" | "text" | "object" => DataType::Utf8,
        "binary" | "bytes" => DataType::Binary,
        "date" | "date32" => DataType::Date32,
        "date64" => DataType::Date64,
        "datetime" | "timestamp" | "datetime64[ns]" => {
            DataType::Timestamp(TimeUnit::Nanosecond, None)
        }
        "duration" | "timedelta64[ns]" => DataType::Duration(TimeUnit::Nanosecond),
        _ => {
            return Err(format!("unsupported dtype string '{trimmed}'"));
        }
    };

    Ok(dtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pandas_names() {
        assert_eq!(dtype_name(&DataType::Int64), "int64");
        assert_eq!(dtype_name(&DataType::Float64), "float64");
        assert_eq!(dtype_name(&DataType::Boolean), "bool");
        assert_eq!(dtype_name(&DataType::Utf8), "string");
        assert_eq!(dtype_name(&DataType::LargeUtf8), "string");
        assert_eq!(
            dtype_name(&DataType::Timestamp(TimeUnit::Nanosecond, None)),
            "datetime64[ns]"
        );
        assert_eq!(
            dtype_name(&DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))),
            "datetime64[ms, UTC]"
        );
        assert_eq!(dtype_name(&DataType::Decimal128(12, 2)), "decimal128(12,2)");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse_dtype("int64").unwrap(), DataType::Int64);
        assert_eq!(parse_dtype("integer").unwrap(), DataType::Int64);
        assert_eq!(parse_dtype("OBJECT").unwrap(), DataType::Utf8);
        assert_eq!(parse_dtype(" float ").unwrap(), DataType::Float64);
        assert_eq!(
            parse_dtype("datetime64[ns]").unwrap(),
            DataType::Timestamp(TimeUnit::Nanosecond, None)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_dtype("").is_err());
        assert!(parse_dtype("complex128").unwrap_err().contains("complex128"));
    }

    #[test]
    fn test_parse_round_trips_through_name() {
        for dtype in [DataType::Int64, DataType::Float64, DataType::Boolean] {
            assert_eq!(parse_dtype(&dtype_name(&dtype)).unwrap(), dtype);
        }
    }
}
