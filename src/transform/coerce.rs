//! Array coercions used by the column rules

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BooleanArray, Int64Array,
    TimestampMicrosecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Accepted date-time layouts, tried in order
const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Type produced by the datetime rule
pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, None)
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parse a column as naive microsecond timestamps
pub fn to_timestamp(array: &ArrayRef) -> ArrayRef {
    let target = timestamp_type();
    match array.data_type() {
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            cast(array.as_ref(), &target)
                .unwrap_or_else(|_| new_null_array(&target, array.len()))
        }
        _ => match as_utf8(array) {
            Some(strings) => {
                let parsed: TimestampMicrosecondArray = strings
                    .as_string::<i32>()
                    .iter()
                    .map(|v| v.and_then(parse_datetime))
                    .collect();
                Arc::new(parsed)
            }
            None => new_null_array(&target, array.len()),
        },
    }
}

/// Parse one date-time string into microseconds since the epoch
pub fn parse_datetime(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp_micros());
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc().and_utc().timestamp_micros());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_micros())
}

// ============================================================================
// Integers
// ============================================================================

/// Coerce a column to nullable Int64
pub fn to_int64(array: &ArrayRef) -> ArrayRef {
    let dt = array.data_type();
    if dt.is_integer() || matches!(dt, DataType::Boolean) {
        return cast(array.as_ref(), &DataType::Int64)
            .unwrap_or_else(|_| new_null_array(&DataType::Int64, array.len()));
    }

    if dt.is_floating() || matches!(dt, DataType::Decimal128(_, _) | DataType::Decimal256(_, _))
    {
        let Ok(floats) = cast(array.as_ref(), &DataType::Float64) else {
            return new_null_array(&DataType::Int64, array.len());
        };
        let ints: Int64Array = floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.and_then(integral))
            .collect();
        return Arc::new(ints);
    }

    match as_utf8(array) {
        Some(strings) => {
            let ints: Int64Array = strings
                .as_string::<i32>()
                .iter()
                .map(|v| v.and_then(parse_int))
                .collect();
            Arc::new(ints)
        }
        None => new_null_array(&DataType::Int64, array.len()),
    }
}

/// Parse an integer, accepting integral decimals such as `"2.0"`
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().and_then(integral))
}

#[allow(clippy::cast_precision_loss)]
fn integral(value: f64) -> Option<i64> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}

/// Replace nulls with 0, coercing to Int64 first if needed
pub fn fill_nulls_with_zero(array: &ArrayRef) -> ArrayRef {
    let ints = if array.data_type() == &DataType::Int64 {
        Arc::clone(array)
    } else {
        to_int64(array)
    };
    let filled: Int64Array = ints
        .as_primitive::<Int64Type>()
        .iter()
        .map(|v| Some(v.unwrap_or(0)))
        .collect();
    Arc::new(filled)
}

// ============================================================================
// Flags
// ============================================================================

/// Map yes/no strings to booleans; returns the array and how many non-empty
/// values were not recognised
pub fn to_flag(array: &ArrayRef) -> (ArrayRef, usize) {
    if array.data_type() == &DataType::Boolean {
        return (Arc::clone(array), 0);
    }

    let Some(strings) = as_utf8(array) else {
        let unrecognized = array.len() - array.null_count();
        return (new_null_array(&DataType::Boolean, array.len()), unrecognized);
    };

    let mut unrecognized = 0usize;
    let flags: BooleanArray = strings
        .as_string::<i32>()
        .iter()
        .map(|v| {
            let v = v?;
            let flag = parse_flag(v);
            if flag.is_none() && !v.trim().is_empty() {
                unrecognized += 1;
            }
            flag
        })
        .collect();
    (Arc::new(flags), unrecognized)
}

/// `y`/`yes` → true, `n`/`no` → false, case-insensitive
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// View a string-like column as Utf8
fn as_utf8(array: &ArrayRef) -> Option<ArrayRef> {
    match array.data_type() {
        DataType::Utf8 => Some(Arc::clone(array)),
        DataType::LargeUtf8 | DataType::Utf8View => cast(array.as_ref(), &DataType::Utf8).ok(),
        DataType::Dictionary(_, value) if is_string(value) => {
            cast(array.as_ref(), &DataType::Utf8).ok()
        }
        _ => None,
    }
}

fn is_string(dt: &DataType) -> bool {
    matches!(dt, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View)
}
