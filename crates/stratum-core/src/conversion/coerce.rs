//! Best-effort generic coercion, the last step of the resolution chain.
//!
//! Narrowing numeric conversions truncate (`as` semantics, matching what the
//! wrapped store drivers do); they never round. Empty or whitespace-only
//! strings read back from the store coerce to `Null` for any non-string
//! target.

use crate::schema::{DataType, RustType};
use crate::stmt::Value;
use crate::{Error, Result};

fn unsupported(value: &Value, target: impl std::fmt::Display) -> Error {
    Error::conversion(format!(
        "cannot coerce {} value to {target}",
        value.variant_name()
    ))
}

fn parse<T: std::str::FromStr>(text: &str, target: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| Error::conversion(format!("cannot parse `{text}` as {target}")))
}

/// Coerces a runtime value into the shape a storage column of `data_type`
/// expects.
pub(super) fn to_storage(value: &Value, data_type: DataType) -> Result<Value> {
    match data_type {
        DataType::Int | DataType::Long => match value {
            Value::I32(v) if data_type == DataType::Int => Ok(Value::I32(*v)),
            Value::I32(v) => Ok(Value::I64(*v as i64)),
            Value::I64(v) if data_type == DataType::Long => Ok(Value::I64(*v)),
            Value::I64(v) => Ok(Value::I32(*v as i32)),
            Value::F32(v) if data_type == DataType::Int => Ok(Value::I32(*v as i32)),
            Value::F32(v) => Ok(Value::I64(*v as i64)),
            Value::F64(v) if data_type == DataType::Int => Ok(Value::I32(*v as i32)),
            Value::F64(v) => Ok(Value::I64(*v as i64)),
            Value::Bool(v) if data_type == DataType::Int => Ok(Value::I32(*v as i32)),
            Value::Bool(v) => Ok(Value::I64(*v as i64)),
            Value::String(v) if data_type == DataType::Int => {
                Ok(Value::I32(parse(v, "an integer")?))
            }
            Value::String(v) => Ok(Value::I64(parse(v, "an integer")?)),
            _ => Err(unsupported(value, data_type)),
        },
        DataType::Float | DataType::Double => match value {
            Value::F32(v) if data_type == DataType::Float => Ok(Value::F32(*v)),
            Value::F32(v) => Ok(Value::F64(*v as f64)),
            Value::F64(v) if data_type == DataType::Double => Ok(Value::F64(*v)),
            Value::F64(v) => Ok(Value::F32(*v as f32)),
            Value::I32(v) if data_type == DataType::Float => Ok(Value::F32(*v as f32)),
            Value::I32(v) => Ok(Value::F64(*v as f64)),
            Value::I64(v) if data_type == DataType::Float => Ok(Value::F32(*v as f32)),
            Value::I64(v) => Ok(Value::F64(*v as f64)),
            Value::String(v) if data_type == DataType::Float => {
                Ok(Value::F32(parse(v, "a float")?))
            }
            Value::String(v) => Ok(Value::F64(parse(v, "a float")?)),
            _ => Err(unsupported(value, data_type)),
        },
        DataType::Boolean => match value {
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::I32(v) => Ok(Value::Bool(*v != 0)),
            Value::I64(v) => Ok(Value::Bool(*v != 0)),
            Value::String(v) => Ok(Value::Bool(parse(v, "a boolean")?)),
            _ => Err(unsupported(value, data_type)),
        },
        // the dedicated chain converters did not claim it; pass scalars
        // through unchanged and reject structures
        DataType::String
        | DataType::Date
        | DataType::DateTime
        | DataType::Blob
        | DataType::ZipBlob
        | DataType::Clob
        | DataType::Unknown => match value {
            Value::Record(_) | Value::List(_) => Err(unsupported(value, data_type)),
            other => Ok(other.clone()),
        },
    }
}

/// Coerces a storage value into the runtime shape `target` expects.
pub(super) fn to_rust(value: &Value, target: &RustType) -> Result<Value> {
    // store drivers may hand back empty strings for absent values
    if *target != RustType::String {
        if let Value::String(text) = value {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
        }
    }

    match target {
        RustType::I8 | RustType::I16 | RustType::I32 => match value {
            Value::I32(v) => Ok(Value::I32(*v)),
            Value::I64(v) => Ok(Value::I32(*v as i32)),
            Value::F32(v) => Ok(Value::I32(*v as i32)),
            Value::F64(v) => Ok(Value::I32(*v as i32)),
            Value::String(v) => Ok(Value::I32(parse(v, "an integer")?)),
            _ => Err(unsupported(value, format!("{target:?}"))),
        },
        RustType::I64 => match value {
            Value::I32(v) => Ok(Value::I64(*v as i64)),
            Value::I64(v) => Ok(Value::I64(*v)),
            Value::F32(v) => Ok(Value::I64(*v as i64)),
            Value::F64(v) => Ok(Value::I64(*v as i64)),
            Value::String(v) => Ok(Value::I64(parse(v, "an integer")?)),
            _ => Err(unsupported(value, "I64")),
        },
        RustType::F32 => match value {
            Value::F32(v) => Ok(Value::F32(*v)),
            Value::F64(v) => Ok(Value::F32(*v as f32)),
            Value::I32(v) => Ok(Value::F32(*v as f32)),
            Value::I64(v) => Ok(Value::F32(*v as f32)),
            Value::String(v) => Ok(Value::F32(parse(v, "a float")?)),
            _ => Err(unsupported(value, "F32")),
        },
        RustType::F64 => match value {
            Value::F32(v) => Ok(Value::F64(*v as f64)),
            Value::F64(v) => Ok(Value::F64(*v)),
            Value::I32(v) => Ok(Value::F64(*v as f64)),
            Value::I64(v) => Ok(Value::F64(*v as f64)),
            Value::String(v) => Ok(Value::F64(parse(v, "a float")?)),
            _ => Err(unsupported(value, "F64")),
        },
        RustType::Bool => match value {
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::I32(v) => Ok(Value::Bool(*v != 0)),
            Value::I64(v) => Ok(Value::Bool(*v != 0)),
            Value::String(v) => Ok(Value::Bool(parse(v, "a boolean")?)),
            _ => Err(unsupported(value, "Bool")),
        },
        RustType::String => match value {
            Value::Record(_) | Value::List(_) => Err(unsupported(value, "String")),
            other => Ok(other.clone()),
        },
        RustType::Bytes | RustType::File => match value {
            Value::Bytes(v) => Ok(Value::Bytes(v.clone())),
            Value::String(v) => Ok(Value::Bytes(v.clone().into_bytes())),
            _ => Err(unsupported(value, format!("{target:?}"))),
        },
        RustType::Date
        | RustType::DateTime
        | RustType::Json
        | RustType::Object(_)
        | RustType::Entity(_)
        | RustType::EntityList(_) => match value {
            // already in the expected shape, or the caller knows better
            Value::Date(_) | Value::DateTime(_) | Value::Record(_) | Value::List(_) => {
                Ok(value.clone())
            }
            _ => Err(unsupported(value, format!("{target:?}"))),
        },
    }
}
