use super::PersistenceConverter;
use crate::schema::{DataType, RustType};
use crate::stmt::Value;
use crate::Result;

/// Pass-through / rendering converter for string-typed columns and fields.
pub struct StringConverter;

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(v) => Some(v.clone()),
        Value::Bool(v) => Some(v.to_string()),
        Value::I32(v) => Some(v.to_string()),
        Value::I64(v) => Some(v.to_string()),
        Value::F32(v) => Some(v.to_string()),
        Value::F64(v) => Some(v.to_string()),
        Value::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
        Value::DateTime(v) => Some(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        _ => None,
    }
}

impl PersistenceConverter for StringConverter {
    fn to_storage(
        &self,
        value: &Value,
        data_type: DataType,
        _source: &RustType,
    ) -> Result<Option<Value>> {
        if data_type != DataType::String {
            return Ok(None);
        }

        Ok(render(value).map(Value::String))
    }

    fn to_rust(
        &self,
        value: &Value,
        _data_type: DataType,
        target: &RustType,
    ) -> Result<Option<Value>> {
        if *target != RustType::String {
            return Ok(None);
        }

        Ok(render(value).map(Value::String))
    }
}
