use super::{ConverterId, PersistenceConverter};
use crate::schema::{DataType, RustType};
use crate::stmt::{Record, Value};
use crate::{Error, Result};

/// Serializes structured values to JSON text on write and parses them back
/// on read. Registered under [`JsonConverter::ID`]; fields opt in by
/// declaring the id.
pub struct JsonConverter;

impl JsonConverter {
    pub const ID: ConverterId = ConverterId::new("json");
}

/// Maps a statement value onto its JSON representation.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I32(v) => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::F32(v) => serde_json::Value::from(*v),
        Value::F64(v) => serde_json::Value::from(*v),
        Value::String(v) => serde_json::Value::String(v.clone()),
        Value::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
        Value::DateTime(v) => {
            serde_json::Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        Value::Bytes(_) => {
            return Err(Error::conversion("binary values have no JSON form"));
        }
        Value::List(items) => serde_json::Value::Array(
            items.iter().map(value_to_json).collect::<Result<_>>()?,
        ),
        Value::Record(record) => {
            let mut map = serde_json::Map::with_capacity(record.len());
            for (name, value) in record.iter() {
                map.insert(name.to_string(), value_to_json(value)?);
            }
            serde_json::Value::Object(map)
        }
    })
}

/// Maps a JSON document onto a statement value. Objects become records,
/// preserving member order.
pub fn json_to_value(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(*v),
        serde_json::Value::Number(v) => {
            if let Some(n) = v.as_i64() {
                Value::I64(n)
            } else if let Some(n) = v.as_f64() {
                Value::F64(n)
            } else {
                return Err(Error::conversion(format!("unrepresentable number: {v}")));
            }
        }
        serde_json::Value::String(v) => Value::String(v.clone()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(json_to_value).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(map) => {
            let mut record = Record::new();
            for (name, value) in map {
                record.insert(name, json_to_value(value)?);
            }
            Value::Record(record)
        }
    })
}

impl PersistenceConverter for JsonConverter {
    fn to_storage(
        &self,
        value: &Value,
        _data_type: DataType,
        _source: &RustType,
    ) -> Result<Option<Value>> {
        let json = value_to_json(value)?;
        let text = serde_json::to_string(&json)?;
        Ok(Some(Value::String(text)))
    }

    fn to_rust(
        &self,
        value: &Value,
        _data_type: DataType,
        _target: &RustType,
    ) -> Result<Option<Value>> {
        let text = match value {
            Value::String(text) => text.as_str(),
            Value::Bytes(bytes) => std::str::from_utf8(bytes)
                .map_err(|err| Error::conversion(format!("stored JSON is not UTF-8: {err}")))?,
            other => {
                return Err(Error::conversion(format!(
                    "expected stored JSON text, found {}",
                    other.variant_name()
                )));
            }
        };

        let json: serde_json::Value = serde_json::from_str(text)?;
        json_to_value(&json).map(Some)
    }
}
