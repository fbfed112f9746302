use super::{json_to_value, value_to_json, PersistenceConverter};
use crate::schema::{DataType, RustType};
use crate::stmt::Value;
use crate::{Error, Result};
use std::io::Write;

/// Converter for `CLOB` columns: character LOBs stored as text, with JSON
/// serialization for structured values and temp-file spilling for
/// file-backed targets.
pub struct ClobConverter;

fn text_of(value: &Value) -> Result<Option<String>> {
    match value {
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bytes(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|err| Error::conversion(format!("clob is not UTF-8: {err}")))?;
            Ok(Some(text.to_string()))
        }
        _ => Ok(None),
    }
}

impl PersistenceConverter for ClobConverter {
    fn to_storage(
        &self,
        value: &Value,
        data_type: DataType,
        source: &RustType,
    ) -> Result<Option<Value>> {
        if data_type != DataType::Clob {
            return Ok(None);
        }

        match value {
            // on a file-backed field the string names the file whose text
            // is stored, mirroring the read side's temp-file spill
            Value::String(path) if *source == RustType::File => {
                let text = std::fs::read_to_string(path).map_err(|err| {
                    Error::conversion(format!("cannot read clob file `{path}`: {err}"))
                })?;
                Ok(Some(Value::String(text)))
            }
            Value::String(text) => Ok(Some(Value::String(text.clone()))),
            Value::Record(_) | Value::List(_) => {
                let text = serde_json::to_string(&value_to_json(value)?)?;
                Ok(Some(Value::String(text)))
            }
            _ => Ok(None),
        }
    }

    fn to_rust(
        &self,
        value: &Value,
        data_type: DataType,
        target: &RustType,
    ) -> Result<Option<Value>> {
        if data_type != DataType::Clob {
            return Ok(None);
        }

        let Some(text) = text_of(value)? else {
            return Ok(None);
        };

        match target {
            RustType::String => Ok(Some(Value::String(text))),
            RustType::Json | RustType::Object(_) => {
                let json: serde_json::Value = serde_json::from_str(&text)?;
                json_to_value(&json).map(Some)
            }
            RustType::File => {
                let mut file = tempfile::NamedTempFile::new()?;
                file.write_all(text.as_bytes())?;

                let path = file
                    .into_temp_path()
                    .keep()
                    .map_err(|err| Error::conversion(format!("cannot retain temp file: {err}")))?;

                let path = path.into_os_string().into_string().map_err(|path| {
                    Error::conversion(format!("temp file path is not UTF-8: {path:?}"))
                })?;
                Ok(Some(Value::String(path)))
            }
            _ => Ok(None),
        }
    }
}
