use super::{json_to_value, value_to_json, PersistenceConverter};
use crate::schema::{DataType, RustType};
use crate::stmt::Value;
use crate::{Error, Result};
use flate2::write::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Write;

/// Converter for `BLOB` / `ZIP_BLOB` columns.
///
/// Structured values are serialized to JSON bytes; strings are treated as
/// filesystem paths whose contents are stored. `ZIP_BLOB` additionally runs
/// the payload through a deflate codec in both directions.
pub struct BlobConverter;

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(Vec::new());
    decoder.write_all(bytes)?;
    decoder
        .finish()
        .map_err(|err| Error::conversion(format!("corrupt compressed blob: {err}")))
}

fn spill_to_temp_file(bytes: &[u8]) -> Result<String> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(bytes)?;

    let path = file
        .into_temp_path()
        .keep()
        .map_err(|err| Error::conversion(format!("cannot retain temp file: {err}")))?;

    path.into_os_string()
        .into_string()
        .map_err(|path| Error::conversion(format!("temp file path is not UTF-8: {path:?}")))
}

impl PersistenceConverter for BlobConverter {
    fn to_storage(
        &self,
        value: &Value,
        data_type: DataType,
        _source: &RustType,
    ) -> Result<Option<Value>> {
        if !matches!(data_type, DataType::Blob | DataType::ZipBlob) {
            return Ok(None);
        }

        let bytes = match value {
            Value::Bytes(bytes) => bytes.clone(),
            // a string destined for a blob column names a file to store
            Value::String(path) => std::fs::read(path)
                .map_err(|err| Error::conversion(format!("cannot read blob file `{path}`: {err}")))?,
            Value::Record(_) | Value::List(_) => {
                serde_json::to_vec(&value_to_json(value)?)?
            }
            _ => return Ok(None),
        };

        let bytes = match data_type {
            DataType::ZipBlob => deflate(&bytes)?,
            _ => bytes,
        };

        Ok(Some(Value::Bytes(bytes)))
    }

    fn to_rust(
        &self,
        value: &Value,
        data_type: DataType,
        target: &RustType,
    ) -> Result<Option<Value>> {
        if !matches!(data_type, DataType::Blob | DataType::ZipBlob) {
            return Ok(None);
        }

        let Value::Bytes(bytes) = value else {
            return Ok(None);
        };

        let bytes = match data_type {
            DataType::ZipBlob => inflate(bytes)?,
            _ => bytes.clone(),
        };

        match target {
            RustType::Bytes => Ok(Some(Value::Bytes(bytes))),
            RustType::File => Ok(Some(Value::String(spill_to_temp_file(&bytes)?))),
            RustType::String => {
                let text = String::from_utf8(bytes)
                    .map_err(|err| Error::conversion(format!("blob is not UTF-8: {err}")))?;
                Ok(Some(Value::String(text)))
            }
            RustType::Json | RustType::Object(_) => {
                let json: serde_json::Value = serde_json::from_slice(&bytes)?;
                json_to_value(&json).map(Some)
            }
            _ => Ok(None),
        }
    }
}
