use super::PersistenceConverter;
use crate::schema::{DataType, RustType};
use crate::stmt::Value;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Converter for `DATE` / `DATE_TIME` columns.
///
/// Storage side carries `Value::Date` / `Value::DateTime`; strings in
/// `%Y-%m-%d` / ISO-8601 form and epoch milliseconds are accepted on the way
/// in.
pub struct DateConverter;

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|err| Error::conversion(format!("invalid date `{text}`: {err}")))
}

fn parse_date_time(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|err| Error::conversion(format!("invalid datetime `{text}`: {err}")))
}

fn from_epoch_millis(millis: i64) -> Result<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| Error::conversion(format!("epoch millis out of range: {millis}")))
}

impl PersistenceConverter for DateConverter {
    fn to_storage(
        &self,
        value: &Value,
        data_type: DataType,
        _source: &RustType,
    ) -> Result<Option<Value>> {
        match data_type {
            DataType::Date => match value {
                Value::Date(v) => Ok(Some(Value::Date(*v))),
                Value::DateTime(v) => Ok(Some(Value::Date(v.date()))),
                Value::String(v) => Ok(Some(Value::Date(parse_date(v)?))),
                _ => Ok(None),
            },
            DataType::DateTime => match value {
                Value::DateTime(v) => Ok(Some(Value::DateTime(*v))),
                Value::Date(v) => Ok(Some(Value::DateTime(
                    v.and_hms_opt(0, 0, 0).expect("midnight is always valid"),
                ))),
                Value::String(v) => Ok(Some(Value::DateTime(parse_date_time(v)?))),
                Value::I64(v) => Ok(Some(Value::DateTime(from_epoch_millis(*v)?))),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn to_rust(
        &self,
        value: &Value,
        _data_type: DataType,
        target: &RustType,
    ) -> Result<Option<Value>> {
        match target {
            RustType::Date => match value {
                Value::Date(v) => Ok(Some(Value::Date(*v))),
                Value::DateTime(v) => Ok(Some(Value::Date(v.date()))),
                Value::String(v) if !v.trim().is_empty() => {
                    Ok(Some(Value::Date(parse_date(v.trim())?)))
                }
                _ => Ok(None),
            },
            RustType::DateTime => match value {
                Value::DateTime(v) => Ok(Some(Value::DateTime(*v))),
                Value::Date(v) => Ok(Some(Value::DateTime(
                    v.and_hms_opt(0, 0, 0).expect("midnight is always valid"),
                ))),
                Value::String(v) if !v.trim().is_empty() => {
                    Ok(Some(Value::DateTime(parse_date_time(v.trim())?)))
                }
                Value::I64(v) => Ok(Some(Value::DateTime(from_epoch_millis(*v)?))),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}
