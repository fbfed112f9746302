mod blob;
pub use blob::BlobConverter;

mod clob;
pub use clob::ClobConverter;

mod coerce;

mod date;
pub use date::DateConverter;

mod json;
pub use json::{json_to_value, value_to_json, JsonConverter};

mod string;
pub use string::StringConverter;

use crate::schema::{DataType, FieldDetails, RustType};
use crate::stmt::Value;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Identifies a registered converter. Field declarations reference
/// converters by id; the id is resolved against the service's registry at
/// conversion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConverterId(&'static str);

impl ConverterId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ConverterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Converts values of one particular shape between the runtime and storage
/// type systems. `Ok(None)` means "not handled, fall through".
pub trait PersistenceConverter: Send + Sync {
    fn to_storage(
        &self,
        value: &Value,
        data_type: DataType,
        source: &RustType,
    ) -> Result<Option<Value>>;

    fn to_rust(
        &self,
        value: &Value,
        data_type: DataType,
        target: &RustType,
    ) -> Result<Option<Value>>;
}

/// Supplies storage-backend-specific converters chosen purely from the
/// inferred [`DataType`], without an explicit field declaration.
pub trait ImplicitConverterProvider: Send + Sync {
    fn implicit_converter(&self, data_type: DataType) -> Option<Arc<dyn PersistenceConverter>>;
}

/// Bidirectional value conversion between the runtime and storage type
/// systems.
///
/// Resolution order for a field:
/// 1. the field's explicit [`ConverterId`], resolved against the registry;
/// 2. the injected implicit provider, keyed by the field's [`DataType`];
/// 3. the default converter chain, first non-`None` wins;
/// 4. generic best-effort coercion.
pub struct ConversionService {
    implicit: Option<Box<dyn ImplicitConverterProvider>>,
    chain: Vec<Arc<dyn PersistenceConverter>>,
    by_id: RwLock<HashMap<ConverterId, Arc<dyn PersistenceConverter>>>,
}

impl ConversionService {
    pub fn new() -> Self {
        Self::with_implicit_provider(None)
    }

    pub fn with_implicit_provider(
        implicit: Option<Box<dyn ImplicitConverterProvider>>,
    ) -> Self {
        let service = Self {
            implicit,
            chain: vec![
                Arc::new(StringConverter),
                Arc::new(DateConverter),
                Arc::new(BlobConverter),
                Arc::new(ClobConverter),
            ],
            by_id: RwLock::new(HashMap::new()),
        };

        service.register_converter(JsonConverter::ID, Arc::new(JsonConverter));
        service
    }

    /// Appends a converter to the default chain.
    pub fn add_converter(&mut self, converter: Arc<dyn PersistenceConverter>) {
        self.chain.push(converter);
    }

    /// Registers a converter under an id for fields declaring it explicitly.
    pub fn register_converter(&self, id: ConverterId, converter: Arc<dyn PersistenceConverter>) {
        self.by_id.write().unwrap().insert(id, converter);
    }

    fn field_converter(
        &self,
        field: &FieldDetails,
    ) -> Result<Option<Arc<dyn PersistenceConverter>>> {
        if let Some(id) = &field.converter {
            let by_id = self.by_id.read().unwrap();

            return match by_id.get(id) {
                Some(converter) => Ok(Some(converter.clone())),
                None => Err(Error::configuration(format!(
                    "field `{}` references unregistered converter `{id}`",
                    field.name
                ))),
            };
        }

        Ok(self
            .implicit
            .as_ref()
            .and_then(|provider| provider.implicit_converter(field.data_type)))
    }

    /// Converts a runtime value to the storage representation for a field.
    pub fn to_storage(&self, value: &Value, field: &FieldDetails) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        if let Some(converter) = self.field_converter(field)? {
            if let Some(converted) =
                converter.to_storage(value, field.data_type, &field.rust_type)?
            {
                return Ok(converted);
            }
        }

        for converter in &self.chain {
            if let Some(converted) =
                converter.to_storage(value, field.data_type, &field.rust_type)?
            {
                return Ok(converted);
            }
        }

        coerce::to_storage(value, field.data_type).map_err(|err| {
            err.context(crate::err!(
                "converting field `{}` to storage type {}",
                field.name,
                field.data_type
            ))
        })
    }

    /// Converts a storage value back to the runtime representation for a
    /// field.
    pub fn to_rust(&self, value: &Value, field: &FieldDetails) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        if let Some(converter) = self.field_converter(field)? {
            if let Some(converted) = converter.to_rust(value, field.data_type, &field.rust_type)? {
                return Ok(converted);
            }
        }

        for converter in &self.chain {
            if let Some(converted) = converter.to_rust(value, field.data_type, &field.rust_type)? {
                return Ok(converted);
            }
        }

        coerce::to_rust(value, &field.rust_type).map_err(|err| {
            err.context(crate::err!(
                "converting field `{}` to native type {:?}",
                field.name,
                field.rust_type
            ))
        })
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionService")
            .field("chain_len", &self.chain.len())
            .field("registered", &self.by_id.read().unwrap().len())
            .finish()
    }
}
