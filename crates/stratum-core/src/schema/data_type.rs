use std::fmt;

/// Storage-side type of a persistent field.
///
/// Closed enumeration; the concrete column type a driver renders for each
/// variant is the driver's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    Blob,

    /// A blob passed transparently through a deflate codec on both read and
    /// write.
    ZipBlob,
    Clob,
    Unknown,
}

impl DataType {
    /// Infers the storage type for a native type. Pure function; fields may
    /// override the result with an explicit mapping.
    pub fn of(ty: &RustType) -> DataType {
        match ty {
            RustType::String => DataType::String,
            RustType::I8 | RustType::I16 | RustType::I32 => DataType::Int,
            RustType::I64 => DataType::Long,
            RustType::F32 => DataType::Float,
            RustType::F64 => DataType::Double,
            RustType::Bool => DataType::Boolean,
            RustType::Date => DataType::Date,
            RustType::DateTime => DataType::DateTime,
            RustType::Bytes | RustType::File => DataType::Blob,
            RustType::Json => DataType::Clob,
            RustType::Object(_) | RustType::Entity(_) | RustType::EntityList(_) => {
                DataType::Unknown
            }
        }
    }

    pub fn is_lob(&self) -> bool {
        matches!(self, Self::Blob | Self::ZipBlob | Self::Clob)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Long | Self::Float | Self::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Native (Rust-side) type of a persistent field.
///
/// Replaces the class references the declarative surface would otherwise
/// carry: a closed set of supported types, plus named references to nested
/// value objects and related entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RustType {
    String,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Date,
    DateTime,
    Bytes,

    /// A filesystem-backed LOB: the runtime value is a path, contents are
    /// streamed through a temp file rather than materialized.
    File,

    /// An arbitrary JSON document.
    Json,

    /// A nested value object with its own sub-field map, addressed through
    /// dotted condition paths.
    Object(String),

    /// A single related entity (foreign key).
    Entity(String),

    /// A collection-valued relation.
    EntityList(String),
}

impl RustType {
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::EntityList(_))
    }
}
