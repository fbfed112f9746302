/// Extension-table configuration of an extendable entity.
///
/// An extendable entity reserves a pool of generic columns in a side table;
/// runtime-added fields route to `<field_prefix><index>` columns there, keyed
/// back to the owning row by [`ExtendedTableDetails::ENTITY_ID_COLUMN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedTableDetails {
    /// Extension table name, `EXT_<table>` by default
    pub table_name: String,

    /// Prefix of the generated extension column names
    pub field_prefix: String,

    /// Number of reserved extension columns
    pub count: u32,

    /// Declared size of each extension column
    pub field_size: u32,

    /// Charset of the extension columns
    pub charset: String,
}

impl ExtendedTableDetails {
    /// Column of the extension table referencing the owning entity row.
    pub const ENTITY_ID_COLUMN: &'static str = "ENTITY_ID";

    pub fn new(entity_table: &str, count: u32) -> Self {
        Self {
            table_name: format!("EXT_{entity_table}"),
            field_prefix: "FIELD".to_string(),
            count,
            field_size: 2000,
            charset: "UTF8".to_string(),
        }
    }

    pub fn column_name(&self, index: u32) -> String {
        format!("{}{}", self.field_prefix, index)
    }
}
