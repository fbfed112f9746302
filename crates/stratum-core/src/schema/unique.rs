/// A declared unique constraint: `{name, fields, message,
/// validate_before_write, final_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraintDetails {
    pub name: String,

    /// Entity fields the constraint spans
    pub fields: Vec<String>,

    /// Human-readable message surfaced on violation
    pub message: String,

    /// When true, persist executors query for a clash before writing instead
    /// of relying on the driver failure
    pub validate_before_write: bool,

    /// When true, `name` is already the storage-level constraint name
    pub final_name: bool,
}

impl UniqueConstraintDetails {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("unique constraint `{name}` violated"),
            name,
            fields,
            validate_before_write: true,
            final_name: false,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Storage-level constraint name: `UQ_<TABLE>_<NAME>` unless the
    /// declared name is already final.
    pub fn storage_name(&self, table: &str) -> String {
        if self.final_name {
            self.name.clone()
        } else {
            format!(
                "UQ_{}_{}",
                table.to_uppercase(),
                self.name.to_uppercase()
            )
        }
    }
}
