use super::Value;
use indexmap::IndexMap;

/// An ordered field-name to value map.
///
/// Records stand in for entity instances at the runtime boundary: executors
/// receive and produce records, and drivers return query rows as records
/// keyed by column name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    /// Inserts a value, returning the previous one if the field was present.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Removes and returns the field value, `Value::Null` if absent.
    pub fn take(&mut self, field: &str) -> Value {
        self.fields.shift_remove(field).unwrap_or(Value::Null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Resolves a dotted path (`created_by.name`) through nested records.
    pub fn entry(&self, path: &str) -> Option<&Value> {
        let mut record = self;
        let mut steps = path.split('.').peekable();

        while let Some(step) = steps.next() {
            let value = record.fields.get(step)?;

            if steps.peek().is_none() {
                return Some(value);
            }

            record = value.as_record()?;
        }

        None
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Record {
    fn from(entries: [(&str, Value); N]) -> Self {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
