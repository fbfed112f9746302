use super::{AggregateFunction, ConditionGroup, OrderByType, UpdateOperator, Value};

/// One selected column, tagged with the entity field it maps back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub field: String,
    pub column: String,
}

impl ResultField {
    pub fn new(field: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    pub column: String,
    pub order: OrderByType,
}

impl OrderByField {
    pub fn new(column: impl Into<String>, order: OrderByType) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }
}

/// A compiled row query. The driver collaborator renders it; this core only
/// builds the structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<ResultField>,
    pub conditions: ConditionGroup,
    pub order_by: Vec<OrderByField>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
}

/// A compiled scalar aggregate query.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    pub table: String,
    pub function: AggregateFunction,
    pub column: String,
    pub conditions: ConditionGroup,
}

impl AggregateQuery {
    pub fn new(
        table: impl Into<String>,
        function: AggregateFunction,
        column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            function,
            column: column.into(),
            conditions: ConditionGroup::new(),
        }
    }
}

/// A column/value pair of an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column: String,
    pub value: Value,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQuery {
    pub table: String,
    pub columns: Vec<ColumnValue>,

    /// When set, the driver must return the generated identity value.
    pub fetch_generated_id: bool,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
}

/// One update assignment. With a non-`None` operator the driver renders
/// `column = column <op> value`, never a precomputed literal, so concurrent
/// arithmetic updates compose.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub op: UpdateOperator,
    pub value: Value,
}

impl Assignment {
    pub fn set(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: UpdateOperator::None,
            value: value.into(),
        }
    }

    pub fn apply(column: impl Into<String>, op: UpdateOperator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQuery {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub conditions: ConditionGroup,
    pub order_by: Vec<OrderByField>,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQuery {
    pub table: String,
    pub conditions: ConditionGroup,
}

impl DeleteQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
}
