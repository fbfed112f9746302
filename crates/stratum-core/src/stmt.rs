mod condition;
pub use condition::{Condition, ConditionExpr, ConditionGroup, ConditionNode};

mod op;
pub use op::{AggregateFunction, JoinOperator, NullCheck, Operator, OrderByType, UpdateOperator};

mod query;
pub use query::{
    AggregateQuery, Assignment, ColumnValue, DeleteQuery, InsertQuery, OrderByField, ResultField,
    SelectQuery, UpdateQuery,
};

mod record;
pub use record::Record;

mod value;
pub use value::Value;

mod value_chrono;
