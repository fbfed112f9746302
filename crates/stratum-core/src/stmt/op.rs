use std::fmt;

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
    NotIn,
}

impl Operator {
    /// SQL rendering hint for drivers.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Boolean operator joining a condition to the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Policy applied when a condition's bound value is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullCheck {
    /// The predicate is skipped.
    #[default]
    Skip,

    /// Emit an explicit `IS NULL` check.
    IsNull,

    /// Emit an explicit `IS NOT NULL` check.
    IsNotNull,
}

/// Arithmetic applied between the stored value and the supplied value during
/// a partial update: `new = current <op> value`. `None` overwrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateOperator {
    #[default]
    None,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl UpdateOperator {
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Add => Some("+"),
            Self::Subtract => Some("-"),
            Self::Multiply => Some("*"),
            Self::Divide => Some("/"),
        }
    }
}

/// Aggregate applied by count/aggregate strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Max,
    Min,
    Sum,
    Average,
}

/// Direction of an ordering clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderByType {
    #[default]
    Asc,
    Desc,
}
