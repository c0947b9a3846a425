use std::{cmp::Ordering, fmt};

use crate::value::Value;

/// Operator symbols and keywords as written in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
    /// `contains`
    Contains,
}

/// What an [`Operator`] combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Logical(LogicalOp),
    Comparison(ComparisonOp),
    String(StringOp),
}

/// Boolean combinators (`&&`, `||`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

/// Ordering comparisons, following the [`Value::compare`] contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Case-insensitive text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringOp {
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::And,
        Operator::Or,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::LessEqual,
        Operator::GreaterThan,
        Operator::GreaterEqual,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Operator::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self.kind() {
            OperatorKind::Logical(op) => op.symbol(),
            OperatorKind::Comparison(op) => op.symbol(),
            OperatorKind::String(op) => op.symbol(),
        }
    }

    pub fn kind(self) -> OperatorKind {
        match self {
            Operator::And => OperatorKind::Logical(LogicalOp::And),
            Operator::Or => OperatorKind::Logical(LogicalOp::Or),
            Operator::Equal => OperatorKind::Comparison(ComparisonOp::Equal),
            Operator::NotEqual => OperatorKind::Comparison(ComparisonOp::NotEqual),
            Operator::LessThan => OperatorKind::Comparison(ComparisonOp::LessThan),
            Operator::LessEqual => OperatorKind::Comparison(ComparisonOp::LessEqual),
            Operator::GreaterThan => OperatorKind::Comparison(ComparisonOp::GreaterThan),
            Operator::GreaterEqual => OperatorKind::Comparison(ComparisonOp::GreaterEqual),
            Operator::StartsWith => OperatorKind::String(StringOp::StartsWith),
            Operator::EndsWith => OperatorKind::String(StringOp::EndsWith),
            Operator::Contains => OperatorKind::String(StringOp::Contains),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl LogicalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }

    /// Incomparable operands (a null side) satisfy only `!=`.
    pub fn test(self, left: &Value, right: &Value) -> bool {
        let ordering = left.compare(right);
        match self {
            ComparisonOp::Equal => ordering == Some(Ordering::Equal),
            ComparisonOp::NotEqual => ordering != Some(Ordering::Equal),
            ComparisonOp::LessThan => ordering == Some(Ordering::Less),
            ComparisonOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            ComparisonOp::GreaterThan => ordering == Some(Ordering::Greater),
            ComparisonOp::GreaterEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

impl StringOp {
    pub fn symbol(self) -> &'static str {
        match self {
            StringOp::StartsWith => "startswith",
            StringOp::EndsWith => "endswith",
            StringOp::Contains => "contains",
        }
    }

    pub fn test(self, text: &Value, pattern: &Value) -> bool {
        match self {
            StringOp::StartsWith => text.starts_with(pattern),
            StringOp::EndsWith => text.ends_with(pattern),
            StringOp::Contains => text.contains(pattern),
        }
    }
}
