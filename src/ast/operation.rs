use std::fmt;

use crate::{
    ast::operators::{ComparisonOp, LogicalOp, Operator, OperatorKind, StringOp},
    value::{TypeTag, Value},
};

/// Parsed filter expression.
///
/// Every binary node owns exactly two children. The parser never produces
/// `Empty` below the root; a blank filter parses to `Empty` on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A column resolved through the schema
    ///
    /// # Example
    /// ```text
    /// "focal len"
    /// ```
    ColumnRef { name: String, ty: TypeTag },

    /// A literal already converted to its column's type
    Constant(Value),

    /// `&&` / `||`
    Logical {
        op: LogicalOp,
        left: Box<Operation>,
        right: Box<Operation>,
    },

    /// `== != < <= > >=`
    Comparison {
        op: ComparisonOp,
        left: Box<Operation>,
        right: Box<Operation>,
    },

    /// `startswith endswith contains`
    StringOp {
        op: StringOp,
        left: Box<Operation>,
        right: Box<Operation>,
    },

    /// Nothing was written
    Empty,
}

impl Operation {
    pub fn column(name: impl Into<String>, ty: TypeTag) -> Self {
        Operation::ColumnRef {
            name: name.into(),
            ty,
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Operation::Constant(value.into())
    }

    /// Builds the binary node for `op`.
    pub fn binary(op: Operator, left: Operation, right: Operation) -> Self {
        let (left, right) = (Box::new(left), Box::new(right));
        match op.kind() {
            OperatorKind::Logical(op) => Operation::Logical { op, left, right },
            OperatorKind::Comparison(op) => Operation::Comparison { op, left, right },
            OperatorKind::String(op) => Operation::StringOp { op, left, right },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operation::Empty)
    }

    /// Declared type when this is a column reference
    pub fn column_type(&self) -> Option<TypeTag> {
        match self {
            Operation::ColumnRef { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    /// Qualified names of every column referenced, in order of appearance
    pub fn columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Operation::ColumnRef { name, .. } => names.push(name),
            Operation::Logical { left, right, .. }
            | Operation::Comparison { left, right, .. }
            | Operation::StringOp { left, right, .. } => {
                left.collect_columns(names);
                right.collect_columns(names);
            }
            Operation::Constant(_) | Operation::Empty => {}
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ColumnRef { name, .. } => write!(f, "\"{}\"", name),
            Operation::Constant(Value::Null) => f.write_str("<null>"),
            Operation::Constant(value) => write!(f, "{}", value),
            Operation::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Operation::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Operation::StringOp { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Operation::Empty => Ok(()),
        }
    }
}

#[test]
fn test_display_nests_parentheses() {
    let op = Operation::binary(
        Operator::And,
        Operation::binary(
            Operator::Equal,
            Operation::column("focal len", TypeTag::Integer),
            Operation::constant(55),
        ),
        Operation::binary(
            Operator::Contains,
            Operation::column("filename", TypeTag::String),
            Operation::constant("asc"),
        ),
    );
    assert_eq!(
        op.to_string(),
        "((\"focal len\" == 55) && (\"filename\" contains asc))"
    );
    assert_eq!(op.columns(), vec!["focal len", "filename"]);
}
