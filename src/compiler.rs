use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{LogicalOp, Operation},
    node::Node,
    printer::Label,
    schema::Schema,
    value::{TypeTag, Value},
};

/// A lowered filter fragment.
pub type Predicate = Arc<dyn Fn(&dyn Node) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Filter is empty")]
    Empty,

    #[error("'{0}' is not a condition")]
    NotAPredicate(String),

    #[error("'{0}' is not a value")]
    NotAValue(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// An executable filter.
///
/// Evaluation never fails: a node missing any referenced column does not
/// match. Cloning shares the compiled closures.
#[derive(Clone)]
pub struct CompiledFilter {
    predicate: Predicate,
    label: Label,
    columns: Vec<String>,
}

impl CompiledFilter {
    pub fn evaluate(&self, node: &dyn Node) -> bool {
        (self.predicate)(node)
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Columns a node must carry to match, including earlier filters'
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("label", &self.label)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Where a comparison operand comes from at evaluation time.
#[derive(Debug, Clone)]
enum Operand {
    Column(String),
    Constant(Value),
}

impl Operand {
    fn resolve<'a>(&'a self, node: &'a dyn Node) -> &'a Value {
        match self {
            Operand::Column(name) => node.property(name),
            Operand::Constant(value) => value,
        }
    }
}

/// Lowers an [`Operation`] tree into closures, collecting the columns it
/// reads.
pub struct Compiler<'s> {
    schema: &'s Schema,
    required: Vec<String>,
}

impl<'s> Compiler<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Compiler {
            schema,
            required: Vec::new(),
        }
    }

    fn require(&mut self, name: &str) -> Result<(), CompileError> {
        if !self.schema.contains(name) {
            return Err(CompileError::UnknownColumn(name.to_string()));
        }
        if !self.required.iter().any(|known| known == name) {
            self.required.push(name.to_string());
        }
        Ok(())
    }

    fn lower_predicate(&mut self, op: &Operation) -> Result<(Predicate, Label), CompileError> {
        match op {
            Operation::Empty => Err(CompileError::Empty),

            Operation::Logical { op, left, right } => {
                let (left, left_label) = self.lower_predicate(left)?;
                let (right, right_label) = self.lower_predicate(right)?;
                let predicate: Predicate = match op {
                    LogicalOp::And => Arc::new(move |node: &dyn Node| left(node) && right(node)),
                    LogicalOp::Or => Arc::new(move |node: &dyn Node| left(node) || right(node)),
                };
                Ok((predicate, Label::binary(op.symbol(), left_label, right_label)))
            }

            Operation::Comparison { op, left, right } => {
                let op = *op;
                let (left, right, label) = self.lower_operands(op.symbol(), left, right)?;
                let predicate: Predicate = Arc::new(move |node: &dyn Node| {
                    op.test(left.resolve(node), right.resolve(node))
                });
                Ok((predicate, label))
            }

            Operation::StringOp { op, left, right } => {
                let op = *op;
                let (left, right, label) = self.lower_operands(op.symbol(), left, right)?;
                let predicate: Predicate = Arc::new(move |node: &dyn Node| {
                    op.test(left.resolve(node), right.resolve(node))
                });
                Ok((predicate, label))
            }

            Operation::ColumnRef {
                name,
                ty: TypeTag::Boolean,
            } => {
                self.require(name)?;
                let column = name.clone();
                let predicate: Predicate = Arc::new(move |node: &dyn Node| {
                    matches!(node.property(&column), Value::Boolean(true))
                });
                Ok((predicate, Label::Column(name.clone())))
            }

            Operation::ColumnRef { name, .. } => Err(CompileError::NotAPredicate(name.clone())),
            Operation::Constant(value) => Err(CompileError::NotAPredicate(value.to_string())),
        }
    }

    fn lower_operands(
        &mut self,
        symbol: &'static str,
        left: &Operation,
        right: &Operation,
    ) -> Result<(Operand, Operand, Label), CompileError> {
        let (left_operand, left_label) = self.lower_value(left, right.column_type())?;
        let (right_operand, right_label) = self.lower_value(right, left.column_type())?;
        Ok((
            left_operand,
            right_operand,
            Label::binary(symbol, left_label, right_label),
        ))
    }

    /// `peer` is the type of the column on the other side, used to label
    /// constants.
    fn lower_value(
        &mut self,
        op: &Operation,
        peer: Option<TypeTag>,
    ) -> Result<(Operand, Label), CompileError> {
        match op {
            Operation::ColumnRef { name, .. } => {
                self.require(name)?;
                Ok((Operand::Column(name.clone()), Label::Column(name.clone())))
            }
            Operation::Constant(value) => Ok((
                Operand::Constant(value.clone()),
                Label::Constant {
                    value: value.clone(),
                    ty: peer,
                },
            )),
            Operation::Empty => Err(CompileError::Empty),
            other => Err(CompileError::NotAValue(other.to_string())),
        }
    }

    /// Lowers `ast` and wraps it in the null guard.
    ///
    /// The guard covers every column the expression reads, so a node lacking
    /// any of them fails the whole filter, `||` branches included.
    pub fn compile(mut self, ast: &Operation) -> Result<CompiledFilter, CompileError> {
        let (inner, label) = self.lower_predicate(ast)?;
        let columns = self.required;
        debug!(?columns, "compiled filter");

        let guarded = columns.clone();
        let predicate: Predicate = Arc::new(move |node: &dyn Node| {
            guarded.iter().all(|name| !node.property(name).is_null()) && inner(node)
        });

        Ok(CompiledFilter {
            predicate,
            label: Label::Guard {
                columns: columns.clone(),
                inner: Box::new(label),
            },
            columns,
        })
    }
}

/// Compiles a parsed filter, conjoined with `previous` when given.
pub fn compile(
    ast: &Operation,
    schema: &Schema,
    previous: Option<&CompiledFilter>,
) -> Result<CompiledFilter, CompileError> {
    let filter = Compiler::new(schema).compile(ast)?;
    Ok(match previous {
        Some(previous) => combine(previous, filter),
        None => filter,
    })
}

fn combine(previous: &CompiledFilter, next: CompiledFilter) -> CompiledFilter {
    let first = Arc::clone(&previous.predicate);
    let second = next.predicate;
    let predicate: Predicate = Arc::new(move |node: &dyn Node| first(node) && second(node));

    let mut columns = previous.columns.clone();
    for name in next.columns {
        if !columns.contains(&name) {
            columns.push(name);
        }
    }

    CompiledFilter {
        predicate,
        label: Label::binary(
            LogicalOp::And.symbol(),
            Label::Previous(Box::new(previous.label.clone())),
            next.label,
        ),
        columns,
    }
}
