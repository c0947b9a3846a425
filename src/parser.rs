use std::mem;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{Operation, Operator, OperatorKind, Token, TokenStream},
    schema::{Schema, SchemaError},
    value::{LiteralError, Value},
};

/// A filter that could not be parsed, pointing at the offending token.
///
/// Renders as the message, the command and a `^` under the position:
///
/// ```text
/// Invalid operator: is
/// length is 4
///        ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\n{command}\n{}", marker(.position))]
pub struct ParseError {
    pub command: String,
    /// Character offset of the token in `command`
    pub position: usize,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("Invalid property name: {0}")]
    UnknownProperty(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid operator: {0}")]
    UnknownOperator(String),

    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error("Value '{0}' must follow a property and an operator")]
    LiteralWithoutProperty(String),

    #[error("Unbalanced parentheses: '(' is never closed")]
    UnclosedGroup,

    #[error("Unbalanced parentheses: ')' has no matching '('")]
    UnexpectedClose,

    #[error("Too many operands: an operation takes two")]
    TooManyOperands,

    #[error("Operator '{0}' is missing its right operand")]
    MissingOperand(&'static str),

    #[error("Missing operator between operands")]
    MissingOperator,
}

fn marker(position: &usize) -> String {
    format!("{}^", " ".repeat(*position))
}

/// An operation under construction.
#[derive(Debug, Default)]
struct Pending {
    /// Operator and the position it was written at
    op: Option<(Operator, usize)>,
    left: Option<Operation>,
    right: Option<Operation>,
}

impl Pending {
    fn with_left(left: Operation, op: Operator, position: usize) -> Self {
        Pending {
            op: Some((op, position)),
            left: Some(left),
            right: None,
        }
    }

    /// Attaches a finished child; empty children are dropped.
    fn add(&mut self, child: Operation) -> Result<(), ParseErrorKind> {
        if child.is_empty() {
            return Ok(());
        }
        if self.left.is_none() {
            self.left = Some(child);
        } else if self.right.is_none() {
            self.right = Some(child);
        } else {
            return Err(ParseErrorKind::TooManyOperands);
        }
        Ok(())
    }

    /// Whether a parenthesized group may start here.
    fn accepts_group(&self) -> bool {
        match (&self.op, &self.left, &self.right) {
            (_, None, _) => true,
            (Some(_), Some(_), None) => true,
            _ => false,
        }
    }

    fn finish(self) -> Result<Operation, (ParseErrorKind, Option<usize>)> {
        match (self.op, self.left, self.right) {
            (None, None, None) => Ok(Operation::Empty),
            (None, Some(left), None) => Ok(left),
            (None, _, Some(_)) => Err((ParseErrorKind::MissingOperator, None)),
            (Some((op, _)), Some(left), Some(right)) => Ok(Operation::binary(op, left, right)),
            (Some((op, position)), _, _) => {
                Err((ParseErrorKind::MissingOperand(op.symbol()), Some(position)))
            }
        }
    }
}

#[derive(Debug)]
enum Frame {
    /// Opened by `(`
    Group { pending: Pending, position: usize },
    /// Opened when an operator continues past a finished operand
    Chain(Pending),
}

/// Builds an [`Operation`] tree from a token stream.
///
/// Works on a stack of pending operations rather than by recursive descent:
/// `(` saves the current operation and starts a new one, `)` finishes it
/// and hands it back as a child. An operator that follows a complete
/// operand saves it as the left side of a new operation, so chains nest to
/// the right.
pub struct Parser<'s> {
    schema: &'s Schema,
    command: String,
    stack: Vec<Frame>,
    current: Pending,
}

impl<'s> Parser<'s> {
    pub fn new(schema: &'s Schema, command: &str) -> Self {
        Parser {
            schema,
            command: command.to_string(),
            stack: Vec::new(),
            current: Pending::default(),
        }
    }

    fn error(&self, kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError {
            command: self.command.clone(),
            position,
            kind,
        }
    }

    fn end(&self) -> usize {
        self.command.chars().count()
    }

    pub fn parse(mut self, tokens: &TokenStream) -> Result<Operation, ParseError> {
        for token in tokens {
            trace!(%token, "parsing token");
            if token.is_paren('(') {
                self.open_group(token.position)?;
            } else if token.is_paren(')') {
                self.close_group(token.position)?;
            } else {
                self.accept(token)?;
            }
        }

        if let Some(position) = self.stack.iter().rev().find_map(|frame| match frame {
            Frame::Group { position, .. } => Some(*position),
            Frame::Chain(_) => None,
        }) {
            return Err(self.error(ParseErrorKind::UnclosedGroup, position));
        }

        let end = self.end();
        while let Some(frame) = self.stack.pop() {
            if let Frame::Chain(outer) = frame {
                self.attach(outer, end)?;
            }
        }

        let current = mem::take(&mut self.current);
        let operation = self.finish(current, end)?;
        debug!(operation = %operation, "parsed filter");
        Ok(operation)
    }

    fn finish(&self, pending: Pending, fallback: usize) -> Result<Operation, ParseError> {
        pending
            .finish()
            .map_err(|(kind, position)| self.error(kind, position.unwrap_or(fallback)))
    }

    /// Finishes the current operation and makes it a child of `outer`,
    /// which becomes current.
    fn attach(&mut self, mut outer: Pending, position: usize) -> Result<(), ParseError> {
        let inner = mem::take(&mut self.current);
        let inner = self.finish(inner, position)?;
        outer
            .add(inner)
            .map_err(|kind| self.error(kind, position))?;
        self.current = outer;
        Ok(())
    }

    fn open_group(&mut self, position: usize) -> Result<(), ParseError> {
        if !self.current.accepts_group() {
            return Err(self.error(ParseErrorKind::MissingOperator, position));
        }
        let pending = mem::take(&mut self.current);
        self.stack.push(Frame::Group { pending, position });
        Ok(())
    }

    fn close_group(&mut self, position: usize) -> Result<(), ParseError> {
        loop {
            match self.stack.pop() {
                Some(Frame::Chain(outer)) => self.attach(outer, position)?,
                Some(Frame::Group { pending, .. }) => return self.attach(pending, position),
                None => return Err(self.error(ParseErrorKind::UnexpectedClose, position)),
            }
        }
    }

    fn accept(&mut self, token: &Token) -> Result<(), ParseError> {
        let position = token.position;

        if self.current.left.is_none() {
            let column = self.resolve(token)?;
            self.current.left = Some(column);
            return Ok(());
        }

        let Some((op, _)) = self.current.op else {
            let op = self.operator(token)?;
            self.current.op = Some((op, position));
            return Ok(());
        };

        if self.current.right.is_none() {
            return match op.kind() {
                OperatorKind::Logical(_) => {
                    let outer = mem::take(&mut self.current);
                    self.stack.push(Frame::Chain(outer));
                    self.accept(token)
                }
                OperatorKind::Comparison(_) | OperatorKind::String(_) => {
                    let literal = self.literal(token)?;
                    self.current.right = Some(literal);
                    Ok(())
                }
            };
        }

        let op = self.operator(token)?;
        let finished = mem::take(&mut self.current);
        let finished = self.finish(finished, position)?;
        self.stack
            .push(Frame::Chain(Pending::with_left(finished, op, position)));
        Ok(())
    }

    fn resolve(&self, token: &Token) -> Result<Operation, ParseError> {
        let column = self
            .schema
            .lookup(&token.text)
            .map_err(|err| self.error(err.into(), token.position))?
            .ok_or_else(|| {
                self.error(
                    ParseErrorKind::UnknownProperty(token.text.clone()),
                    token.position,
                )
            })?;
        Ok(Operation::column(
            column.qualified_name.clone(),
            column.declared_type,
        ))
    }

    fn operator(&self, token: &Token) -> Result<Operator, ParseError> {
        let op = if token.quoted {
            None
        } else {
            Operator::from_symbol(&token.text)
        };
        op.ok_or_else(|| {
            self.error(
                ParseErrorKind::UnknownOperator(token.text.clone()),
                token.position,
            )
        })
    }

    /// Converts a literal to the type of the column on its left.
    fn literal(&self, token: &Token) -> Result<Operation, ParseError> {
        let ty = self
            .current
            .left
            .as_ref()
            .and_then(Operation::column_type)
            .ok_or_else(|| {
                self.error(
                    ParseErrorKind::LiteralWithoutProperty(token.text.clone()),
                    token.position,
                )
            })?;
        let value = Value::parse_as(&token.text, ty)
            .map_err(|err| self.error(err.into(), token.position))?;
        Ok(Operation::Constant(value))
    }
}

/// Parses a token stream against the columns a schema knows.
///
/// An empty stream parses to [`Operation::Empty`].
pub fn parse(tokens: &TokenStream, schema: &Schema) -> Result<Operation, ParseError> {
    Parser::new(schema, tokens.command()).parse(tokens)
}
