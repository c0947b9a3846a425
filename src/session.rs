use thiserror::Error;
use tracing::debug;

use crate::{
    compiler::{self, CompileError, CompiledFilter},
    lexer::tokenize,
    node::Node,
    parser::{self, ParseError},
    printer,
    schema::Schema,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Tokenizes, parses and compiles filter text in one step.
///
/// With `previous`, the result only matches nodes that both filters match.
///
/// # Examples
///
/// ```
/// use fquery::{Record, Schema, TypeTag, compile_filter};
///
/// let mut schema = Schema::new();
/// schema.register("", "length", TypeTag::Integer);
///
/// let filter = compile_filter("length < 65535", &schema, None).unwrap();
/// assert!(filter.evaluate(&Record::new("small").with("length", 1024)));
/// assert!(!filter.evaluate(&Record::new("large").with("length", 70000)));
/// ```
pub fn compile_filter(
    text: &str,
    schema: &Schema,
    previous: Option<&CompiledFilter>,
) -> Result<CompiledFilter, FilterError> {
    let tokens = tokenize(text);
    let ast = parser::parse(&tokens, schema)?;
    Ok(compiler::compile(&ast, schema, previous)?)
}

/// The filter currently narrowing a listing.
///
/// Filters either replace the active one or are added to it. A filter that
/// fails to compile leaves the session as it was.
#[derive(Debug, Clone, Default)]
pub struct FilterSession {
    active: Option<CompiledFilter>,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active filter.
    pub fn apply(&mut self, text: &str, schema: &Schema) -> Result<&CompiledFilter, FilterError> {
        let filter = compile_filter(text, schema, None)?;
        debug!(filter = %printer::print(&filter), "filter applied");
        Ok(self.active.insert(filter))
    }

    /// Narrows the active filter, or applies `text` if there is none.
    pub fn add(&mut self, text: &str, schema: &Schema) -> Result<&CompiledFilter, FilterError> {
        let filter = compile_filter(text, schema, self.active.as_ref())?;
        debug!(filter = %printer::print(&filter), "filter added");
        Ok(self.active.insert(filter))
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The printed active filter
    pub fn show(&self) -> Option<String> {
        self.active.as_ref().map(printer::print)
    }

    pub fn active(&self) -> Option<&CompiledFilter> {
        self.active.as_ref()
    }

    pub fn is_filtered(&self) -> bool {
        self.active.is_some()
    }

    /// Everything matches when no filter is active.
    pub fn matches(&self, node: &dyn Node) -> bool {
        self.active.as_ref().is_none_or(|filter| filter.evaluate(node))
    }

    pub fn select<'a, N: Node + 'a>(&self, nodes: impl IntoIterator<Item = &'a N>) -> Vec<&'a N> {
        nodes.into_iter().filter(|node| self.matches(*node)).collect()
    }
}
