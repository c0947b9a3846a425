pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod printer;
pub mod schema;
pub mod session;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Operation, Operator, Token, TokenStream};
pub use compiler::{CompileError, CompiledFilter, Compiler, compile};
pub use lexer::{Lexer, tokenize};
pub use node::{Node, Record};
pub use parser::{ParseError, ParseErrorKind, Parser, parse};
pub use printer::{Label, Printer, explain, print};
pub use schema::{Column, Schema, SchemaError};
pub use session::{FilterError, FilterSession, compile_filter};
pub use value::{LiteralError, TypeTag, Value};
