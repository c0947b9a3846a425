//! # Filter syntax tree
//!
//! A filter is a flat, space-separated expression over file properties:
//!
//! ```text
//! length < 65535
//! "focal len" == 55 && filename contains "asc"
//! (exif.iso >= 800 || fits.exptime > 30) && filename endswith ".raw"
//! ```
//!
//! The pieces live in focused submodules:
//!
//! - **[tokens]** - tokens produced by the lexer
//! - **[operators]** - logical, comparison and string operators
//! - **[operation]** - the parsed expression tree
//!
//! ## Grouping and precedence
//!
//! Operators have no precedence. A chain like `a < 1 && b > 2 || c == 3`
//! nests to the right: `(a < 1) && ((b > 2) || (c == 3))`. Parentheses
//! group explicitly.
//!
//! ## Literals
//!
//! The right side of a comparison or string operator is a literal, bare or
//! double-quoted. It is converted to the declared type of the column on its
//! left, so the same text `55` is an integer against `length` and a string
//! against `filename`.
pub mod operation;
pub mod operators;
pub mod tokens;

pub use operation::Operation;
pub use operators::{ComparisonOp, LogicalOp, Operator, OperatorKind, StringOp};
pub use tokens::{Token, TokenStream};
