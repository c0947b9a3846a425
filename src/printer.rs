//! Human-readable rendering of compiled filters.
//!
//! Every compiled fragment carries a [`Label`] describing what it does. The
//! printer walks the label tree and produces the same surface syntax the
//! filter was written in, fully parenthesized:
//!
//! ```text
//! (("focal len" == 55) && ("filename" contains asc))
//! ```
//!
//! The null guard and the link to a previous filter are normally hidden;
//! [`explain`] shows them.

use crate::{
    compiler::CompiledFilter,
    value::{TypeTag, Value},
};

/// Printable description of a compiled fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Binary {
        op: &'static str,
        left: Box<Label>,
        right: Box<Label>,
    },
    Column(String),
    Constant {
        value: Value,
        /// Type of the column the constant is compared with, if known
        ty: Option<TypeTag>,
    },
    /// Columns that must be present before `inner` runs
    Guard { columns: Vec<String>, inner: Box<Label> },
    /// A filter that was active when this one was added
    Previous(Box<Label>),
}

impl Label {
    pub fn binary(op: &'static str, left: Label, right: Label) -> Self {
        Label::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

pub struct Printer {
    show_guards: bool,
}

impl Printer {
    pub fn new(show_guards: bool) -> Self {
        Printer { show_guards }
    }

    pub fn print(&self, label: &Label) -> String {
        let mut out = String::new();
        self.print_label(label, &mut out);
        out
    }

    fn print_label(&self, label: &Label, out: &mut String) {
        match label {
            Label::Binary { op, left, right } => {
                out.push('(');
                self.print_label(left, out);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                self.print_label(right, out);
                out.push(')');
            }
            Label::Column(name) => {
                out.push('"');
                out.push_str(name);
                out.push('"');
            }
            Label::Constant { value, ty } => out.push_str(&constant(value, *ty)),
            Label::Guard { columns, inner } => {
                if self.show_guards && !columns.is_empty() {
                    out.push_str("guard[");
                    out.push_str(&columns.join(", "));
                    out.push_str("] ");
                }
                self.print_label(inner, out);
            }
            Label::Previous(inner) if self.show_guards => {
                out.push_str("previous(");
                self.print_label(inner, out);
                out.push(')');
            }
            Label::Previous(inner) => self.print_label(inner, out),
        }
    }
}

fn constant(value: &Value, ty: Option<TypeTag>) -> String {
    match (value, ty) {
        (Value::Null, Some(ty)) => format!("[default({})]", ty),
        (Value::Null, None) => "<null>".to_string(),
        (value, _) => value.to_string(),
    }
}

/// Renders a filter in its written form.
pub fn print(filter: &CompiledFilter) -> String {
    Printer::new(false).print(filter.label())
}

/// Renders a filter including its null guards and earlier filters.
pub fn explain(filter: &CompiledFilter) -> String {
    Printer::new(true).print(filter.label())
}
