// tests/parser_tests.rs

use fquery::ast::{ComparisonOp, LogicalOp, Operation, Operator, StringOp};
use fquery::lexer::tokenize;
use fquery::parser::{ParseError, ParseErrorKind, parse};
use fquery::{Schema, SchemaError, TypeTag, Value};

fn schema() -> Schema {
    let mut schema = Schema::new();
    schema.register("", "length", TypeTag::Integer);
    schema.register("", "filename", TypeTag::String);
    schema.register("", "focal len", TypeTag::Integer);
    schema.register("", "hidden", TypeTag::Boolean);
    schema.register("exif", "iso", TypeTag::Integer);
    schema.register("exif", "width", TypeTag::Integer);
    schema.register("png", "width", TypeTag::Integer);
    schema.register("fits", "exptime", TypeTag::Float);
    schema
}

fn parse_str(command: &str) -> Result<Operation, ParseError> {
    parse(&tokenize(command), &schema())
}

fn column(name: &str, ty: TypeTag) -> Operation {
    Operation::column(name, ty)
}

fn length_lt(n: i64) -> Operation {
    Operation::binary(
        Operator::LessThan,
        column("length", TypeTag::Integer),
        Operation::constant(n),
    )
}

// ============================================================================
// Simple operations
// ============================================================================

#[test]
fn test_comparison() {
    assert_eq!(parse_str("length < 65535").unwrap(), length_lt(65535));
}

#[test]
fn test_every_comparison_operator() {
    let cases = [
        ("==", ComparisonOp::Equal),
        ("!=", ComparisonOp::NotEqual),
        ("<", ComparisonOp::LessThan),
        ("<=", ComparisonOp::LessEqual),
        (">", ComparisonOp::GreaterThan),
        (">=", ComparisonOp::GreaterEqual),
    ];
    for (symbol, expected) in cases {
        let op = parse_str(&format!("length {} 3", symbol)).unwrap();
        assert!(
            matches!(op, Operation::Comparison { op, .. } if op == expected),
            "failed for {}",
            symbol
        );
    }
}

#[test]
fn test_string_operator() {
    let op = parse_str("filename startswith IMG").unwrap();
    match op {
        Operation::StringOp {
            op: StringOp::StartsWith,
            left,
            right,
        } => {
            assert_eq!(*left, column("filename", TypeTag::String));
            assert!(matches!(*right, Operation::Constant(Value::String(ref s)) if s == "img"));
        }
        other => panic!("Expected startswith, got {:?}", other),
    }
}

#[test]
fn test_quoted_column() {
    let op = parse_str("\"focal len\" == 55").unwrap();
    assert_eq!(
        op,
        Operation::binary(
            Operator::Equal,
            column("focal len", TypeTag::Integer),
            Operation::constant(55),
        )
    );
}

#[test]
fn test_literal_follows_column_type() {
    // the same text is an integer against length, a string against filename
    let op = parse_str("filename == 55").unwrap();
    match op {
        Operation::Comparison { right, .. } => {
            assert!(matches!(*right, Operation::Constant(Value::String(_))));
        }
        other => panic!("Expected comparison, got {:?}", other),
    }

    let op = parse_str("fits.exptime > 30").unwrap();
    match op {
        Operation::Comparison { right, .. } => {
            assert!(matches!(*right, Operation::Constant(Value::Float(f)) if f == 30.0));
        }
        other => panic!("Expected comparison, got {:?}", other),
    }
}

#[test]
fn test_boolean_column_alone() {
    assert_eq!(parse_str("hidden").unwrap(), column("hidden", TypeTag::Boolean));
}

#[test]
fn test_empty() {
    assert_eq!(parse_str("").unwrap(), Operation::Empty);
    assert_eq!(parse_str("()").unwrap(), Operation::Empty);
}

// ============================================================================
// Column resolution
// ============================================================================

#[test]
fn test_unique_short_name() {
    let op = parse_str("iso >= 800").unwrap();
    assert_eq!(op.columns(), vec!["exif.iso"]);
}

#[test]
fn test_prefix() {
    let op = parse_str("file contains asc").unwrap();
    assert_eq!(op.columns(), vec!["filename"]);
}

#[test]
fn test_ambiguous_short_name() {
    let err = parse_str("length > 1 && width > 10").unwrap_err();
    assert_eq!(err.position, 14);
    assert_eq!(
        err.kind,
        ParseErrorKind::Schema(SchemaError::Ambiguous {
            name: "width".to_string(),
            namespaces: vec!["exif".to_string(), "png".to_string()],
        })
    );
    let message = err.to_string();
    assert!(message.starts_with("Property 'width' exists in multiple directories: exif, png"));
    assert!(message.contains("\"exif.width\""));
}

#[test]
fn test_qualified_name_resolves_ambiguity() {
    let op = parse_str("png.width > 10").unwrap();
    assert_eq!(op.columns(), vec!["png.width"]);
}

#[test]
fn test_unknown_property() {
    let err = parse_str("size < 10").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownProperty("size".to_string()));
    assert_eq!(err.position, 0);
    assert_eq!(err.to_string(), "Invalid property name: size\nsize < 10\n^");
}

// ============================================================================
// Logical chains and grouping
// ============================================================================

#[test]
fn test_and() {
    let op = parse_str("\"focal len\" == 55 && filename contains \"asc\"").unwrap();
    match op {
        Operation::Logical {
            op: LogicalOp::And,
            left,
            right,
        } => {
            assert!(matches!(*left, Operation::Comparison { op: ComparisonOp::Equal, .. }));
            assert!(matches!(*right, Operation::StringOp { op: StringOp::Contains, .. }));
        }
        other => panic!("Expected &&, got {:?}", other),
    }
}

#[test]
fn test_chain_nests_to_the_right() {
    let op = parse_str("length < 1 && length < 2 || length < 3").unwrap();
    let expected = Operation::binary(
        Operator::And,
        length_lt(1),
        Operation::binary(Operator::Or, length_lt(2), length_lt(3)),
    );
    assert_eq!(op, expected);
}

#[test]
fn test_group_on_the_left() {
    let op = parse_str("(length < 1 || length < 2) && length < 3").unwrap();
    let expected = Operation::binary(
        Operator::And,
        Operation::binary(Operator::Or, length_lt(1), length_lt(2)),
        length_lt(3),
    );
    assert_eq!(op, expected);
}

#[test]
fn test_group_on_the_right() {
    let op = parse_str("length < 1 && (length < 2 || length < 3)").unwrap();
    let expected = Operation::binary(
        Operator::And,
        length_lt(1),
        Operation::binary(Operator::Or, length_lt(2), length_lt(3)),
    );
    assert_eq!(op, expected);
}

#[test]
fn test_group_then_bare_operand() {
    let op = parse_str("(length < 1) && hidden").unwrap();
    assert_eq!(
        op,
        Operation::binary(Operator::And, length_lt(1), column("hidden", TypeTag::Boolean))
    );
}

#[test]
fn test_redundant_parentheses() {
    assert_eq!(parse_str("((length < 1))").unwrap(), length_lt(1));
}

#[test]
fn test_groups_on_both_sides() {
    let op = parse_str("(length<1)||(length<2)").unwrap();
    assert_eq!(op, Operation::binary(Operator::Or, length_lt(1), length_lt(2)));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unclosed_group() {
    let err = parse_str("length < 1 && (length < 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnclosedGroup);
    assert_eq!(err.position, 14);
}

#[test]
fn test_unexpected_close() {
    let err = parse_str("length < 1)").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedClose);
    assert_eq!(err.position, 10);
    assert_eq!(
        err.to_string(),
        "Unbalanced parentheses: ')' has no matching '('\nlength < 1)\n          ^"
    );
}

#[test]
fn test_unknown_operator() {
    let err = parse_str("length =< 4").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownOperator("=<".to_string()));
    assert_eq!(err.position, 7);
}

#[test]
fn test_quoted_operator_is_not_an_operator() {
    let err = parse_str("length \"<\" 4").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownOperator("<".to_string()));
}

#[test]
fn test_invalid_literal() {
    let err = parse_str("length < big").unwrap_err();
    assert_eq!(err.position, 9);
    assert_eq!(
        err.to_string(),
        "Invalid value: cannot convert 'big' to Integer\nlength < big\n         ^"
    );
}

#[test]
fn test_literal_without_property() {
    let err = parse_str("(length < 1) == 3").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::LiteralWithoutProperty("3".to_string()));
    assert_eq!(err.position, 16);
}

#[test]
fn test_missing_operand() {
    let err = parse_str("length <").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingOperand("<"));
    assert_eq!(err.position, 7);

    let err = parse_str("length < 1 &&").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingOperand("&&"));
}

#[test]
fn test_missing_operator_between_groups() {
    let err = parse_str("(length < 1) (length < 2)").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingOperator);
    assert_eq!(err.position, 13);
}
