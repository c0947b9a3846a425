//! Documentation content for the fq CLI

use super::CliError;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Syntax,
    Operators,
    Properties,
    Types,
    Filtering,
}

impl DocTopic {
    /// Parse topic name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "properties" | "property" | "columns" => Some(Self::Properties),
            "types" | "type" | "values" => Some(Self::Types),
            "filtering" | "filters" | "filter" => Some(Self::Filtering),
            _ => None,
        }
    }
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"FQ DOCUMENTATION

fq filters records by the properties collected for them: file sizes, dates,
EXIF tags, FITS headers and anything else an ingester extracts. A filter is
a comparison, or several joined with && and ||.

DOCUMENTATION TOPICS

  syntax            Tokens, quoting and grouping with parentheses
  operators         Comparison, string and logical operators
  properties        Property names, namespaces and abbreviations
  types             How literals are converted and compared
  filtering         Applying several filters one after another

QUICK REFERENCE

  length < 65535
  "focal len" == 55 && filename contains "asc"
  (exif.iso >= 800 || fits.exptime > 30) && filename endswith .raw

Run 'fq doc <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<&'static str, CliError> {
    match DocTopic::from_name(name) {
        Some(DocTopic::Syntax) => Ok(SYNTAX_DOC),
        Some(DocTopic::Operators) => Ok(OPERATORS_DOC),
        Some(DocTopic::Properties) => Ok(PROPERTIES_DOC),
        Some(DocTopic::Types) => Ok(TYPES_DOC),
        Some(DocTopic::Filtering) => Ok(FILTERING_DOC),
        None => Err(CliError::UnknownTopic(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

A filter is a sequence of words separated by spaces:

  <property> <operator> <value>

Words are case-insensitive. Operators split words on their own, so
`length<100` is the same as `length < 100`.

QUOTING

Double quotes keep spaces, operator characters and parentheses together:

  "focal len" == 55
  filename contains "a && b"

An unterminated quote runs to the end of the filter.

GROUPING

Parentheses group conditions:

  (length < 100 || length > 1000) && filename endswith .txt

Without parentheses, operators have no precedence and chains nest to the
right:

  a < 1 && b > 2 || c == 3    is    (a < 1) && ((b > 2) || (c == 3))

ERRORS

Errors repeat the filter and point at the offending word:

  Invalid operator: is
  length is 4
         ^
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

COMPARISON

  ==   equal
  !=   not equal
  <    less than
  <=   less than or equal
  >    greater than
  >=   greater than or equal

STRING (case-insensitive, text properties only)

  startswith   filename startswith img_
  endswith     filename endswith .jpg
  contains     filename contains vacation

LOGICAL

  &&   both conditions hold
  ||   either condition holds

A boolean property on its own is a condition:

  hidden && length > 0

MISSING PROPERTIES

A record that lacks any property named in the filter never matches, even
when the property only appears on one side of ||.
"#;

const PROPERTIES_DOC: &str = r#"PROPERTIES

Properties are grouped in namespaces, written `namespace.name`:

  exif.iso
  fits.exptime

A short name is enough when only one namespace has it:

  iso >= 800

When several do, fq asks for the full name:

  Property 'width' exists in multiple directories: exif, png
  Please specify the desired directory like this: "exif.width"

Any unambiguous prefix works too:

  file contains asc      (filename)

Run 'fq properties [TEXT]' to list what your records carry.
"#;

const TYPES_DOC: &str = r#"TYPES

Every property has a type, taken from the first record that has a value
for it:

  String     text, compared case-insensitively
  Integer    whole numbers
  Float      decimal numbers
  DateTime   RFC 3339 strings in the input
  Boolean    true / false

The value on the right of an operator is converted to the property's type.
`55` is a number next to `length` and text next to `filename`.

Dates can be written as:

  2021-03-04
  "2021-03-04 10:30:00"
  2021-03-04T10:30:00
  2021-03-04T10:30:00+02:00

A date with a space in it must be quoted, like any other value with
spaces. A value that does not convert is an error:

  Invalid value: cannot convert 'big' to Integer
"#;

const FILTERING_DOC: &str = r#"FILTERING

`fq check` takes one or more filters. Each one narrows the result of the
ones before it:

  fq check -i photos.json 'length < 65535' 'filename contains asc'

is the same as

  fq check -i photos.json 'length < 65535 && filename contains asc'

DIRECTORIES

When every match is a directory, fq lists what those directories contain
instead, so a filter on a directory-level property finds its files:

  fq check -i photos.json 'album == summer'

OPTIONS

  --syntax-only   compile the filters, don't evaluate them
  --explain       also print null guards and earlier filters
  --json          print matching records as JSON
  --pretty        indent the JSON output
  --verbose       log parsing and compilation (or set RUST_LOG)
"#;
