use std::fmt;

/// A piece of filter text.
///
/// Column names, operators, literals and the grouping parentheses all come
/// out of the lexer as tokens; meaning is assigned by the parser.
///
/// # Examples
/// ```text
/// "focal len" == 55
/// ^           ^  ^
/// 0 (quoted)  12 15
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lower-cased token text, without surrounding quotes
    pub text: String,

    /// Character offset in the trimmed command
    pub position: usize,

    /// Whether the text was written between double quotes
    pub quoted: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, position: usize, quoted: bool) -> Self {
        Token {
            text: text.into(),
            position,
            quoted,
        }
    }

    /// An unquoted `(` or `)`
    pub fn is_paren(&self, paren: char) -> bool {
        !self.quoted && self.text.len() == 1 && self.text.starts_with(paren)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "{}:\"{}\"", self.position, self.text)
        } else {
            write!(f, "{}:{}", self.position, self.text)
        }
    }
}

/// The tokens of one command, plus the command itself so errors can point
/// back into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    command: String,
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Drops blank tokens and orders the rest by position.
    pub fn new(command: impl Into<String>, mut tokens: Vec<Token>) -> Self {
        tokens.retain(|token| !token.text.trim().is_empty());
        tokens.sort_by_key(|token| token.position);
        TokenStream {
            command: command.into(),
            tokens,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token texts, mostly for tests and `fq tokens`
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
