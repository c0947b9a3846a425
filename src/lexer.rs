use crate::ast::{Token, TokenStream};

/// Characters that make up operator runs (`&&`, `<=`, `!=` ...)
const OPERATOR_CHARS: &[char] = &['<', '>', '=', '&', '|', '!'];

/// Splits a filter command into tokens.
///
/// The lexer never fails: anything it cannot classify is handed to the
/// parser as a word, which reports it with a position.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    buffer: String,
    start: usize,
    in_quotes: bool,
    in_operator: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.trim().chars().collect(),
            position: 0,
            buffer: String::new(),
            start: 0,
            in_quotes: false,
            in_operator: false,
            tokens: Vec::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Appends to the buffer, remembering where the token began.
    fn push(&mut self, ch: char) {
        if self.buffer.is_empty() && !self.in_quotes {
            self.start = self.position;
        }
        self.buffer.extend(ch.to_lowercase());
    }

    fn flush(&mut self, quoted: bool) {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            self.tokens.push(Token::new(text, self.start, quoted));
        }
    }

    fn read_quote(&mut self) {
        if self.in_quotes {
            self.flush(true);
            self.in_quotes = false;
        } else {
            self.flush(false);
            self.in_quotes = true;
            self.start = self.position;
        }
        self.in_operator = false;
    }

    fn read_paren(&mut self, paren: char) {
        self.flush(false);
        self.tokens.push(Token::new(paren, self.position, false));
        self.in_operator = false;
    }

    fn read_char(&mut self, ch: char) {
        let operator = OPERATOR_CHARS.contains(&ch);
        if operator != self.in_operator {
            self.flush(false);
            self.in_operator = operator;
        }
        self.push(ch);
    }

    /// Consumes the lexer and returns every token in the command.
    pub fn tokenize(mut self) -> TokenStream {
        while let Some(ch) = self.current_char() {
            match ch {
                '"' => self.read_quote(),
                _ if self.in_quotes => self.push(ch),
                '(' | ')' => self.read_paren(ch),
                c if c.is_whitespace() => {
                    self.flush(false);
                    self.in_operator = false;
                }
                _ => self.read_char(ch),
            }
            self.advance();
        }

        // an unterminated quote still yields its text
        let quoted = self.in_quotes;
        self.flush(quoted);

        let command: String = self.input.iter().collect();
        TokenStream::new(command, self.tokens)
    }
}

/// Tokenizes a filter command.
///
/// # Examples
///
/// ```
/// use fquery::tokenize;
///
/// let stream = tokenize("\"Focal Len\" == 55 && filename contains asc");
/// assert_eq!(
///     stream.texts(),
///     vec!["focal len", "==", "55", "&&", "filename", "contains", "asc"]
/// );
/// ```
pub fn tokenize(command: &str) -> TokenStream {
    Lexer::new(command).tokenize()
}

#[test]
fn test_operator_runs_split_words() {
    let stream = tokenize("a<1&&b!=2");
    assert_eq!(stream.texts(), vec!["a", "<", "1", "&&", "b", "!=", "2"]);
    let positions: Vec<_> = stream.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3, 5, 6, 8]);
}

#[test]
fn test_quoted_tokens() {
    let stream = tokenize("  \"Focal (Len)\" == \"a && b\"");
    let tokens = stream.tokens();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], Token::new("focal (len)", 0, true));
    assert_eq!(tokens[1], Token::new("==", 14, false));
    assert_eq!(tokens[2], Token::new("a && b", 17, true));
    assert_eq!(stream.command(), "\"Focal (Len)\" == \"a && b\"");
}

#[test]
fn test_parens_are_tokens() {
    let stream = tokenize("(a < 1)&&(b>2)");
    assert_eq!(
        stream.texts(),
        vec!["(", "a", "<", "1", ")", "&&", "(", "b", ">", "2", ")"]
    );
    assert!(stream.tokens()[0].is_paren('('));
}

#[test]
fn test_unterminated_quote() {
    let stream = tokenize("filename contains \"my file");
    let last = stream.tokens().last().unwrap();
    assert_eq!(last.text, "my file");
    assert!(last.quoted);
    assert_eq!(last.position, 18);
}

#[test]
fn test_blank_input() {
    assert!(tokenize("   ").is_empty());
    assert!(tokenize("\"\"").is_empty());
}
