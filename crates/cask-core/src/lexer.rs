//! Tokenizer for the cask manifest DSL.
//!
//! Only the subset of the syntax that manifests use is recognised: bare
//! identifiers, keyword arguments (`quit:`), symbols (`:no_check`), quoted
//! strings, array brackets, commas and line breaks. Comments are dropped.

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `version`, `do`, `end`, ...
    Ident(String),
    /// `quit:` (stored without the colon)
    Key(String),
    /// `:no_check` (stored without the colon)
    Symbol(String),
    /// A string literal with escapes processed and `#{...}` kept verbatim.
    Str(String),
    LBracket,
    RBracket,
    Comma,
    Newline,
    Eof,
}

impl TokenKind {
    /// Short description used in parse errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Key(s) => format!("'{s}:'"),
            Self::Symbol(s) => format!("':{s}'"),
            Self::Str(_) => "a string".to_string(),
            Self::LBracket => "'['".to_string(),
            Self::RBracket => "']'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Newline => "end of line".to_string(),
            Self::Eof => "end of file".to_string(),
        }
    }
}

/// A token and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
}

/// A lexical error with its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub(crate) line: usize,
    pub(crate) message: String,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '?' || c == '!'
}

/// Split manifest text into tokens. The result always ends with `Eof`.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '\n' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Newline,
                    line,
                });
                line += 1;
            }
            '#' => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '"' | '\'' => {
                let start = line;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some(ch) = chars.next() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    if ch == '\n' {
                        line += 1;
                    }
                    if ch == '\\' && c == '"' {
                        match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(other) => {
                                if other == '\n' {
                                    line += 1;
                                }
                                value.push(other);
                            }
                            None => break,
                        }
                        continue;
                    }
                    value.push(ch);
                }
                if !closed {
                    return Err(LexError {
                        line: start,
                        message: "unterminated string literal".to_string(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    line: start,
                });
            }
            ':' => {
                chars.next();
                let mut name = String::new();
                while let Some(&ch) = chars.peek() {
                    if name.is_empty() && !is_ident_start(ch) {
                        break;
                    }
                    if !is_ident_continue(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(LexError {
                        line,
                        message: "expected symbol name after ':'".to_string(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Symbol(name),
                    line,
                });
            }
            '[' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::LBracket,
                    line,
                });
            }
            ']' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::RBracket,
                    line,
                });
            }
            ',' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    line,
                });
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&ch) = chars.peek() {
                    if !is_ident_continue(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                }
                // `quit:` is a keyword argument, `quit::X` is not
                let kind = if chars.peek() == Some(&':') {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&':') {
                        TokenKind::Ident(name)
                    } else {
                        chars.next();
                        TokenKind::Key(name)
                    }
                } else {
                    TokenKind::Ident(name)
                };
                tokens.push(Token { kind, line });
            }
            other => {
                return Err(LexError {
                    line,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
    });
    Ok(tokens)
}
