use num_bigint::BigInt;

use crate::value::{RuntimeError, RuntimeErrorCode};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(i64),
    BigNumber(BigInt),
    Float(f64),
    Str(String),
    Ident(String),
    Def,
    Class,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Try,
    Except,
    Finally,
    Raise,
    Pass,
    Break,
    Continue,
    Lambda,
    Import,
    Del,
    And,
    Or,
    Not,
    As,
    True,
    False,
    NoneKw,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Assign,
    EqEq,
    BangEq,
    Lt,
    Lte,
    Gt,
    Gte,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Newline,
    Indent,
    Dedent,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
}

fn keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "def" => TokenKind::Def,
        "class" => TokenKind::Class,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "try" => TokenKind::Try,
        "except" => TokenKind::Except,
        "finally" => TokenKind::Finally,
        "raise" => TokenKind::Raise,
        "pass" => TokenKind::Pass,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "lambda" => TokenKind::Lambda,
        "import" => TokenKind::Import,
        "del" => TokenKind::Del,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "as" => TokenKind::As,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::NoneKw,
        _ => return None,
    };
    Some(kind)
}

pub(crate) struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    /// Indentation widths of the currently open blocks. Always starts at 0.
    indent_stack: Vec<usize>,
    /// Newlines inside `(...)` / `[...]` are insignificant.
    bracket_depth: usize,
    at_line_start: bool,
}

impl Lexer {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>, code: RuntimeErrorCode) -> RuntimeError {
        RuntimeError::with_location(message, code, self.line)
    }

    /// Measure the indentation of the line starting at `self.pos`, consuming
    /// the whitespace. A tab advances to the next multiple of 8 columns.
    fn measure_indent(&mut self) -> usize {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                _ => break,
            }
            self.pos += 1;
        }
        width
    }

    fn handle_line_start(&mut self, tokens: &mut Vec<Token>) -> Result<(), RuntimeError> {
        let width = self.measure_indent();
        // Blank and comment-only lines do not affect indentation.
        match self.peek() {
            None => return Ok(()),
            Some('\n') => {
                self.pos += 1;
                self.line += 1;
                return Ok(());
            }
            Some('#') => {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        self.line += 1;
                        break;
                    }
                }
                return Ok(());
            }
            _ => {}
        }
        let current = *self.indent_stack.last().unwrap_or(&0);
        if width > current {
            self.indent_stack.push(width);
            tokens.push(Token {
                kind: TokenKind::Indent,
                line: self.line,
            });
        } else if width < current {
            while let Some(&top) = self.indent_stack.last() {
                if top <= width {
                    break;
                }
                self.indent_stack.pop();
                tokens.push(Token {
                    kind: TokenKind::Dedent,
                    line: self.line,
                });
            }
            if *self.indent_stack.last().unwrap_or(&0) != width {
                return Err(self.error(
                    "unindent does not match any outer indentation level",
                    RuntimeErrorCode::ParseIndent,
                ));
            }
        }
        self.at_line_start = false;
        Ok(())
    }

    fn lex_number(&mut self) -> Result<TokenKind, RuntimeError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let is_float = self.peek() == Some('.')
            && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit());
        if is_float {
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let text: String = self.src[start..self.pos].iter().collect();
            let f = text
                .parse::<f64>()
                .map_err(|_| self.error("invalid float literal", RuntimeErrorCode::ParseUnexpected))?;
            return Ok(TokenKind::Float(f));
        }
        let text: String = self.src[start..self.pos].iter().collect();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(TokenKind::Number(n));
        }
        match text.parse::<BigInt>() {
            Ok(n) => Ok(TokenKind::BigNumber(n)),
            Err(_) => Err(self.error("invalid integer literal", RuntimeErrorCode::ParseUnexpected)),
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<TokenKind, RuntimeError> {
        let mut out = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(self.error(
                        "unterminated string literal",
                        RuntimeErrorCode::ParseUnexpected,
                    ));
                }
                Some('\\') => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some('x') => {
                        let hi = self.advance();
                        let lo = self.advance();
                        let (Some(hi), Some(lo)) = (hi, lo) else {
                            return Err(self.error(
                                "truncated \\x escape",
                                RuntimeErrorCode::ParseUnexpected,
                            ));
                        };
                        let code = u32::from_str_radix(&format!("{}{}", hi, lo), 16).map_err(
                            |_| self.error("invalid \\x escape", RuntimeErrorCode::ParseUnexpected),
                        )?;
                        match char::from_u32(code) {
                            Some(c) => out.push(c),
                            None => {
                                return Err(self.error(
                                    "invalid \\x escape",
                                    RuntimeErrorCode::ParseUnexpected,
                                ));
                            }
                        }
                    }
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => {
                        return Err(self.error(
                            "unterminated string literal",
                            RuntimeErrorCode::ParseUnexpected,
                        ));
                    }
                },
                Some(c) if c == quote => break,
                Some(c) => out.push(c),
            }
        }
        Ok(TokenKind::Str(out))
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, RuntimeError> {
        let mut tokens = Vec::new();
        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                if self.peek().is_none() {
                    break;
                }
                self.handle_line_start(&mut tokens)?;
                if self.at_line_start {
                    // The line turned out to be blank; start over.
                    continue;
                }
            }
            let Some(c) = self.peek() else {
                break;
            };
            match c {
                ' ' | '\t' => {
                    self.pos += 1;
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    if self.bracket_depth == 0 {
                        tokens.push(Token {
                            kind: TokenKind::Newline,
                            line: self.line - 1,
                        });
                        self.at_line_start = true;
                    }
                }
                '\r' => {
                    self.pos += 1;
                }
                '\'' | '"' => {
                    self.pos += 1;
                    let kind = self.lex_string(c)?;
                    tokens.push(Token {
                        kind,
                        line: self.line,
                    });
                }
                c if c.is_ascii_digit() => {
                    let kind = self.lex_number()?;
                    tokens.push(Token {
                        kind,
                        line: self.line,
                    });
                }
                c if c.is_alphabetic() || c == '_' => {
                    let start = self.pos;
                    while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                        self.pos += 1;
                    }
                    let ident: String = self.src[start..self.pos].iter().collect();
                    let kind = keyword(&ident).unwrap_or(TokenKind::Ident(ident));
                    tokens.push(Token {
                        kind,
                        line: self.line,
                    });
                }
                _ => {
                    let kind = self.lex_operator()?;
                    tokens.push(Token {
                        kind,
                        line: self.line,
                    });
                }
            }
        }
        if !self.at_line_start {
            tokens.push(Token {
                kind: TokenKind::Newline,
                line: self.line,
            });
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token {
                kind: TokenKind::Dedent,
                line: self.line,
            });
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            line: self.line,
        });
        Ok(tokens)
    }

    fn lex_operator(&mut self) -> Result<TokenKind, RuntimeError> {
        let c = self.advance().unwrap_or('\0');
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => {
                if self.peek() == Some('*') {
                    self.pos += 1;
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    self.pos += 1;
                    TokenKind::SlashSlash
                } else {
                    TokenKind::Slash
                }
            }
            '%' => TokenKind::Percent,
            '=' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    TokenKind::BangEq
                } else {
                    return Err(self.error(
                        "unexpected character '!'",
                        RuntimeErrorCode::ParseUnexpected,
                    ));
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '(' => {
                self.bracket_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                TokenKind::RParen
            }
            '[' => {
                self.bracket_depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                TokenKind::RBracket
            }
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            other => {
                return Err(self.error(
                    format!("unexpected character '{}'", other),
                    RuntimeErrorCode::ParseUnexpected,
                ));
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, TokenKind};

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn indent_and_dedent_tokens() {
        let got = kinds("if x:\n    pass\ny = 1\n");
        assert_eq!(
            got,
            vec![
                TokenKind::If,
                TokenKind::Ident("x".to_string()),
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Pass,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Ident("y".to_string()),
                TokenKind::Assign,
                TokenKind::Number(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn blank_lines_and_comments_do_not_dedent() {
        let got = kinds("while x:\n    a = 1\n\n    # note\n    b = 2\n");
        let dedents = got
            .iter()
            .filter(|k| matches!(k, TokenKind::Dedent))
            .count();
        assert_eq!(dedents, 1);
    }

    #[test]
    fn newlines_inside_brackets_are_suppressed() {
        let got = kinds("t = (1,\n     2)\n");
        let newlines = got
            .iter()
            .filter(|k| matches!(k, TokenKind::Newline))
            .count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn big_integer_literals_promote() {
        let got = kinds("10000000000000000000000\n");
        assert!(matches!(got[0], TokenKind::BigNumber(_)));
    }

    #[test]
    fn string_escapes() {
        let got = kinds("'a\\nb'\n");
        assert_eq!(got[0], TokenKind::Str("a\nb".to_string()));
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        let err = Lexer::new("if x:\n        pass\n  pass\n")
            .tokenize()
            .unwrap_err();
        assert!(err.code.map(|c| c.is_parse()).unwrap_or(false));
    }
}
