use crate::expression::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// `<namespace>.<path>`, namespace possibly empty: `a.b[0].c`, `.O[0]`.
    Variable(String),
    Number(f64),
    /// Function-call names.
    Ident(String),
    If,
    Else,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Assign,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    EqEq,
    Ne,

    Eof,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_path_byte(b: u8) -> bool {
    is_word_byte(b) || matches!(b, b'[' | b']' | b'.')
}

fn is_path_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Line comment: `//` up to (not including) the newline.
        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        let start = i;

        // Fraction-only number: .[0-9]+
        if c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            out.push(number_token(input, start, i)?);
            continue;
        }

        if is_word_byte(c) || (c == b'.' && bytes.get(i + 1).copied().is_some_and(is_path_start)) {
            let mut j = i;
            while j < bytes.len() && is_word_byte(bytes[j]) {
                j += 1;
            }
            let prefix = &input[start..j];

            // Variable: [A-Za-z_0-9]*\.[A-Za-z_][A-Za-z_0-9\[\].]*
            if bytes.get(j) == Some(&b'.') && bytes.get(j + 1).copied().is_some_and(is_path_start) {
                i = j + 1;
                while i < bytes.len() && is_path_byte(bytes[i]) {
                    i += 1;
                }
                out.push(Token {
                    kind: TokenKind::Variable(input[start..i].to_owned()),
                    span: Span { start, end: i },
                });
                continue;
            }

            // Number: [0-9]+(\.[0-9]+)?
            if prefix.bytes().all(|b| b.is_ascii_digit()) {
                i = j;
                if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                out.push(number_token(input, start, i)?);
                continue;
            }

            if prefix.as_bytes()[0].is_ascii_digit() {
                return Err(SyntaxError::new(
                    input,
                    start,
                    format!("invalid token \"{prefix}\""),
                ));
            }

            i = j;
            let kind = match prefix {
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                _ => TokenKind::Ident(prefix.to_owned()),
            };
            out.push(Token {
                kind,
                span: Span { start, end: i },
            });
            continue;
        }

        // Two-char operators
        if i + 1 < bytes.len() {
            let kind = match &bytes[i..i + 2] {
                b"==" => Some(TokenKind::EqEq),
                b"!=" => Some(TokenKind::Ne),
                _ => None,
            };
            if let Some(kind) = kind {
                i += 2;
                out.push(Token {
                    kind,
                    span: Span { start, end: i },
                });
                continue;
            }
        }

        // Single-char tokens
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'=' => TokenKind::Assign,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(SyntaxError::new(
                    input,
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        i += 1;
        out.push(Token {
            kind,
            span: Span { start, end: i },
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });

    Ok(out)
}

fn number_token(input: &str, start: usize, end: usize) -> Result<Token, SyntaxError> {
    let v: f64 = input[start..end]
        .parse()
        .map_err(|_| SyntaxError::new(input, start, "invalid number"))?;
    Ok(Token {
        kind: TokenKind::Number(v),
        span: Span { start, end },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/expression/lexer.rs"]
mod tests;
