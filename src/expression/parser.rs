use crate::expression::ast::{
    Atom, BinaryOp, Condition, Expr, Program, Segment, Sentence, UnaryOp,
};
use crate::expression::error::SyntaxError;
use crate::expression::lexer::{Token, TokenKind, lex};

/// Deepest bracket, call or unary nesting a unit may use.
const MAX_NESTING: usize = 128;

/// Parse one compilation unit (`program := segment*`).
pub fn parse_program(src: &str) -> Result<Program, SyntaxError> {
    let tokens = lex(src)?;
    let mut p = Parser {
        src,
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut segments = Vec::new();
    while p.peek().kind != TokenKind::Eof {
        segments.push(p.parse_segment()?);
    }
    Ok(Program { segments })
}

/// Parse a standalone expression (the right-hand side of a sentence).
pub fn parse_expr(src: &str) -> Result<Expr, SyntaxError> {
    let tokens = lex(src)?;
    let mut p = Parser {
        src,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = p.parse_equality()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        // Eof is sticky.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.src, self.peek().span.start, message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected {kind:?}, found {:?}",
                self.peek().kind
            )))
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here(format!(
                "expression nested deeper than {MAX_NESTING} levels"
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_segment(&mut self) -> Result<Segment, SyntaxError> {
        if self.consume(TokenKind::If) {
            return Ok(Segment::Condition(self.parse_condition()?));
        }
        let sentence = self.parse_sentence()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Segment::Sentence(sentence))
    }

    fn parse_condition(&mut self) -> Result<Condition, SyntaxError> {
        let test = self.parse_equality()?;
        let then_block = self.parse_block()?;
        self.expect(TokenKind::Else)?;
        let else_block = self.parse_block()?;
        Ok(Condition {
            test,
            then_block,
            else_block,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Sentence>, SyntaxError> {
        self.expect(TokenKind::LBrace)?;
        let mut sentences = Vec::new();
        loop {
            if self.consume(TokenKind::RBrace) {
                return Ok(sentences);
            }
            sentences.push(self.parse_sentence()?);
            if self.consume(TokenKind::Semicolon) {
                continue;
            }
            self.expect(TokenKind::RBrace)?;
            return Ok(sentences);
        }
    }

    fn parse_sentence(&mut self) -> Result<Sentence, SyntaxError> {
        let target = match &self.peek().kind {
            TokenKind::Variable(v) => v.clone(),
            other => {
                return Err(self.error_here(format!(
                    "expected assignment target, found {other:?}"
                )));
            }
        };
        self.bump();
        self.expect(TokenKind::Assign)?;
        let value = self.parse_equality()?;
        Ok(Sentence { target, value })
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut e = self.parse_term()?;
        loop {
            let op = if self.consume(TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.consume(TokenKind::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.parse_term()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.consume(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = if self.consume(TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.consume(TokenKind::Plus) {
            UnaryOp::Pos
        } else {
            return self.parse_primary();
        };
        let e = self.nested(Self::parse_unary)?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(e),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Number(v) => {
                self.bump();
                Ok(Expr::Atom(Atom::Number(v)))
            }
            TokenKind::Variable(v) => {
                self.bump();
                Ok(Expr::Atom(Atom::Variable(v)))
            }
            TokenKind::Ident(func) => {
                self.bump();
                self.expect(TokenKind::LParen)?;
                let args = self.nested(Self::parse_args)?;
                Ok(Expr::Call { func, args })
            }
            TokenKind::LParen => {
                self.bump();
                let e = self.nested(Self::parse_equality)?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Brackets(Box::new(e)))
            }
            other => Err(self.error_here(format!("unexpected token {other:?}"))),
        }
    }

    // call := identifier '(' expr (',' expr)* ')'
    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        loop {
            args.push(self.parse_equality()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
