use std::collections::HashMap;
use std::sync::Arc;

use crate::script::ast::{BinaryOp, Expr, FnDef, Lit, Program, Stmt, UnaryOp};
use crate::script::error::ParseError;
use crate::script::lexer::{Span, Token, TokenKind, lex};

/// Maximum syntactic nesting (blocks, parentheses, unary chains).
const MAX_NESTING: usize = 128;

/// One parsed page of app logic.
#[derive(Debug, Clone, Default)]
pub(crate) struct Page {
    pub(crate) functions: Vec<FnDef>,
    pub(crate) top_level: Vec<Stmt>,
}

pub(crate) fn parse_page(src: &str) -> Result<Page, ParseError> {
    let tokens = lex(src)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut page = Page::default();
    while p.peek().kind != TokenKind::Eof {
        if p.consume(TokenKind::Fn) {
            page.functions.push(p.parse_fn()?);
        } else {
            page.top_level.push(p.parse_stmt()?);
        }
    }
    Ok(page)
}

/// Fold pages into a single program; a function name may be defined only once.
pub(crate) fn link_pages(pages: Vec<(String, Page)>) -> Result<Program, String> {
    let mut functions: HashMap<String, Arc<FnDef>> = HashMap::new();
    let mut top_level = Vec::new();
    for (page_name, page) in pages {
        for f in page.functions {
            if functions.contains_key(&f.name) {
                return Err(format!(
                    "function '{}' redefined in page '{page_name}'",
                    f.name
                ));
            }
            functions.insert(f.name.clone(), Arc::new(f));
        }
        top_level.extend(page.top_level);
    }
    Ok(Program {
        functions,
        top_level,
    })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ParseError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Ident(s) => Ok(s),
            other => Err(ParseError::new(
                t.span.start,
                format!("expected identifier, found {other:?}"),
            )),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::new(self.span().start, "nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_fn(&mut self) -> Result<FnDef, ParseError> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.consume(TokenKind::RParen) {
            loop {
                let param = self.expect_ident()?;
                if params.contains(&param) {
                    return Err(ParseError::new(
                        self.span().start,
                        format!("duplicate parameter '{param}'"),
                    ));
                }
                params.push(param);
                if self.consume(TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        let body = self.parse_block()?;
        Ok(FnDef { name, params, body })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        self.enter()?;
        let mut out = Vec::new();
        while !self.consume(TokenKind::RBrace) {
            if self.peek().kind == TokenKind::Eof {
                return Err(ParseError::new(self.span().start, "unterminated block"));
            }
            if self.peek().kind == TokenKind::Fn {
                return Err(ParseError::new(
                    self.span().start,
                    "functions may only be declared at page level",
                ));
            }
            out.push(self.parse_stmt()?);
        }
        self.leave();
        Ok(out)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Let => {
                self.bump();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Let { name, value })
            }
            TokenKind::If => {
                self.bump();
                self.parse_if()
            }
            TokenKind::While => {
                self.bump();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_block()?;
                Ok(Stmt::While { cond, body })
            }
            TokenKind::Return => {
                self.bump();
                if self.consume(TokenKind::Semi) {
                    return Ok(Stmt::Return(None));
                }
                let e = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Return(Some(e)))
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Fn => Err(ParseError::new(
                self.span().start,
                "functions may only be declared at page level",
            )),
            _ => self.parse_expr_or_assign(),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then = self.parse_block()?;
        let otherwise = if self.consume(TokenKind::Else) {
            if self.consume(TokenKind::If) {
                self.enter()?;
                let nested = self.parse_if()?;
                self.leave();
                Some(vec![nested])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
        })
    }

    fn parse_expr_or_assign(&mut self) -> Result<Stmt, ParseError> {
        let start = self.span().start;
        // Fast path keeps `x = ...` from being parsed as an expression first.
        let simple_assign = matches!(
            (self.peek_kind_at(0), self.peek_kind_at(1)),
            (Some(TokenKind::Ident(_)), Some(TokenKind::Assign))
        );
        if simple_assign {
            let name = self.expect_ident()?;
            self.bump();
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semi)?;
            return Ok(Stmt::Assign { name, value });
        }

        let target = self.parse_expr()?;
        if self.consume(TokenKind::Assign) {
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semi)?;
            return match target {
                Expr::Index { base, index } => match *base {
                    Expr::Var(name) => Ok(Stmt::AssignIndex {
                        name,
                        index: *index,
                        value,
                    }),
                    _ => Err(ParseError::new(
                        start,
                        "indexed assignment target must be a variable",
                    )),
                },
                _ => Err(ParseError::new(start, "invalid assignment target")),
            };
        }
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Expr(target))
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let e = self.parse_or();
        self.leave();
        e
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_and()?;
        while self.consume(TokenKind::OrOr) {
            let r = self.parse_and()?;
            e = binary(BinaryOp::Or, e, r);
        }
        Ok(e)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_equality()?;
        while self.consume(TokenKind::AndAnd) {
            let r = self.parse_equality()?;
            e = binary(BinaryOp::And, e, r);
        }
        Ok(e)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_comparison()?;
        loop {
            let op = if self.consume(TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.consume(TokenKind::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.parse_comparison()?;
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_term()?;
        loop {
            let op = if self.consume(TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.consume(TokenKind::Le) {
                BinaryOp::Le
            } else if self.consume(TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.consume(TokenKind::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let r = self.parse_term()?;
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
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
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
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
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.consume(TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.consume(TokenKind::Bang) {
            UnaryOp::Not
        } else {
            return self.parse_postfix();
        };
        self.enter()?;
        let e = self.parse_unary();
        self.leave();
        Ok(Expr::Unary {
            op,
            expr: Box::new(e?),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_primary()?;

        loop {
            if self.peek().kind == TokenKind::LParen {
                let at = self.span().start;
                self.bump();
                let args = self.parse_args()?;
                let func = match e {
                    Expr::Var(name) => name,
                    _ => {
                        return Err(ParseError::new(at, "call target must be an identifier"));
                    }
                };
                e = Expr::Call { func, args };
                continue;
            }

            if self.consume(TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                e = Expr::Index {
                    base: Box::new(e),
                    index: Box::new(index),
                };
                continue;
            }

            break;
        }

        Ok(e)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Lit(Lit::Num(v))),
            TokenKind::Str(s) => Ok(Expr::Lit(Lit::Str(s))),
            TokenKind::True => Ok(Expr::Lit(Lit::Bool(true))),
            TokenKind::False => Ok(Expr::Lit(Lit::Bool(false))),
            TokenKind::Null => Ok(Expr::Lit(Lit::Null)),
            TokenKind::Ident(s) => Ok(Expr::Var(s)),
            TokenKind::LParen => {
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if self.consume(TokenKind::RBracket) {
                    return Ok(Expr::List(items));
                }
                loop {
                    items.push(self.parse_expr()?);
                    if self.consume(TokenKind::Comma) {
                        continue;
                    }
                    self.expect(TokenKind::RBracket)?;
                    return Ok(Expr::List(items));
                }
            }
            other => Err(ParseError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
