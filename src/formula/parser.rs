use super::lexer::Token;
use crate::ast::Expression;
use crate::error::FormulaError;

/// Precedence-climbing parser over a token stream.
///
/// Nesting (parentheses and unary signs) is counted against `max_depth`.
pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Parses the whole token stream into a single expression.
    pub(crate) fn parse(mut self) -> Result<Expression, FormulaError> {
        let expr = self.parse_expression(0)?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expression, FormulaError> {
        let mut lhs = self.parse_unary()?;

        while let Some(precedence) = self.tokens.get(self.pos).and_then(binary_precedence) {
            if precedence < min_precedence {
                break;
            }
            let operator = self.tokens[self.pos].clone();
            self.pos += 1;
            let rhs = self.parse_expression(precedence + 1)?;
            lhs = match operator {
                Token::Plus => Expression::Add(Box::new(lhs), Box::new(rhs)),
                Token::Minus => Expression::Subtract(Box::new(lhs), Box::new(rhs)),
                Token::Star => Expression::Multiply(Box::new(lhs), Box::new(rhs)),
                Token::Slash => Expression::Divide(Box::new(lhs), Box::new(rhs)),
                other => return Err(self.unexpected(&other)),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, FormulaError> {
        match self.tokens.get(self.pos) {
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(Expression::Negate(Box::new(operand)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(operand)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, FormulaError> {
        let token = self.tokens.get(self.pos).ok_or(FormulaError::UnexpectedEnd)?;
        self.pos += 1;
        match token {
            Token::Number(n) => Ok(Expression::Literal(*n)),
            Token::Placeholder(name) => Ok(Expression::Placeholder(name.clone())),
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_expression(0)?;
                match self.tokens.get(self.pos) {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        self.depth -= 1;
                        Ok(inner)
                    }
                    Some(other) => Err(self.unexpected(other)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                position: self.pos - 1,
            }),
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn unexpected(&self, token: &Token) -> FormulaError {
        FormulaError::UnexpectedToken {
            found: token.to_string(),
            position: self.pos,
        }
    }
}

fn binary_precedence(token: &Token) -> Option<u8> {
    match token {
        Token::Plus | Token::Minus => Some(1),
        Token::Star | Token::Slash => Some(2),
        _ => None,
    }
}
