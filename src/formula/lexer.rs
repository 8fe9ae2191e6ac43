use crate::error::FormulaError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Placeholder(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Placeholder(name) => write!(f, "{{{}}}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits formula source into tokens, refusing anything outside the arithmetic grammar.
pub(crate) fn tokenize(source: &str, max_tokens: usize) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '+' => {
                chars.next();
                Token::Plus
            }
            '-' => {
                chars.next();
                Token::Minus
            }
            '*' => {
                chars.next();
                Token::Star
            }
            '/' => {
                chars.next();
                Token::Slash
            }
            '(' => {
                chars.next();
                Token::LParen
            }
            ')' => {
                chars.next();
                Token::RParen
            }
            '{' => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if !is_identifier_char(c) {
                        return Err(FormulaError::InvalidPlaceholder { offset });
                    }
                    name.push(c);
                }
                if !closed || name.is_empty() {
                    return Err(FormulaError::InvalidPlaceholder { offset });
                }
                Token::Placeholder(name)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                let mut seen_point = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        literal.push(c);
                    } else if c == '.' && !seen_point {
                        seen_point = true;
                        literal.push(c);
                    } else {
                        break;
                    }
                    chars.next();
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                Token::Number(value)
            }
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    found: other,
                    offset,
                });
            }
        };

        tokens.push(token);
        if tokens.len() > max_tokens {
            return Err(FormulaError::TooManyTokens { limit: max_tokens });
        }
    }

    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_formula() {
        let tokens = tokenize("({price} * 1.5) - .5", 64).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Placeholder("price".to_string()),
                Token::Star,
                Token::Number(1.5),
                Token::RParen,
                Token::Minus,
                Token::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_foreign_characters() {
        assert_eq!(
            tokenize("{a} ; drop", 64),
            Err(FormulaError::UnexpectedCharacter {
                found: ';',
                offset: 4
            })
        );
        assert_eq!(
            tokenize("{a b}", 64),
            Err(FormulaError::InvalidPlaceholder { offset: 0 })
        );
        assert_eq!(
            tokenize("1 + {open", 64),
            Err(FormulaError::InvalidPlaceholder { offset: 4 })
        );
        assert_eq!(tokenize("   ", 64), Err(FormulaError::Empty));
        assert_eq!(
            tokenize(".", 64),
            Err(FormulaError::InvalidNumber(".".to_string()))
        );
    }

    #[test]
    fn test_tokenize_enforces_token_limit() {
        assert_eq!(
            tokenize("1+1+1", 4),
            Err(FormulaError::TooManyTokens { limit: 4 })
        );
        assert!(tokenize("1+1+1", 5).is_ok());
    }
}
