//! Builds raw s-expressions out of the token stream.
//!
//! Words stay unresolved here; turning them into symbols and keywords needs
//! the namespace that is active at that point of the file, which only the
//! flattening pass in `parser` knows.

use super::lexer::{Lexer, Spanned, Token};
use crate::error::ReadError;
use crate::model::IntLiteral;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Word(String),
    Str(String),
    Int(IntLiteral),
    /// Elements and the line of the opening parenthesis.
    List(Vec<Sexp>, usize),
}

pub fn read_all(src: &str) -> Result<Vec<Sexp>, ReadError> {
    let mut stack: Vec<(Vec<Sexp>, usize)> = Vec::new();
    let mut top = Vec::new();

    for tok in Lexer::new(src) {
        let Spanned { token, line } = tok.map_err(|e| ReadError::Lex {
            line: e.line,
            message: e.message,
        })?;

        let done = match token {
            Token::Open => {
                stack.push((Vec::new(), line));
                continue;
            }
            Token::Close => {
                let (items, start) = stack.pop().ok_or(ReadError::UnexpectedClose { line })?;
                Sexp::List(items, start)
            }
            Token::Str(s) => Sexp::Str(s),
            Token::Int(n) => Sexp::Int(n),
            Token::Word(w) => Sexp::Word(w),
        };

        match stack.last_mut() {
            Some((items, _)) => items.push(done),
            None if matches!(done, Sexp::List(..)) => top.push(done),
            None => return Err(ReadError::NotADirective { line }),
        }
    }

    if let Some((_, line)) = stack.pop() {
        return Err(ReadError::Unclosed { line });
    }
    Ok(top)
}
