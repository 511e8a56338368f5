//! Small hand-written lexer for specification files.
//
//  Lexical items:
//
//      Open     ::= '('
//      Close    ::= ')'
//      Str      ::= '"' ( [^"\\] | '\\' . )* '"'
//      Int      ::= [+-]? [1-9][0-9]*  |  [+-]? '0' [0-7]*  |  [+-]? '0x' [0-9a-fA-F]+
//      Word     ::= any run of characters that is not whitespace, '(', ')', '"' or ';'
//
//  Whitespace and comments (';' until end of line) are discarded. Words are
//  classified into symbols and keywords by the reader. Integers follow C's
//  radix rules and must fit in i64 or u64.

use std::iter::Peekable;
use std::str::Chars;

use crate::model::IntLiteral;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    Str(String),
    Int(IntLiteral),
    Word(String),
}

/// A token plus the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else if c == ';' {
                while let Some(c) = self.next_char() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn error(&self, line: usize, message: impl Into<String>) -> LexError {
        LexError {
            line,
            message: message.into(),
        }
    }

    fn read_string(&mut self, start: usize) -> Result<String, LexError> {
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            match c {
                '"' => return Ok(txt),
                '\\' => match self.next_char() {
                    Some('n') => txt.push('\n'),
                    Some('t') => txt.push('\t'),
                    Some(other) => txt.push(other),
                    None => break,
                },
                c => txt.push(c),
            }
        }
        Err(self.error(start, "string literal is never closed"))
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        self.consume_while(is_word_char, &mut word);
        word
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';')
}

/// Numbers are words that parse as integers; anything else stays a word.
fn parse_int(word: &str) -> Option<i128> {
    let (negative, digits) = match word.as_bytes().first()? {
        b'-' => (true, &word[1..]),
        b'+' => (false, &word[1..]),
        _ => (false, word),
    };
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    (i128::from(i64::MIN)..=i128::from(u64::MAX))
        .contains(&value)
        .then_some(value)
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        let line = self.line;
        let ch = self.next_char()?;

        let tok_res = match ch {
            '(' => Ok(Token::Open),
            ')' => Ok(Token::Close),
            '"' => self.read_string(line).map(Token::Str),
            c => {
                let word = self.read_word(c);
                let looks_numeric = word
                    .trim_start_matches(['-', '+'])
                    .starts_with(|c: char| c.is_ascii_digit());
                match parse_int(&word) {
                    Some(value) => Ok(Token::Int(IntLiteral { value, text: word })),
                    None if looks_numeric => {
                        Err(self.error(line, format!("malformed integer `{word}`")))
                    }
                    None => Ok(Token::Word(word)),
                }
            }
        };

        Some(tok_res.map(|token| Spanned { token, line }))
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};
    use crate::model::IntLiteral;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::new(src)
            .map(|t| t.map(|s| s.token))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                "(include \"stdio.h\")",
                vec![
                    Token::Open,
                    Token::Word("include".into()),
                    Token::Str("stdio.h".into()),
                    Token::Close,
                ],
            ),
            (
                "(slot \"s\" :count 16 :type :int) ; trailing comment",
                vec![
                    Token::Open,
                    Token::Word("slot".into()),
                    Token::Str("s".into()),
                    Token::Word(":count".into()),
                    Token::Int(IntLiteral::from(16)),
                    Token::Word(":type".into()),
                    Token::Word(":int".into()),
                    Token::Close,
                ],
            ),
            (
                "-3 0x1F +eagain+ posix::time-t",
                vec![
                    Token::Int(IntLiteral::from(-3)),
                    Token::Int(IntLiteral {
                        value: 31,
                        text: "0x1F".into(),
                    }),
                    Token::Word("+eagain+".into()),
                    Token::Word("posix::time-t".into()),
                ],
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(tokens(src), expected);
        }
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            tokens(r#""a \"quoted\" \\ word\n""#),
            vec![Token::Str("a \"quoted\" \\ word\n".into())]
        );
    }

    #[test]
    fn lines_are_tracked_across_comments() {
        let spanned: Vec<_> = Lexer::new("; header\n(c\n \"x\")")
            .collect::<Result<_, _>>()
            .unwrap();
        let lines: Vec<_> = spanned.iter().map(|s| s.line).collect();
        assert_eq!(lines, [2, 2, 3, 3]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("(c \"open").find_map(Result::err).unwrap();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn bad_number_is_an_error() {
        let err = Lexer::new("12abc").find_map(Result::err).unwrap();
        assert!(err.message.contains("12abc"));
        let err = Lexer::new("0678").find_map(Result::err).unwrap();
        assert!(err.message.contains("0678"));
    }

    #[test]
    fn integers_keep_their_spelling_and_c_value() {
        let ints: Vec<_> = tokens("0644 0 0xFFFFFFFFFFFFFFFF -9223372036854775808")
            .into_iter()
            .map(|t| match t {
                Token::Int(lit) => (lit.value, lit.text),
                other => panic!("expected an integer, got {other:?}"),
            })
            .collect();
        assert_eq!(
            ints,
            [
                (0o644, "0644".to_string()),
                (0, "0".to_string()),
                (u64::MAX.into(), "0xFFFFFFFFFFFFFFFF".to_string()),
                (i64::MIN.into(), "-9223372036854775808".to_string()),
            ]
        );
    }

    #[test]
    fn integers_outside_64_bits_are_errors() {
        let err = Lexer::new("0x10000000000000000").find_map(Result::err).unwrap();
        assert!(err.message.contains("malformed integer"));
        assert!(Lexer::new("-9223372036854775809").any(|t| t.is_err()));
    }
}
