use super::Column;

/// Token classes produced by the lexer, in match-priority order.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    FloatExp,
    FloatPlain,
    Int,
    Remark,
    Ident,
    String,
    Relational,
    Operator,
    CatchAll,
    EndOfLine,
}

/// A lexed token. Produced transiently while parsing a line; the
/// parser never retains them past the statement they belong to.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub column: Column,
}

impl Token {
    pub fn new(text: String, kind: TokenKind, column: Column) -> Token {
        Token { text, kind, column }
    }

    pub fn is_eol(&self) -> bool {
        self.kind == TokenKind::EndOfLine
    }

    /// Numeric literal in any of the three number classes.
    pub fn is_number(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::FloatExp | TokenKind::FloatPlain | TokenKind::Int
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            TokenKind::EndOfLine => Ok(()),
            _ => write!(f, "{}", self.text),
        }
    }
}
