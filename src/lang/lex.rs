use super::options::BasicOptions;
use super::token::{Token, TokenKind};

/// Lex one source line into tokens. The trailing `EndOfLine` token is
/// always present so the parser never runs off the end.
pub fn lex(line: &str, options: &BasicOptions) -> Vec<Token> {
    Lexer::lex(line, options)
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

const SINGLE_OPERATORS: &str = "+-*/^\\%()=<>,;:";

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    pos: usize,
    remark: bool,
    options: &'a BasicOptions,
}

impl<'a> Lexer<'a> {
    fn lex(line: &str, options: &BasicOptions) -> Vec<Token> {
        let mut lexer = Lexer {
            chars: line.chars().peekable(),
            pos: 0,
            remark: false,
            options,
        };
        let mut tokens: Vec<Token> = vec![];
        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }
        let end = lexer.pos;
        tokens.push(Token::new(String::new(), TokenKind::EndOfLine, end..end));
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += 1;
        Some(c)
    }

    fn next_token(&mut self) -> Option<Token> {
        if self.remark {
            return self.rest_as_remark();
        }
        loop {
            let pk = *self.chars.peek()?;
            if is_basic_whitespace(pk) {
                self.advance();
                continue;
            }
            if is_basic_digit(pk) || pk == '.' {
                return Some(self.number());
            }
            if is_basic_alphabetic(pk) {
                return Some(self.ident());
            }
            if pk == '"' {
                return Some(self.string());
            }
            if pk == '\'' && self.options.tick_comments {
                self.advance();
                return self.rest_as_remark().or_else(|| {
                    let end = self.pos;
                    Some(Token::new(String::new(), TokenKind::Remark, end..end))
                });
            }
            return Some(self.minutia());
        }
    }

    /// Exponent float, plain float, or integer, in that priority.
    fn number(&mut self) -> Token {
        let start = self.pos;
        let mut s = String::new();
        let mut decimal = false;
        let mut exp = false;
        while let Some(&pk) = self.chars.peek() {
            if is_basic_digit(pk) {
                s.push(pk);
            } else if pk == '.' && !decimal && !exp {
                decimal = true;
                s.push(pk);
            } else if (pk == 'E' || pk == 'e') && !exp && s.chars().any(is_basic_digit) {
                // Only an exponent if digits or a sign follow.
                let mut ahead = self.chars.clone();
                ahead.next();
                match ahead.peek() {
                    Some(&c) if is_basic_digit(c) || c == '+' || c == '-' => {
                        exp = true;
                        self.advance();
                        s.push('E');
                        if let Some(&sign) = self.chars.peek() {
                            if sign == '+' || sign == '-' {
                                self.advance();
                                s.push(sign);
                            }
                        }
                        continue;
                    }
                    _ => break,
                }
            } else {
                break;
            }
            self.advance();
        }
        let kind = if s == "." {
            TokenKind::CatchAll
        } else if exp {
            TokenKind::FloatExp
        } else if decimal {
            TokenKind::FloatPlain
        } else {
            TokenKind::Int
        };
        Token::new(s, kind, start..self.pos)
    }

    /// Letters and digits with an optional trailing `$`, folded to
    /// uppercase. A `REM` identifier swallows the rest of the line.
    fn ident(&mut self) -> Token {
        let start = self.pos;
        let mut s = String::new();
        while let Some(&pk) = self.chars.peek() {
            if is_basic_alphabetic(pk) || is_basic_digit(pk) {
                s.push(pk.to_ascii_uppercase());
                self.advance();
            } else if pk == '$' {
                s.push(pk);
                self.advance();
                break;
            } else {
                break;
            }
        }
        if s == "REM" {
            self.remark = true;
        }
        Token::new(s, TokenKind::Ident, start..self.pos)
    }

    fn string(&mut self) -> Token {
        let start = self.pos;
        let mut s = String::new();
        self.advance();
        loop {
            match self.advance() {
                Some('"') | None => break,
                Some(c) => {
                    if self.options.uppercase_only {
                        s.push(c.to_ascii_uppercase());
                    } else {
                        s.push(c);
                    }
                }
            }
        }
        Token::new(s, TokenKind::String, start..self.pos)
    }

    fn rest_as_remark(&mut self) -> Option<Token> {
        self.chars.peek()?;
        let start = self.pos;
        let mut s = String::new();
        while let Some(c) = self.advance() {
            if self.options.uppercase_only {
                s.push(c.to_ascii_uppercase());
            } else {
                s.push(c);
            }
        }
        Some(Token::new(s, TokenKind::Remark, start..self.pos))
    }

    /// Two-character relationals, single-character operators and
    /// punctuation, or the catch-all that the parser reports later.
    fn minutia(&mut self) -> Token {
        let start = self.pos;
        let c = self.advance().unwrap_or(' ');
        if c == '<' || c == '>' || c == '=' {
            if let Some(&pk) = self.chars.peek() {
                let pair = match (c, pk) {
                    ('<', '=') => Some("<="),
                    ('<', '>') => Some("<>"),
                    ('>', '=') => Some(">="),
                    _ => None,
                };
                if let Some(pair) = pair {
                    self.advance();
                    return Token::new(pair.to_string(), TokenKind::Relational, start..self.pos);
                }
            }
        }
        if SINGLE_OPERATORS.contains(c) {
            return Token::new(c.to_string(), TokenKind::Operator, start..self.pos);
        }
        Token::new(c.to_string(), TokenKind::CatchAll, start..self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        lex(s, &BasicOptions::altair())
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_number_classes() {
        use TokenKind::*;
        assert_eq!(kinds("10"), vec![Int, EndOfLine]);
        assert_eq!(kinds("1.5"), vec![FloatPlain, EndOfLine]);
        assert_eq!(kinds(".5"), vec![FloatPlain, EndOfLine]);
        assert_eq!(kinds("1E5"), vec![FloatExp, EndOfLine]);
        assert_eq!(kinds("1.5e-3"), vec![FloatExp, EndOfLine]);
    }

    #[test]
    fn test_exponent_needs_digits() {
        // E followed by a letter is an identifier boundary, not an
        // exponent marker.
        let tokens = lex("2EF", &BasicOptions::altair());
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].text, "EF");
    }

    #[test]
    fn test_ident_folds_uppercase() {
        let tokens = lex("print a$", &BasicOptions::altair());
        assert_eq!(tokens[0].text, "PRINT");
        assert_eq!(tokens[1].text, "A$");
        assert_eq!(tokens[1].column, 6..8);
    }

    #[test]
    fn test_string_preserves_case_unless_dialect_folds() {
        let tokens = lex("\"Hello\"", &BasicOptions::altair());
        assert_eq!(tokens[0].text, "Hello");
        let tokens = lex("\"Hello\"", &BasicOptions::ecma55());
        assert_eq!(tokens[0].text, "HELLO");
    }

    #[test]
    fn test_relational_pairs() {
        let tokens = lex("a<=b<>c", &BasicOptions::altair());
        assert_eq!(tokens[1].text, "<=");
        assert_eq!(tokens[1].kind, TokenKind::Relational);
        assert_eq!(tokens[3].text, "<>");
    }

    #[test]
    fn test_rem_swallows_line() {
        let tokens = lex("10 REM anything : goes", &BasicOptions::altair());
        assert_eq!(tokens[1].text, "REM");
        assert_eq!(tokens[2].kind, TokenKind::Remark);
        assert_eq!(tokens[3].kind, TokenKind::EndOfLine);
    }

    #[test]
    fn test_tick_comment_is_dialect_gated() {
        let tokens = lex("' note", &BasicOptions::altair());
        assert_eq!(tokens[0].kind, TokenKind::Remark);
        let tokens = lex("' note", &BasicOptions::ecma55());
        assert_eq!(tokens[0].kind, TokenKind::CatchAll);
    }

    #[test]
    fn test_catch_all() {
        let tokens = lex("10 @", &BasicOptions::altair());
        assert_eq!(tokens[1].kind, TokenKind::CatchAll);
        assert_eq!(tokens[1].text, "@");
    }
}
