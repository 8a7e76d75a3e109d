use super::{token::*, Error};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

fn is_rill_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_rill_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_rill_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_rill_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenizer over one source line. The compiler owns line advancement;
/// a drained lexer keeps returning `Token::Eol`.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(s: &'a str) -> Lexer<'a> {
        Lexer {
            chars: s.chars().peekable(),
        }
    }

    pub fn token(&mut self) -> Result<Token> {
        loop {
            match self.chars.peek() {
                None => return Ok(Token::Eol),
                Some(pk) if is_rill_whitespace(*pk) => {
                    self.chars.next();
                }
                Some(pk) if is_rill_name_start(*pk) => return self.name(),
                Some(pk) if is_rill_digit(*pk) => return self.number(),
                Some('"') => return self.string(),
                Some(_) => return self.minutia(),
            }
        }
    }

    fn name(&mut self) -> Result<Token> {
        let mut s = String::new();
        match self.chars.next() {
            Some(ch) => s.push(ch),
            None => return Ok(Token::Eol),
        }
        while let Some(pk) = self.chars.peek().copied() {
            if !is_rill_name(pk) {
                break;
            }
            s.push(pk);
            self.chars.next();
        }
        match Token::from_word(&s) {
            Some(token) => Ok(token),
            None => Ok(Token::Ident(s)),
        }
    }

    fn number(&mut self) -> Result<Token> {
        let mut s = String::new();
        let mut decimal = false;
        while let Some(pk) = self.chars.peek().copied() {
            if is_rill_digit(pk) || (!decimal && pk == '.') {
                if pk == '.' {
                    decimal = true;
                }
                s.push(pk);
                self.chars.next();
            } else {
                break;
            }
        }
        let value = match s.parse::<f64>() {
            Ok(value) => value,
            Err(_) => return Err(error!("incorrect number '{}'", s)),
        };
        if decimal {
            Ok(Token::Literal(Literal::Dec(value)))
        } else {
            Ok(Token::Literal(Literal::Int(value)))
        }
    }

    fn string(&mut self) -> Result<Token> {
        let mut s = String::new();
        self.chars.next();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(Token::Literal(Literal::Str(s))),
                Some(ch) => s.push(ch),
                None => return Err(error!("string literal is not closed")),
            }
        }
    }

    fn minutia(&mut self) -> Result<Token> {
        use Operator::*;
        let ch = match self.chars.next() {
            Some(ch) => ch,
            None => return Ok(Token::Eol),
        };
        let pk = self.chars.peek().copied();
        // Two-character operators take priority over their one-character
        // prefix. `++` and `--` are not operators in this language.
        let two = match (ch, pk) {
            ('=', Some('=')) => Some(Token::Operator(Equal)),
            ('!', Some('=')) => Some(Token::Operator(NotEqual)),
            ('<', Some('=')) => Some(Token::Operator(LessEqual)),
            ('>', Some('=')) => Some(Token::Operator(GreaterEqual)),
            ('&', Some('&')) => Some(Token::Operator(And)),
            ('|', Some('|')) => Some(Token::Operator(Or)),
            ('/', Some('/')) => Some(Token::Eol),
            ('+', Some('+')) => return Err(error!("unknown token '++'")),
            ('-', Some('-')) => return Err(error!("unknown token '--'")),
            _ => None,
        };
        if let Some(token) = two {
            self.chars.next();
            return Ok(token);
        }
        match ch {
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            ',' => Ok(Token::Comma),
            '?' => Ok(Token::Question),
            '=' => Ok(Token::Assign),
            '+' => Ok(Token::Operator(Plus)),
            '-' => Ok(Token::Operator(Minus)),
            '*' => Ok(Token::Operator(Multiply)),
            '/' => Ok(Token::Operator(Divide)),
            '%' => Ok(Token::Operator(Modulus)),
            '\\' => Ok(Token::Operator(DivideInt)),
            '!' => Ok(Token::Operator(Not)),
            '<' => Ok(Token::Operator(Less)),
            '>' => Ok(Token::Operator(Greater)),
            _ => Err(error!("unknown token '{}'", ch)),
        }
    }
}
