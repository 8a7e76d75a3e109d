use rill::lang::{Lexer, Literal, Operator, Token, Word};

fn lex_line(s: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(s);
    let mut v = vec![];
    loop {
        match lexer.token().unwrap() {
            Token::Eol => return v,
            token => v.push(token),
        }
    }
}

#[test]
fn test_keywords_and_idents() {
    assert_eq!(
        lex_line("while whilst"),
        vec![
            Token::Word(Word::While),
            Token::Ident("whilst".to_string()),
        ]
    );
}

#[test]
fn test_statement_shapes() {
    assert_eq!(
        lex_line("for i = 1 to 10 step 2"),
        vec![
            Token::Word(Word::For),
            Token::Ident("i".to_string()),
            Token::Assign,
            Token::Literal(Literal::Int(1.0)),
            Token::Word(Word::To),
            Token::Literal(Literal::Int(10.0)),
            Token::Word(Word::Step),
            Token::Literal(Literal::Int(2.0)),
        ]
    );
}

#[test]
fn test_longest_match() {
    assert_eq!(
        lex_line("a<=b"),
        vec![
            Token::Ident("a".to_string()),
            Token::Operator(Operator::LessEqual),
            Token::Ident("b".to_string()),
        ]
    );
    assert_eq!(
        lex_line("a < = b"),
        vec![
            Token::Ident("a".to_string()),
            Token::Operator(Operator::Less),
            Token::Assign,
            Token::Ident("b".to_string()),
        ]
    );
}

#[test]
fn test_strings_keep_spaces() {
    assert_eq!(
        lex_line("print \"two  words\""),
        vec![
            Token::Word(Word::Print),
            Token::Literal(Literal::Str("two  words".to_string())),
        ]
    );
}

#[test]
fn test_guard_and_call_punctuation() {
    assert_eq!(
        lex_line("break ? f(1, x)"),
        vec![
            Token::Word(Word::Break),
            Token::Question,
            Token::Ident("f".to_string()),
            Token::LParen,
            Token::Literal(Literal::Int(1.0)),
            Token::Comma,
            Token::Ident("x".to_string()),
            Token::RParen,
        ]
    );
}

#[test]
fn test_errors() {
    assert!(Lexer::new("~").token().is_err());
    assert!(Lexer::new("\"unclosed").token().is_err());
    let mut lexer = Lexer::new("--x");
    assert!(lexer.token().is_err());
}
