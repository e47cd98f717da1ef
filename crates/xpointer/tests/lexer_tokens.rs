use rstest::rstest;
use xpointer::lexer::{Fence, Lexer, Operator, Token, TokenTag};
use xpointer::{Error, ErrorKind};

fn lex(input: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(input).collect()
}

fn tags(input: &str) -> Vec<TokenTag> {
    lex(input).unwrap().iter().map(Token::tag).collect()
}

#[rstest]
fn function_call_with_path_and_predicate() {
    let tokens = lex(r#"id("d1")/p[1]"#).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::FunctionName("id".into()),
            Token::Fence(Fence::LeftParen),
            Token::Literal("d1".into()),
            Token::Fence(Fence::RightParen),
            Token::Operator(Operator::Slash),
            Token::NameTest("p".into()),
            Token::Fence(Fence::LeftBracket),
            Token::Number(1.0),
            Token::Fence(Fence::RightBracket),
        ]
    );
}

#[rstest]
fn node_after_name_test_is_a_node_type() {
    // a name followed by `(` wins over the must-be-operator rule
    let tokens = lex("a node()").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::NameTest("a".into()),
            Token::NodeType("node".into()),
            Token::Fence(Fence::LeftParen),
            Token::Fence(Fence::RightParen),
        ]
    );
}

#[rstest]
#[case("a and b", vec![TokenTag::NameTest, TokenTag::Operator, TokenTag::NameTest])]
#[case("child::p", vec![TokenTag::AxisName, TokenTag::ColonColon, TokenTag::NameTest])]
#[case("@id", vec![TokenTag::At, TokenTag::NameTest])]
#[case("../.", vec![TokenTag::DotDot, TokenTag::Operator, TokenTag::Dot])]
#[case("f(1, 'x')", vec![
    TokenTag::FunctionName,
    TokenTag::Fence,
    TokenTag::Number,
    TokenTag::Comma,
    TokenTag::Literal,
    TokenTag::Fence,
])]
#[case("text()", vec![TokenTag::NodeType, TokenTag::Fence, TokenTag::Fence])]
#[case("range-to (x)", vec![TokenTag::FunctionName, TokenTag::Fence, TokenTag::NameTest, TokenTag::Fence])]
fn token_categories(#[case] input: &str, #[case] expected: Vec<TokenTag>) {
    assert_eq!(tags(input), expected);
}

#[rstest]
fn star_is_wildcard_or_multiply_by_position() {
    let tokens = lex("* * *").unwrap();
    assert_eq!(
        tokens,
        vec![Token::NameTest("*".into()), Token::Operator(Operator::Multiply), Token::NameTest("*".into())]
    );
}

#[rstest]
#[case("a != b", Operator::NotEquals)]
#[case("a <= b", Operator::LessThanEquals)]
#[case("a >= b", Operator::GreaterThanEquals)]
#[case("a < b", Operator::LessThan)]
#[case("a // b", Operator::SlashSlash)]
#[case("a | b", Operator::Pipe)]
#[case("a div b", Operator::Div)]
#[case("a mod b", Operator::Mod)]
#[case("a or b", Operator::Or)]
fn binary_operators(#[case] input: &str, #[case] op: Operator) {
    let tokens = lex(input).unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1], Token::Operator(op));
}

#[rstest]
fn prefixed_name_tests() {
    assert_eq!(lex("svg:rect").unwrap(), vec![Token::NameTest("svg:rect".into())]);
    assert_eq!(lex("svg:*").unwrap(), vec![Token::NameTest("svg:*".into())]);
}

#[rstest]
fn numbers_and_literals() {
    let tokens = lex(r#".5 12 1.25 "" 'it'"#).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Number(0.5),
            Token::Number(12.0),
            Token::Number(1.25),
            Token::Literal("".into()),
            Token::Literal("it".into()),
        ]
    );
}

#[rstest]
fn peeked_literal_is_returned_by_next() {
    let mut lexer = Lexer::new(r#" "grüße")"#);
    assert_eq!(lexer.peek_token().unwrap(), Some(Token::Literal("grüße".into())));
    assert_eq!(lexer.next_token().unwrap(), Some(Token::Literal("grüße".into())));
    assert_eq!(lexer.next_token().unwrap(), Some(Token::Fence(Fence::RightParen)));
    assert_eq!(lexer.next_token().unwrap(), None);
}

#[rstest]
#[case(r#"id("abc"#)]
#[case("'open")]
#[case("a:")]
#[case("!x")]
#[case("foo::bar")]
#[case("a b")]
#[case("#")]
fn malformed_input_is_a_syntax_error(#[case] input: &str) {
    let err = lex(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax, "{input}: {err}");
}

#[rstest]
fn variables_are_unsupported() {
    assert_eq!(lex("$v").unwrap_err().kind(), ErrorKind::UnsupportedOperation);
}

#[rstest]
fn peek_does_not_consume() {
    let mut lexer = Lexer::new("a/b");
    assert_eq!(lexer.peek_token().unwrap(), Some(Token::NameTest("a".into())));
    assert_eq!(lexer.peek_token().unwrap(), Some(Token::NameTest("a".into())));
    assert_eq!(lexer.next_token().unwrap(), Some(Token::NameTest("a".into())));
    assert_eq!(lexer.remaining(), "/b");
}

#[rstest]
fn snapshot_replays_the_same_tokens() {
    let mut lexer = Lexer::new("x * y)");
    assert_eq!(lexer.next_token().unwrap(), Some(Token::NameTest("x".into())));
    lexer.peek_token().unwrap();
    let snapshot = lexer.snapshot();
    let first: Vec<Token> = (0..3).map(|_| lexer.next_token().unwrap().unwrap()).collect();
    lexer.restore(snapshot);
    let second: Vec<Token> = (0..3).map(|_| lexer.next_token().unwrap().unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(first[0], Token::Operator(Operator::Multiply));
    assert_eq!(lexer.next_token().unwrap(), None);
}

#[rstest]
fn skip_scheme_data_honours_escapes() {
    let mut lexer = Lexer::new("foo(a^(b^)c(d)^^)xpointer(x)");
    assert_eq!(lexer.next_token().unwrap(), Some(Token::FunctionName("foo".into())));
    lexer.skip_scheme_data().unwrap();
    assert_eq!(lexer.remaining(), "xpointer(x)");
    assert_eq!(lexer.next_token().unwrap(), Some(Token::FunctionName("xpointer".into())));
}

#[rstest]
#[case("foo(abc")]
#[case("foo(a^b)")]
#[case("foo bar")]
fn skip_scheme_data_errors(#[case] input: &str) {
    let mut lexer = Lexer::new(input);
    lexer.next_token().unwrap();
    assert_eq!(lexer.skip_scheme_data().unwrap_err().kind(), ErrorKind::Syntax);
}

#[rstest]
fn syntax_error_reports_remaining_input() {
    let err = lex("a/\"oops").unwrap_err();
    match err {
        Error::Syntax { remaining, .. } => assert_eq!(remaining, "\"oops"),
        other => panic!("unexpected error {other:?}"),
    }
}
