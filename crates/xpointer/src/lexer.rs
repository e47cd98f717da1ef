//! Tokenizer for the reduced XPath 1.0 grammar used inside `xpointer(...)`.
//!
//! Tokens are produced lazily; one token of lookahead is buffered by
//! [`Lexer::peek_token`]. [`LexerSnapshot`] captures everything needed to
//! replay a span of input, which `range-to` relies on.
use core::fmt;

use compact_str::CompactString;

use crate::error::{Error, Result};

const NODE_TYPES: &[&str] = &["comment", "text", "processing-instruction", "node", "point", "range"];

const AXIS_NAMES: &[&str] = &[
    "ancestor",
    "ancestor-or-self",
    "attribute",
    "child",
    "descendant",
    "descendant-or-self",
    "following",
    "following-sibling",
    "namespace",
    "parent",
    "preceding",
    "preceding-sibling",
    "self",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fence {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Slash,
    SlashSlash,
    Pipe,
    Plus,
    Minus,
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Multiply,
    And,
    Or,
    Mod,
    Div,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slash => "/",
            Self::SlashSlash => "//",
            Self::Pipe => "|",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
            Self::Multiply => "*",
            Self::And => "and",
            Self::Or => "or",
            Self::Mod => "mod",
            Self::Div => "div",
        }
    }
}

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Fence,
    Operator,
    NameTest,
    Literal,
    NodeType,
    FunctionName,
    AxisName,
    Number,
    At,
    ColonColon,
    Comma,
    Dot,
    DotDot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Fence(Fence),
    Operator(Operator),
    NameTest(CompactString),
    Literal(CompactString),
    NodeType(CompactString),
    FunctionName(CompactString),
    AxisName(CompactString),
    Number(f64),
    At,
    ColonColon,
    Comma,
    Dot,
    DotDot,
}

impl Token {
    pub fn tag(&self) -> TokenTag {
        match self {
            Token::Fence(_) => TokenTag::Fence,
            Token::Operator(_) => TokenTag::Operator,
            Token::NameTest(_) => TokenTag::NameTest,
            Token::Literal(_) => TokenTag::Literal,
            Token::NodeType(_) => TokenTag::NodeType,
            Token::FunctionName(_) => TokenTag::FunctionName,
            Token::AxisName(_) => TokenTag::AxisName,
            Token::Number(_) => TokenTag::Number,
            Token::At => TokenTag::At,
            Token::ColonColon => TokenTag::ColonColon,
            Token::Comma => TokenTag::Comma,
            Token::Dot => TokenTag::Dot,
            Token::DotDot => TokenTag::DotDot,
        }
    }

    pub fn is_fence(&self, fence: Fence) -> bool {
        matches!(self, Token::Fence(f) if *f == fence)
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        matches!(self, Token::Operator(o) if *o == op)
    }

    /// Whether an identifier following this token must be an operator name.
    fn forces_operator(&self) -> bool {
        !matches!(
            self,
            Token::At
                | Token::ColonColon
                | Token::Comma
                | Token::Operator(_)
                | Token::Fence(Fence::LeftParen | Fence::LeftBracket)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Fence(Fence::LeftParen) => f.write_str("("),
            Token::Fence(Fence::RightParen) => f.write_str(")"),
            Token::Fence(Fence::LeftBracket) => f.write_str("["),
            Token::Fence(Fence::RightBracket) => f.write_str("]"),
            Token::Operator(op) => f.write_str(op.as_str()),
            Token::NameTest(s) | Token::NodeType(s) | Token::FunctionName(s) | Token::AxisName(s) => f.write_str(s),
            Token::Literal(s) => write!(f, "\"{s}\""),
            Token::Number(n) => write!(f, "{n}"),
            Token::At => f.write_str("@"),
            Token::ColonColon => f.write_str("::"),
            Token::Comma => f.write_str(","),
            Token::Dot => f.write_str("."),
            Token::DotDot => f.write_str(".."),
        }
    }
}

/// Saved lexer position: remaining input, peek buffer and the previous token.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerSnapshot {
    pos: usize,
    peeked: Option<(Token, usize)>,
    previous: Option<Token>,
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<(Token, usize)>,
    previous: Option<Token>,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0, peeked: None, previous: None }
    }

    /// Unconsumed input, including the text of a buffered peek token.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn snapshot(&self) -> LexerSnapshot {
        LexerSnapshot { pos: self.pos, peeked: self.peeked.clone(), previous: self.previous.clone() }
    }

    pub fn restore(&mut self, snapshot: LexerSnapshot) {
        self.pos = snapshot.pos;
        self.peeked = snapshot.peeked;
        self.previous = snapshot.previous;
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let scanned = match self.peeked.take() {
            Some(p) => Some(p),
            None => self.scan_token()?,
        };
        Ok(scanned.map(|(token, len)| {
            self.pos += len;
            self.previous = Some(token.clone());
            token
        }))
    }

    pub fn peek_token(&mut self) -> Result<Option<Token>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.as_ref().map(|(t, _)| t.clone()))
    }

    /// Skip the parenthesised data of a scheme this crate does not evaluate.
    ///
    /// Parentheses must balance unless escaped with `^`; `^` may only escape
    /// `(`, `)` or `^`.
    pub fn skip_scheme_data(&mut self) -> Result<()> {
        match self.next_token()? {
            Some(t) if t.is_fence(Fence::LeftParen) => {}
            Some(t) => return Err(self.error(format!("expected `(` after scheme name, found `{t}`"))),
            None => return Err(self.error("expected `(` after scheme name")),
        }
        let mut depth = 1usize;
        let mut chars = self.remaining().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '^' => match chars.next() {
                    Some((_, '(' | ')' | '^')) => {}
                    _ => {
                        self.pos += i;
                        return Err(self.error("`^` must escape `(`, `)` or `^`"));
                    }
                },
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += i + 1;
                        self.previous = Some(Token::Fence(Fence::RightParen));
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unbalanced parentheses in scheme data"))
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.remaining())
    }

    fn must_be_operator(&self) -> bool {
        self.previous.as_ref().is_some_and(Token::forces_operator)
    }

    /// Scan one token at the current position without consuming it.
    /// Returns the token and the number of bytes it spans, leading whitespace included.
    fn scan_token(&self) -> Result<Option<(Token, usize)>> {
        let rest = self.remaining();
        let trimmed = rest.trim_start();
        let skipped = rest.len() - trimmed.len();
        let Some(c) = trimmed.chars().next() else {
            return Ok(None);
        };
        let next = trimmed[c.len_utf8()..].chars().next();
        let (token, len) = match c {
            '(' => (Token::Fence(Fence::LeftParen), 1),
            ')' => (Token::Fence(Fence::RightParen), 1),
            '[' => (Token::Fence(Fence::LeftBracket), 1),
            ']' => (Token::Fence(Fence::RightBracket), 1),
            '@' => (Token::At, 1),
            ',' => (Token::Comma, 1),
            '.' if next == Some('.') => (Token::DotDot, 2),
            '.' if next.is_some_and(|d| d.is_ascii_digit()) => scan_number(trimmed),
            '.' => (Token::Dot, 1),
            ':' if next == Some(':') => (Token::ColonColon, 2),
            ':' => return Err(self.error("expected `::`")),
            '/' if next == Some('/') => (Token::Operator(Operator::SlashSlash), 2),
            '/' => (Token::Operator(Operator::Slash), 1),
            '|' => (Token::Operator(Operator::Pipe), 1),
            '+' => (Token::Operator(Operator::Plus), 1),
            '-' => (Token::Operator(Operator::Minus), 1),
            '=' => (Token::Operator(Operator::Equals), 1),
            '!' if next == Some('=') => (Token::Operator(Operator::NotEquals), 2),
            '!' => return Err(self.error("expected `!=`")),
            '<' if next == Some('=') => (Token::Operator(Operator::LessThanEquals), 2),
            '<' => (Token::Operator(Operator::LessThan), 1),
            '>' if next == Some('=') => (Token::Operator(Operator::GreaterThanEquals), 2),
            '>' => (Token::Operator(Operator::GreaterThan), 1),
            '*' if self.must_be_operator() => (Token::Operator(Operator::Multiply), 1),
            '*' => (Token::NameTest("*".into()), 1),
            '$' => return Err(Error::unsupported("variable references")),
            '"' | '\'' => {
                let body = &trimmed[1..];
                let end = body.find(c).ok_or_else(|| self.error("unterminated string literal"))?;
                (Token::Literal(CompactString::from(&body[..end])), end + 2)
            }
            d if d.is_ascii_digit() => scan_number(trimmed),
            n if is_name_start(n) => self.scan_name(trimmed)?,
            other => return Err(self.error(format!("unrecognized character `{other}`"))),
        };
        Ok(Some((token, skipped + len)))
    }

    fn scan_name(&self, input: &str) -> Result<(Token, usize)> {
        let name_len = name_length(input);
        let name = &input[..name_len];
        let after = &input[name_len..];
        let after_ws = after.trim_start();
        if after_ws.starts_with('(') {
            let token = if NODE_TYPES.contains(&name) {
                Token::NodeType(name.into())
            } else {
                Token::FunctionName(name.into())
            };
            return Ok((token, name_len));
        }
        if self.must_be_operator() {
            let op = match name {
                "and" => Operator::And,
                "or" => Operator::Or,
                "mod" => Operator::Mod,
                "div" => Operator::Div,
                _ => return Err(self.error(format!("expected `and`, `or`, `mod` or `div`, found `{name}`"))),
            };
            return Ok((Token::Operator(op), name_len));
        }
        if after_ws.starts_with("::") {
            if AXIS_NAMES.contains(&name) {
                return Ok((Token::AxisName(name.into()), name_len));
            }
            return Err(self.error(format!("unknown axis `{name}`")));
        }
        // prefixed name test: `p:local` or `p:*`
        if let Some(local) = after.strip_prefix(':') {
            if local.starts_with('*') {
                return Ok((Token::NameTest(input[..name_len + 2].into()), name_len + 2));
            }
            if local.chars().next().is_some_and(is_name_start) {
                let total = name_len + 1 + name_length(local);
                return Ok((Token::NameTest(input[..total].into()), total));
            }
        }
        Ok((Token::NameTest(name.into()), name_len))
    }
}

fn name_length(input: &str) -> usize {
    input
        .char_indices()
        .find(|&(i, c)| if i == 0 { !is_name_start(c) } else { !is_name_char(c) })
        .map_or(input.len(), |(i, _)| i)
}

fn scan_number(input: &str) -> (Token, usize) {
    let int_len = input.find(|c: char| !c.is_ascii_digit()).unwrap_or(input.len());
    let mut len = int_len;
    if input[int_len..].starts_with('.') {
        let frac = &input[int_len + 1..];
        let frac_len = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
        if frac_len > 0 || int_len > 0 {
            len = int_len + 1 + frac_len;
        }
    }
    // the slice is ASCII digits with at most one dot, so parsing cannot fail
    let value = input[..len].parse::<f64>().unwrap_or(f64::NAN);
    (Token::Number(value), len)
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
