//! Tokenizer for the Turtle-like surface syntax.
//!
//! Token kinds are tried in a fixed priority order and the first one that
//! matches wins; each kind munches as much input as its own pattern allows.
//! Comments and whitespace are skipped. The lexer holds no state beyond its
//! cursor, so a fresh [`Lexer`] can be started over any input at any time.

use crate::error::LexError;
use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_until, take_while, take_while1},
    character::complete::{anychar, char as pchar, digit1, multispace1, none_of, not_line_ending, one_of},
    combinator::{map, map_opt, map_res, opt, recognize, value},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Dot,
    Comma,
}

impl Punct {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '(' => Punct::OpenParen,
            ')' => Punct::CloseParen,
            '[' => Punct::OpenBracket,
            ']' => Punct::CloseBracket,
            ';' => Punct::Semicolon,
            '.' => Punct::Dot,
            ',' => Punct::Comma,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Punct::OpenParen => '(',
            Punct::CloseParen => ')',
            Punct::OpenBracket => '[',
            Punct::CloseBracket => ']',
            Punct::Semicolon => ';',
            Punct::Dot => '.',
            Punct::Comma => ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// `@prefix`
    PrefixKeyword,
    /// `<...>` contents; `<>` yields the empty string.
    Iri(&'a str),
    /// `prefix:local`, `:local`, `_:local` or `prefix:`
    PrefixedName(&'a str),
    String(Cow<'a, str>),
    Integer(i64),
    Float(f64),
    /// Bare word such as `a`.
    Symbol(&'a str),
    Punct(Punct),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::PrefixKeyword => f.write_str("`@prefix`"),
            Token::Iri(iri) => write!(f, "IRI <{iri}>"),
            Token::PrefixedName(name) => write!(f, "name `{name}`"),
            Token::String(s) => write!(f, "string {s:?}"),
            Token::Integer(i) => write!(f, "number {i}"),
            Token::Float(x) => write!(f, "number {x}"),
            Token::Symbol(s) => write!(f, "symbol `{s}`"),
            Token::Punct(p) => write!(f, "`{}`", p.as_char()),
        }
    }
}

/// A token with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub offset: usize,
}

// ============================================================================
// Lexer
// ============================================================================

/// Lazy token stream over one document.
///
/// On input that matches no token the lexer yields a [`LexError`] and skips
/// one character, so callers can either stop or keep going.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.input[self.pos..];
            if rest.is_empty() {
                return None;
            }
            if let Ok((after, ())) = trivia(rest) {
                self.pos += rest.len() - after.len();
                continue;
            }

            let offset = self.pos;
            return Some(match token(rest) {
                Ok((after, token)) => {
                    self.pos += rest.len() - after.len();
                    Ok(Spanned { token, offset })
                }
                Err(_) => {
                    self.pos += rest.chars().next().map_or(1, char::len_utf8);
                    Err(LexError::at(self.input, offset))
                }
            });
        }
    }
}

/// Tokenize a whole document eagerly, stopping at the first error.
pub fn tokenize(input: &str) -> Result<Vec<Spanned<'_>>, LexError> {
    Lexer::new(input).collect()
}

// ============================================================================
// Token patterns
// ============================================================================

fn trivia(input: &str) -> IResult<&str, ()> {
    alt((
        value((), multispace1),
        value((), pair(pchar('#'), not_line_ending)),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(terminated(long_string, opt(literal_suffix)), |s| {
            Token::String(Cow::Borrowed(s))
        }),
        map(terminated(quoted_string, opt(literal_suffix)), Token::String),
        value(Token::Iri(""), tag("<>")),
        map(iri_ref, Token::Iri),
        map(prefixed_name, Token::PrefixedName),
        value(Token::PrefixKeyword, tag("@prefix")),
        float,
        integer,
        map(
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            Token::Symbol,
        ),
        map_opt(one_of("()[];.,"), |c| Punct::from_char(c).map(Token::Punct)),
    ))(input)
}

fn long_string(input: &str) -> IResult<&str, &str> {
    delimited(tag("\"\"\""), take_until("\"\"\""), tag("\"\"\""))(input)
}

fn quoted_string(input: &str) -> IResult<&str, Cow<'_, str>> {
    let (rest, raw) = delimited(
        pchar('"'),
        opt(escaped(none_of("\\\""), '\\', anychar)),
        pchar('"'),
    )(input)?;
    Ok((rest, unescape(raw.unwrap_or(""))))
}

/// Only `\"` and `\\` are unescaped; other escapes are kept verbatim.
fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(e @ ('"' | '\\')) => out.push(e),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// `@lang` or `^^datatype` after a string literal; consumed and dropped.
fn literal_suffix(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(
            pchar('@'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        )),
        recognize(pair(tag("^^"), alt((iri_ref, prefixed_name)))),
    ))(input)
}

fn iri_ref(input: &str) -> IResult<&str, &str> {
    delimited(
        pchar('<'),
        take_while1(|c: char| c != '>' && c != '\n'),
        pchar('>'),
    )(input)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn prefixed_name(input: &str) -> IResult<&str, &str> {
    recognize(tuple((take_while(is_name_char), pchar(':'), local_part)))(input)
}

/// Local part of a prefixed name. Dots are allowed inside but never as the
/// last character, which always belongs to the statement terminator.
fn local_part(input: &str) -> IResult<&str, &str> {
    let mut end = 0;
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if is_name_char(c) {
            end = i + c.len_utf8();
        } else if c == '.' && chars.peek().is_some_and(|&(_, next)| is_name_char(next)) {
            end = i + 1;
        } else {
            break;
        }
    }
    Ok((&input[end..], &input[..end]))
}

fn float(input: &str) -> IResult<&str, Token<'_>> {
    map_res(
        recognize(tuple((opt(pchar('-')), digit1, pchar('.'), digit1))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

fn integer(input: &str) -> IResult<&str, Token<'_>> {
    map(recognize(pair(opt(pchar('-')), digit1)), |s: &str| {
        // Out-of-range integers degrade to floats instead of failing the lex.
        s.parse::<i64>()
            .map(Token::Integer)
            .unwrap_or_else(|_| Token::Float(s.parse::<f64>().unwrap_or(f64::NAN)))
    })(input)
}
