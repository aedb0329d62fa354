//! Declaration value trees.

use cssparser::{ParseError, Parser, ParserInput, Token};

/// Contents of a url or string token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Escapes resolved.
    pub value: String,
    /// Exactly as written between the quotes or parentheses.
    pub raw: String,
}
impl Text {
    /// Text written without escapes, so `raw` and `value` are the same.
    pub fn plain(value: &str) -> Self {
        Self { value: value.to_string(), raw: value.to_string() }
    }
}

/// A component of a declaration value.
///
/// Quoted `url("...")` is a [`Function`](Self::Function) named `url` with a
/// single [`String`](Self::String) argument, while unquoted `url(...)` is its
/// own token in CSS and becomes [`Url`](Self::Url).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `name(arguments)`; plain parenthesised and bracketed groups have an
    /// empty name.
    Function { name: String, arguments: Vec<Value> },
    Url(Text),
    String(Text),
    /// Identifiers, numbers, dimensions, and anything else left as written.
    Word(String),
    /// Separators: `,`, `/`, `:` and other delimiters.
    Div(char),
}
impl Value {
    /// The literal text of a leaf value, with quotes and escapes resolved.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Url(text) | Self::String(text) => Some(&text.value),
            Self::Word(text) => Some(text),
            Self::Function { .. } | Self::Div(_) => None,
        }
    }

    /// Like [`text`](Self::text), but with escapes left as written.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Url(text) | Self::String(text) => Some(&text.raw),
            Self::Word(text) => Some(text),
            Self::Function { .. } | Self::Div(_) => None,
        }
    }
}

/// Parses a declaration value. Whitespace and comments are dropped.
///
/// ```
/// use glyphcut_css::{Value, parse_value};
///
/// let values = parse_value("url('a.woff2') format('woff2'), local(Arial)");
/// assert_eq!(values.len(), 4);
/// assert_eq!(values[2], Value::Div(','));
/// ```
pub fn parse_value(text: &str) -> Vec<Value> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_values(&mut parser)
}

/// Visits every value depth first, parents before their arguments.
pub fn walk_values<'a>(values: &'a [Value], visit: &mut impl FnMut(&'a Value)) {
    for value in values {
        visit(value);
        if let Value::Function { arguments, .. } = value {
            walk_values(arguments, visit);
        }
    }
}

fn parse_values(parser: &mut Parser<'_, '_>) -> Vec<Value> {
    let mut values = Vec::new();
    loop {
        parser.skip_whitespace();
        let start = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let value = match token {
            Token::Function(name) => Value::Function {
                name: name.to_string(),
                arguments: parse_arguments(parser),
            },
            Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock => Value::Function {
                name: String::new(),
                arguments: parse_arguments(parser),
            },
            Token::UnquotedUrl(url) => Value::Url(Text {
                value: url.to_string(),
                raw: unquoted_url_raw(parser.slice_from(start)).to_string(),
            }),
            Token::QuotedString(text) => Value::String(Text {
                value: text.to_string(),
                raw: quoted_string_raw(parser.slice_from(start)).to_string(),
            }),
            Token::Ident(text) => Value::Word(text.to_string()),
            Token::Comma => Value::Div(','),
            Token::Colon => Value::Div(':'),
            Token::Semicolon => Value::Div(';'),
            Token::Delim(delim) => Value::Div(delim),
            _ => Value::Word(parser.slice_from(start).trim().to_string()),
        };
        values.push(value);
    }
    values
}

/// `url( a\2e woff2 )` to `a\2e woff2`. The closing parenthesis may be missing
/// at the end of the input.
fn unquoted_url_raw(token: &str) -> &str {
    let inner = token.split_once('(').map_or(token, |(_, inner)| inner);
    inner.strip_suffix(')').unwrap_or(inner).trim()
}

/// `'a\2e woff2'` to `a\2e woff2`. The closing quote may be missing at the end of
/// the input.
fn quoted_string_raw(token: &str) -> &str {
    let mut chars = token.chars();
    let Some(quote) = chars.next() else {
        return token;
    };
    let inner = chars.as_str();
    inner.strip_suffix(quote).unwrap_or(inner)
}

fn parse_arguments(parser: &mut Parser<'_, '_>) -> Vec<Value> {
    let arguments: Result<Vec<Value>, ParseError<'_, ()>> =
        parser.parse_nested_block(|nested| Ok(parse_values(nested)));
    arguments.unwrap_or_default()
}
