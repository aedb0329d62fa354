//! Rule-level CSS tree.

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};

/// A single item of a rule list or declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `@name prelude;` or `@name prelude { ... }`
    AtRule(AtRule),
    /// `selector { ... }`
    Rule(Rule),
    /// `property: value`
    Declaration(Declaration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`, as written.
    pub name: String,
    /// Everything between the name and the block (or semicolon), trimmed.
    pub prelude: String,
    /// Child nodes, if the at-rule has a block at all.
    pub block: Option<Vec<Node>>,
}
impl AtRule {
    /// Compares the name exactly as written, so `@FONT-FACE` is not
    /// `font-face`.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }

    /// Direct child declarations of the block, skipping nested rules.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.block.iter().flatten().filter_map(|node| match node {
            Node::Declaration(declaration) => Some(declaration),
            Node::AtRule(_) | Node::Rule(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub block: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Raw value text, trimmed. Parse it with [`parse_value`](crate::parse_value).
    pub value: String,
}
impl Declaration {
    /// Compares the property exactly as written.
    pub fn is_property(&self, property: &str) -> bool {
        self.property == property
    }
}

/// Parses a stylesheet into its top-level nodes.
///
/// ```
/// use glyphcut_css::{Node, parse_stylesheet};
///
/// let nodes = parse_stylesheet("@font-face { src: url(a.woff2) } body { margin: 0 }");
/// assert_eq!(nodes.len(), 2);
/// assert!(matches!(&nodes[0], Node::AtRule(rule) if rule.is_named("font-face")));
/// assert!(matches!(&nodes[1], Node::Rule(rule) if rule.selector == "body"));
/// ```
pub fn parse_stylesheet(css: &str) -> Vec<Node> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_nodes(&mut parser)
}

fn parse_nodes(parser: &mut Parser<'_, '_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let start = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let node = match token {
            Token::AtKeyword(name) => Some(parse_at_rule(parser, name.to_string())),
            // HTML comment markers and stray separators carry nothing. A stray
            // block is skipped by the next call to `next()`.
            Token::CDO | Token::CDC | Token::Semicolon | Token::CurlyBracketBlock => None,
            Token::Ident(name) => parse_declaration_or_rule(parser, start, Some(name.to_string())),
            other => {
                if opens_block(&other) {
                    skip_block(parser);
                }
                parse_declaration_or_rule(parser, start, None)
            },
        };
        nodes.extend(node);
    }
    nodes
}

fn parse_block(parser: &mut Parser<'_, '_>) -> Vec<Node> {
    let block: Result<Vec<Node>, ParseError<'_, ()>> = parser.parse_nested_block(|nested| Ok(parse_nodes(nested)));
    block.unwrap_or_default()
}

fn parse_at_rule(parser: &mut Parser<'_, '_>, name: String) -> Node {
    let prelude_start = parser.position();
    let mut end = prelude_start;
    loop {
        match parser.next() {
            Ok(Token::Semicolon) | Err(_) => {
                let prelude = trimmed(parser, prelude_start, end);
                return Node::AtRule(AtRule { name, prelude, block: None });
            },
            Ok(Token::CurlyBracketBlock) => {
                let prelude = trimmed(parser, prelude_start, end);
                let block = parse_block(parser);
                return Node::AtRule(AtRule { name, prelude, block: Some(block) });
            },
            Ok(token) => {
                if opens_block(token) {
                    skip_block(parser);
                }
                end = parser.position();
            },
        }
    }
}

/// Anything that isn't an at-rule: consumed up to the next top-level `;`
/// (a declaration) or `{...}` (a rule). Declarations need a leading
/// identifier followed by a colon, otherwise the fragment is dropped.
///
/// The first token has already been consumed, including any block it opens.
fn parse_declaration_or_rule(
    parser: &mut Parser<'_, '_>,
    start: SourcePosition,
    property: Option<String>,
) -> Option<Node> {
    let has_colon = property.is_some() && parser.try_parse(|p| p.expect_colon()).is_ok();
    let value_start = parser.position();
    // End of the last token that belongs to the selector or value, so
    // trailing whitespace and comments are left out.
    let mut end = value_start;
    loop {
        match parser.next() {
            Ok(Token::CurlyBracketBlock) => {
                let selector = trimmed(parser, start, end);
                let block = parse_block(parser);
                return Some(Node::Rule(Rule { selector, block }));
            },
            Ok(Token::Semicolon) | Err(_) => {
                return match (property, has_colon) {
                    (Some(property), true) => {
                        let value = trimmed(parser, value_start, end);
                        Some(Node::Declaration(Declaration { property, value }))
                    },
                    _ => None,
                };
            },
            Ok(token) => {
                if opens_block(token) {
                    skip_block(parser);
                }
                end = parser.position();
            },
        }
    }
}

/// `name(`, `(` and `[`. Curly blocks are handled by the callers.
fn opens_block(token: &Token<'_>) -> bool {
    matches!(token, Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock)
}

/// Consumes the rest of the block opened by the token just returned, so the
/// parser position is past its closing bracket.
fn skip_block(parser: &mut Parser<'_, '_>) {
    let _: Result<(), ParseError<'_, ()>> = parser.parse_nested_block(|_| Ok(()));
}

fn trimmed(parser: &Parser<'_, '_>, start: SourcePosition, end: SourcePosition) -> String {
    parser.slice(start..end).trim().to_string()
}
