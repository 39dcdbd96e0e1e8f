//! Code beautifier for JavaScript, JSON and CSS.
//!
//! JSON goes through `serde_json` and comes back with the requested indent.
//! JavaScript and CSS are re-laid-out from the token stream: one statement or
//! declaration per line, blocks indented by `tabWidth`, operators spaced, and
//! strings left alone apart from the quote preference.

use crate::error::{ToolError, ToolResult};
use crate::json;
use crate::lexer::{self, Dialect, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeautifyLanguage {
    Javascript,
    Json,
    Css,
}

impl BeautifyLanguage {
    pub const SUPPORTED: &'static [&'static str] = &["javascript", "json", "css"];

    pub fn as_str(self) -> &'static str {
        match self {
            BeautifyLanguage::Javascript => "javascript",
            BeautifyLanguage::Json => "json",
            BeautifyLanguage::Css => "css",
        }
    }
}

impl FromStr for BeautifyLanguage {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" => Ok(BeautifyLanguage::Javascript),
            "json" => Ok(BeautifyLanguage::Json),
            "css" => Ok(BeautifyLanguage::Css),
            _ => Err(ToolError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for BeautifyLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where trailing commas go in multi-line object literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    None,
    #[default]
    Es5,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeautifyOptions {
    pub semi: bool,
    pub tab_width: usize,
    pub single_quote: bool,
    pub trailing_comma: TrailingComma,
}

impl Default for BeautifyOptions {
    fn default() -> Self {
        BeautifyOptions {
            semi: true,
            tab_width: 2,
            single_quote: true,
            trailing_comma: TrailingComma::Es5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeautifyStats {
    pub original_size: usize,
    pub formatted_size: usize,
    /// Widest leading whitespace run on any output line.
    pub indentation_level: usize,
}

impl BeautifyStats {
    pub fn new(original: &str, formatted: &str) -> Self {
        BeautifyStats {
            original_size: original.chars().count(),
            formatted_size: formatted.chars().count(),
            indentation_level: indentation_level(formatted),
        }
    }
}

pub fn indentation_level(text: &str) -> usize {
    text.lines()
        .map(|line| line.len() - line.trim_start().len())
        .max()
        .unwrap_or(0)
}

pub fn beautify(
    content: &str,
    language: BeautifyLanguage,
    options: &BeautifyOptions,
) -> ToolResult<String> {
    match language {
        BeautifyLanguage::Json => {
            let value = json::validate(content).map_err(ToolError::Syntax)?;
            json::format(&value, options.tab_width, false)
        }
        BeautifyLanguage::Javascript => {
            let tokens = lexer::tokenize(content, Dialect::Js)?;
            lexer::check_balanced(&tokens)?;
            Ok(Layout::new(code_indent(options), *options, Dialect::Js).run(&tokens))
        }
        BeautifyLanguage::Css => {
            let tokens = lexer::tokenize(content, Dialect::Css)?;
            lexer::check_balanced(&tokens)?;
            Ok(Layout::new(code_indent(options), *options, Dialect::Css).run(&tokens))
        }
    }
}

/// Widest JavaScript/CSS indent step; larger `tabWidth` values are clamped.
pub const MAX_TAB_WIDTH: usize = 16;

fn code_indent(options: &BeautifyOptions) -> String {
    " ".repeat(options.tab_width.min(MAX_TAB_WIDTH))
}

/// Words that take a space before a following `(`.
const PAREN_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "function", "return", "typeof", "await",
    "yield", "in", "of", "new", "delete", "void", "throw", "case",
];

/// Words after which an operator is unary and `{` opens an object.
const PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "await", "yield",
];

/// Words that continue a statement after a closing brace.
const CONTINUATIONS: &[&str] = &["else", "catch", "finally"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Block,
    Object,
    Paren,
    Bracket,
}

struct Layout {
    indent: String,
    options: BeautifyOptions,
    dialect: Dialect,
    lines: Vec<String>,
    line: String,
    depth: usize,
    frames: Vec<Frame>,
    /// Unmatched `?` awaiting their `:`.
    ternaries: usize,
    /// The last emitted token ends an expression.
    after_value: bool,
    /// The last emitted token was a prefix operator.
    after_unary: bool,
    /// The last CSS `:` separates a property from its value.
    colon_spaced: bool,
}

impl Layout {
    fn new(indent: String, options: BeautifyOptions, dialect: Dialect) -> Self {
        Layout {
            indent,
            options,
            dialect,
            lines: Vec::new(),
            line: String::new(),
            depth: 0,
            frames: Vec::new(),
            ternaries: 0,
            after_value: false,
            after_unary: false,
            colon_spaced: false,
        }
    }

    fn run(mut self, tokens: &[Token<'_>]) -> String {
        for (i, token) in tokens.iter().enumerate() {
            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            let rest = &tokens[i + 1..];
            match self.dialect {
                Dialect::Js => self.js_token(token, prev, rest.first()),
                Dialect::Css => self.css_token(token, prev, rest),
            }
        }
        if self.dialect == Dialect::Js {
            self.end_statement();
        }
        self.flush();

        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn flush(&mut self) {
        let text = self.line.trim_end();
        if !text.is_empty() {
            let line = format!("{}{}", self.indent.repeat(self.depth), text);
            self.lines.push(line);
        }
        self.line.clear();
    }

    fn push(&mut self, text: &str, space: bool) {
        if space && !self.line.is_empty() {
            self.line.push(' ');
        }
        self.line.push_str(text);
    }

    fn top(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    fn in_statement_context(&self) -> bool {
        matches!(self.top(), None | Some(Frame::Block))
    }

    fn after_opener(&self) -> bool {
        self.line.ends_with('(') || self.line.ends_with('[')
    }

    /// Terminate the pending statement with `;` when enabled.
    fn end_statement(&mut self) {
        if self.options.semi
            && self.after_value
            && self.in_statement_context()
            && !self.line.is_empty()
            && !self.line.ends_with(';')
        {
            self.line.push(';');
        }
    }

    fn open_brace(&mut self, frame: Frame) {
        self.push("{", true);
        self.flush();
        self.frames.push(frame);
        self.depth += 1;
        self.after_value = false;
        self.after_unary = false;
    }

    fn close_brace(&mut self) {
        match self.top() {
            Some(Frame::Object) => {
                if self.options.trailing_comma != TrailingComma::None
                    && !self.line.is_empty()
                    && !self.line.ends_with(',')
                {
                    self.line.push(',');
                }
            }
            _ => match self.dialect {
                Dialect::Js => self.end_statement(),
                Dialect::Css => {
                    if !self.line.is_empty() && !self.line.ends_with(';') {
                        self.line.push(';');
                    }
                }
            },
        }
        self.flush();
        let frame = self.frames.pop();
        self.depth = self.depth.saturating_sub(1);
        self.line.push('}');
        self.after_value = frame == Some(Frame::Object);
        self.after_unary = false;
    }

    fn js_token(&mut self, token: &Token<'_>, prev: Option<&Token<'_>>, next: Option<&Token<'_>>) {
        // statement split by a line break without a semicolon
        if token.newline_before
            && self.after_value
            && self.in_statement_context()
            && !self.line.is_empty()
            && matches!(token.kind, TokenKind::Word | TokenKind::Str)
            && !CONTINUATIONS.contains(&token.text)
        {
            self.end_statement();
            self.flush();
        }

        match token.kind {
            TokenKind::LineComment => {
                self.push(token.text, true);
                self.flush();
            }
            TokenKind::BlockComment => self.block_comment(token, next),
            TokenKind::Punct => self.js_punct(token, prev, next),
            TokenKind::Op => self.js_operator(token),
            TokenKind::Word | TokenKind::Str => {
                let space = !self.after_unary
                    && prev.is_some_and(|p| {
                        !(p.is_punct("(") || p.is_punct("[") || p.is_op(".") || p.is_op("?."))
                    });
                let text = match token.kind {
                    TokenKind::Str => self.requote(token.text),
                    _ => token.text.to_string(),
                };
                self.push(&text, space);
                self.after_unary = false;
                self.after_value =
                    !(token.kind == TokenKind::Word && PREFIX_KEYWORDS.contains(&token.text));
            }
        }
    }

    fn block_comment(&mut self, token: &Token<'_>, next: Option<&Token<'_>>) {
        if token.newline_before {
            self.flush();
        }
        self.push(token.text, true);
        if next.map_or(true, |n| n.newline_before) {
            self.flush();
        }
    }

    fn js_punct(&mut self, token: &Token<'_>, prev: Option<&Token<'_>>, next: Option<&Token<'_>>) {
        match token.text {
            "{" => {
                let frame = if self.opens_object(prev) {
                    Frame::Object
                } else {
                    Frame::Block
                };
                if next.is_some_and(|n| n.is_punct("}")) {
                    let space = !prev.is_some_and(|p| p.is_punct("(") || p.is_punct("["));
                    self.push("{", space);
                    self.frames.push(frame);
                    self.after_value = false;
                } else {
                    self.open_brace(frame);
                }
            }
            "}" => {
                if prev.is_some_and(|p| p.is_punct("{")) {
                    let frame = self.frames.pop();
                    self.line.push('}');
                    self.after_value = frame == Some(Frame::Object);
                } else {
                    self.close_brace();
                }
                let joins = next.is_some_and(|n| {
                    CONTINUATIONS.contains(&n.text)
                        || (n.kind == TokenKind::Punct && n.text != "{" && n.text != "(")
                        || n.is_op(".")
                        || n.is_op("?.")
                });
                let inside_expression = !self.in_statement_context();
                if !joins && !inside_expression {
                    // object literal ending an expression statement
                    self.end_statement();
                    self.flush();
                }
            }
            ";" => {
                if self.top() == Some(Frame::Paren) {
                    self.line.push(';');
                } else {
                    if self.options.semi {
                        self.line.push(';');
                    }
                    self.flush();
                }
                self.after_value = false;
                self.after_unary = false;
            }
            "," => {
                self.line.push(',');
                if self.top() == Some(Frame::Object) {
                    self.flush();
                }
                self.after_value = false;
                self.after_unary = false;
            }
            "(" | "[" => {
                let space = match prev {
                    None => false,
                    Some(p) if p.kind == TokenKind::Word => {
                        PAREN_KEYWORDS.contains(&p.text)
                            || (token.text == "[" && PREFIX_KEYWORDS.contains(&p.text))
                    }
                    Some(p) if p.is_punct(")") || p.is_punct("]") || p.is_punct("}") => {
                        !self.after_value
                    }
                    Some(p) if p.is_punct("(") || p.is_punct("[") => false,
                    Some(p) if p.kind == TokenKind::Str => false,
                    Some(p) if p.kind == TokenKind::Op => {
                        !(self.after_unary || p.text == "." || p.text == "?.")
                    }
                    Some(_) => true,
                };
                self.push(token.text, space);
                self.frames.push(if token.text == "(" {
                    Frame::Paren
                } else {
                    Frame::Bracket
                });
                self.after_value = false;
                self.after_unary = false;
            }
            _ => {
                // `)` and `]`
                self.frames.pop();
                self.line.push_str(token.text);
                self.after_value = true;
                self.after_unary = false;
            }
        }
    }

    fn js_operator(&mut self, token: &Token<'_>) {
        let op = token.text;
        let space_before = !(self.line.is_empty() || self.after_unary || self.after_opener());
        match op {
            "." | "?." => {
                self.line.push_str(op);
                self.after_value = false;
                self.after_unary = false;
                return;
            }
            "++" | "--" if self.after_value => {
                self.line.push_str(op);
                return;
            }
            "!" | "~" | "++" | "--" | "..." => {
                self.push(op, space_before);
                self.after_unary = true;
                self.after_value = false;
                return;
            }
            "-" | "+" if !self.after_value => {
                self.push(op, space_before);
                self.after_unary = true;
                return;
            }
            "?" => {
                self.ternaries += 1;
                self.push(op, true);
            }
            ":" if self.ternaries > 0 => {
                self.ternaries -= 1;
                self.push(op, true);
            }
            // object key, case label or statement label
            ":" => self.line.push(':'),
            _ => self.push(op, space_before),
        }
        self.after_value = false;
        self.after_unary = false;
    }

    /// A `{` opens an object literal when it appears where an expression is
    /// expected.
    fn opens_object(&self, prev: Option<&Token<'_>>) -> bool {
        let Some(prev) = prev else {
            return false;
        };
        match prev.kind {
            TokenKind::Op => prev.text != "=>",
            TokenKind::Punct => match prev.text {
                "(" | "[" => true,
                "," => !self.in_statement_context(),
                _ => false,
            },
            TokenKind::Word => PREFIX_KEYWORDS.contains(&prev.text),
            _ => false,
        }
    }

    /// Apply the quote preference when the body allows it.
    fn requote(&self, text: &str) -> String {
        let (want, other) = if self.options.single_quote {
            ('\'', '"')
        } else {
            ('"', '\'')
        };
        let Some(body) = text
            .strip_prefix(other)
            .and_then(|t| t.strip_suffix(other))
        else {
            return text.to_string();
        };
        if body.contains(want) {
            return text.to_string();
        }
        let body = body.replace(&format!("\\{other}"), &other.to_string());
        format!("{want}{body}{want}")
    }

    fn css_token(&mut self, token: &Token<'_>, prev: Option<&Token<'_>>, rest: &[Token<'_>]) {
        match (token.kind, token.text) {
            (TokenKind::BlockComment, _) => self.block_comment(token, rest.first()),
            (TokenKind::Punct, "{") => self.open_brace(Frame::Block),
            (TokenKind::Punct, "}") => {
                self.close_brace();
                self.flush();
            }
            (TokenKind::Punct, ";") => {
                self.line.push(';');
                if self.top() != Some(Frame::Paren) {
                    self.flush();
                }
            }
            (TokenKind::Punct, "(") => {
                self.frames.push(Frame::Paren);
                self.push("(", token.space_before);
            }
            (TokenKind::Punct, ")") => {
                self.frames.pop();
                self.line.push(')');
            }
            (TokenKind::Op, ":") => {
                self.colon_spaced = self.top() == Some(Frame::Paren) || declaration_colon(rest);
                let space = token.space_before && !self.colon_spaced;
                self.push(":", space);
            }
            _ => {
                let space = match prev {
                    Some(p) if p.is_punct(",") => true,
                    Some(p) if p.is_op(":") => self.colon_spaced || token.space_before,
                    Some(p) if p.is_punct("(") => false,
                    _ => token.space_before && token.text != ",",
                };
                self.push(token.text, space);
            }
        }
    }
}

/// A `:` belongs to a declaration when a `;` or `}` comes before any `{`.
fn declaration_colon(after: &[Token<'_>]) -> bool {
    after
        .iter()
        .find(|t| t.kind == TokenKind::Punct && matches!(t.text, ";" | "{" | "}"))
        .map_or(true, |t| t.text != "{")
}
