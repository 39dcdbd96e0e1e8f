//! Shallow tokenizer for JavaScript and CSS source.
//!
//! This is not a parser. It knows enough to keep strings, comments and
//! template literals intact, to group operators, and to check that brackets
//! balance. Both the minifier's pre-flight check and the beautifier sit on it.

use crate::error::{ToolError, ToolResult};

/// Source flavour; CSS has no `//` comments or template literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Js,
    Css,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Word,
    Str,
    LineComment,
    BlockComment,
    /// One of `{ } ( ) [ ] ; ,`.
    Punct,
    Op,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Whitespace separated this token from the previous one.
    pub space_before: bool,
    /// A line break separated this token from the previous one.
    pub newline_before: bool,
    /// 1-based source line.
    pub line: usize,
}

impl Token<'_> {
    pub fn is_punct(&self, c: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == c
    }

    pub fn is_op(&self, c: &str) -> bool {
        self.kind == TokenKind::Op && self.text == c
    }
}

const JS_OPS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

const CSS_OPS: &[&str] = &["::", "~=", "|=", "^=", "$=", "*="];

pub(crate) fn tokenize(src: &str, dialect: Dialect) -> ToolResult<Vec<Token<'_>>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut space_before = false;
    let mut newline_before = false;

    while i < bytes.len() {
        let c = bytes[i];

        if c.is_ascii_whitespace() {
            space_before = true;
            if c == b'\n' {
                newline_before = true;
                line += 1;
            }
            i += 1;
            continue;
        }

        let start = i;
        let start_line = line;
        let kind = if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let end = src[i + 2..]
                .find("*/")
                .ok_or_else(|| syntax(start_line, "Unterminated comment"))?;
            i += 2 + end + 2;
            TokenKind::BlockComment
        } else if dialect == Dialect::Js && c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            i = src[i..].find('\n').map_or(bytes.len(), |n| i + n);
            TokenKind::LineComment
        } else if c == b'"' || c == b'\'' || (dialect == Dialect::Js && c == b'`') {
            i = scan_string(bytes, i, start_line)?;
            TokenKind::Str
        } else if dialect == Dialect::Js && c == b'/' && starts_regex(&tokens) {
            i = scan_regex(bytes, i, start_line)?;
            TokenKind::Str
        } else if is_word_byte(c, dialect, true) {
            let numeric = c.is_ascii_digit();
            i += 1;
            while i < bytes.len()
                && (is_word_byte(bytes[i], dialect, false) || (numeric && bytes[i] == b'.'))
            {
                i += 1;
            }
            TokenKind::Word
        } else if matches!(c, b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';' | b',') {
            i += 1;
            TokenKind::Punct
        } else {
            let table = match dialect {
                Dialect::Js => JS_OPS,
                Dialect::Css => CSS_OPS,
            };
            let rest = &src[i..];
            let len = table
                .iter()
                .find(|op| rest.starts_with(**op))
                .map_or_else(|| rest.chars().next().map_or(1, char::len_utf8), |op| op.len());
            i += len;
            TokenKind::Op
        };

        let text = &src[start..i];
        line += text.matches('\n').count();
        tokens.push(Token {
            kind,
            text,
            space_before,
            newline_before,
            line: start_line,
        });
        space_before = false;
        newline_before = false;
    }

    Ok(tokens)
}

/// Check that `( [ {` pair up with their closers.
pub(crate) fn check_balanced(tokens: &[Token<'_>]) -> ToolResult<()> {
    let mut open: Vec<&Token<'_>> = Vec::new();
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Punct) {
        let expected = match token.text {
            "(" | "[" | "{" => {
                open.push(token);
                continue;
            }
            ")" => "(",
            "]" => "[",
            "}" => "{",
            _ => continue,
        };
        match open.pop() {
            Some(opener) if opener.text == expected => {}
            _ => {
                return Err(syntax(
                    token.line,
                    &format!("Unexpected token '{}'", token.text),
                ))
            }
        }
    }
    match open.pop() {
        Some(opener) => Err(syntax(
            opener.line,
            &format!("Unclosed '{}'", opener.text),
        )),
        None => Ok(()),
    }
}

fn scan_string(bytes: &[u8], start: usize, line: usize) -> ToolResult<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(syntax(line, "Unterminated string constant"))
}

/// Words after which a `/` begins a regular expression literal.
const REGEX_PREFIX_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// A `/` opens a regex literal wherever an operand is expected.
fn starts_regex(tokens: &[Token<'_>]) -> bool {
    let last = tokens
        .iter()
        .rev()
        .find(|t| !matches!(t.kind, TokenKind::LineComment | TokenKind::BlockComment));
    match last {
        None => true,
        Some(t) => match t.kind {
            TokenKind::Punct => !matches!(t.text, ")" | "]" | "}"),
            TokenKind::Op => !matches!(t.text, "++" | "--"),
            TokenKind::Word => REGEX_PREFIX_WORDS.contains(&t.text),
            _ => false,
        },
    }
}

/// Scan a regex literal (body plus flags) starting at the opening `/`.
fn scan_regex(bytes: &[u8], start: usize, line: usize) -> ToolResult<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Ok(i);
            }
            _ => i += 1,
        }
    }
    Err(syntax(line, "Unterminated regular expression"))
}

fn is_word_byte(c: u8, dialect: Dialect, first: bool) -> bool {
    if c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80 {
        return true;
    }
    match dialect {
        Dialect::Js => c == b'$' || (c == b'#' && first),
        Dialect::Css => matches!(c, b'-' | b'.' | b'#' | b'%' | b'@' | b'!'),
    }
}

fn syntax(line: usize, message: &str) -> ToolError {
    ToolError::Syntax(format!("{message} ({line}:0)"))
}
