//! Markdown to HTML.
//!
//! Rendering is `pulldown-cmark` with the GitHub extensions (tables,
//! strikethrough, task lists) plus two overrides:
//!
//! - code blocks become `<pre><code class="language-x">…</code></pre>`, with
//!   no class attribute when the fence has no info string;
//! - inline code becomes a bare `<code>…</code>`.
//!
//! `sanitize` is a plain tag strip over raw HTML events. It is not an HTML
//! sanitizer and does not parse the markup.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static tag pattern compiles"));

/// Per-request rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownOptions {
    /// Strip tags out of raw HTML blocks and inline HTML.
    #[serde(default)]
    pub sanitize: bool,
}

/// Size figures for the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.split('\n').count(),
    }
}

/// Render `markdown` to an HTML fragment.
pub fn render(markdown: &str, options: MarkdownOptions) -> String {
    let mut parse_opts = Options::empty();
    parse_opts.insert(Options::ENABLE_TABLES);
    parse_opts.insert(Options::ENABLE_STRIKETHROUGH);
    parse_opts.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, parse_opts);
    let mut events: Vec<Event<'_>> = Vec::new();
    // (language, accumulated text) while inside a code block
    let mut code_block: Option<(Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, text)) = code_block.take() {
                    events.push(Event::Html(CowStr::from(code_block_html(lang.as_deref(), &text))));
                }
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some((_, buf)) = code_block.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::Code(text) => {
                events.push(Event::Html(CowStr::from(format!("<code>{}</code>", escape(&text)))));
            }
            Event::Html(raw) if options.sanitize => {
                events.push(Event::Html(CowStr::from(strip_tags(&raw))));
            }
            Event::InlineHtml(raw) if options.sanitize => {
                events.push(Event::InlineHtml(CowStr::from(strip_tags(&raw))));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Remove anything that looks like a tag.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

fn code_block_html(lang: Option<&str>, text: &str) -> String {
    let body = text.strip_suffix('\n').unwrap_or(text);
    match lang {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            escape(lang),
            escape(body)
        ),
        None => format!("<pre><code>{}</code></pre>\n", escape(body)),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = render("# Hello\n\nThis is a test", MarkdownOptions::default());
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<p>This is a test</p>"));
    }

    #[test]
    fn fenced_code_with_language() {
        let html = render("```javascript\nconst x = 1;\n```", MarkdownOptions::default());
        assert!(html.contains("<pre><code class=\"language-javascript\">const x = 1;</code></pre>"));
    }

    #[test]
    fn fenced_code_without_language() {
        let html = render("```\nplain text\n```", MarkdownOptions::default());
        assert!(html.contains("<pre><code>plain text</code></pre>"));
    }

    #[test]
    fn code_is_escaped() {
        let html = render("`a < b`", MarkdownOptions::default());
        assert!(html.contains("<code>a &lt; b</code>"));
    }

    #[test]
    fn sanitize_strips_raw_html() {
        let src = "<script>alert(\"xss\")</script>Hello";
        let html = render(src, MarkdownOptions { sanitize: true });
        assert!(!html.contains("<script>"));
        assert!(html.contains("Hello"));

        let kept = render(src, MarkdownOptions::default());
        assert!(kept.contains("<script>"));
    }

    #[test]
    fn gfm_tables() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |", MarkdownOptions::default());
        assert!(html.contains("<table>"));
    }

    #[test]
    fn stats_count_words_and_lines() {
        let stats = text_stats("# Title\n\nTwo words");
        assert_eq!(
            stats,
            TextStats {
                characters: 18,
                words: 4,
                lines: 3
            }
        );
    }
}
