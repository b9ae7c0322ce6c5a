//! Markdown conversion and table-of-contents extraction.
//!
//! The generator only talks to markdown through the [`MarkdownEngine`] trait:
//! one call turns a document into an HTML fragment, the other lists its
//! headings. [`PulldownEngine`] is the stock implementation; tests swap in
//! doubles.
//!
//! ## Heading anchors
//!
//! `PulldownEngine` gives every heading an `id` unless the document already
//! supplies one with `{#anchor}` syntax:
//!
//! ```text
//! # Hello World          →  <h1 id="hello-world">Hello World</h1>
//! ## Setup {#install}    →  <h2 id="install">Setup</h2>
//! ## Hello World         →  <h2 id="hello-world-1">Hello World</h2>
//! ```
//!
//! When automatic anchors are turned off, TOC entries for headings without an
//! explicit anchor fall back to [`fallback_slug`]. The fallback is deliberately
//! crude (lowercase, spaces to hyphens, nothing else) so that any engine
//! lacking anchors produces the same ids.

use crate::config::MarkdownConfig;
use crate::types::TocEntry;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashSet;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkdownError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unknown highlight theme '{0}'")]
    UnknownTheme(String),
}

/// The two operations the generator needs from a markdown implementation.
pub trait MarkdownEngine {
    /// Convert a markdown document into an HTML fragment.
    fn convert(&self, markdown: &[u8]) -> Result<String, MarkdownError>;

    /// List the document's headings in document order.
    fn extract_toc(&self, markdown: &[u8]) -> Result<Vec<TocEntry>, MarkdownError>;
}

/// Anchor used for a heading that has none: lowercase the title and turn each
/// space into a hyphen. Punctuation, accents and runs of spaces are kept as-is.
///
/// ```
/// use mdtree::markdown::fallback_slug;
///
/// assert_eq!(fallback_slug("My Title"), "my-title");
/// assert_eq!(fallback_slug("Hello, World!"), "hello,-world!");
/// ```
pub fn fallback_slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Automatic heading anchor: alphanumerics, `-` and `_` survive, whitespace
/// becomes `-`, everything else is dropped.
fn anchor_slug(text: &str) -> String {
    let slug: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect();

    if slug.is_empty() {
        "heading".to_string()
    } else {
        slug
    }
}

/// Claim `base` in `seen`, suffixing `-1`, `-2`, … until it is unique.
fn unique_anchor(base: String, seen: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 0;
    while seen.contains(&candidate) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    seen.insert(candidate.clone());
    candidate
}

/// All text inside the heading that starts right before `events`.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Fill in missing heading ids in place.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen = HashSet::new();

    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            seen.insert(id.to_string());
        }
    }

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let anchor = unique_anchor(anchor_slug(&heading_text(&events[i + 1..])), &mut seen);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(anchor.into());
        }
    }
}

/// Build TOC entries from a parsed event stream.
///
/// The title only collects text that sits directly in the heading; text
/// nested in emphasis, links or code spans does not count.
fn toc_from_events(events: &[Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    // (level, anchor, raw title) of the heading being read
    let mut current: Option<(u8, Option<String>, String)> = None;
    let mut depth = 0usize;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((*level as u8, id.as_ref().map(|i| i.to_string()), String::new()));
                depth = 0;
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, title)) = current.take() {
                    let id = id.unwrap_or_else(|| fallback_slug(&title));
                    toc.push(TocEntry {
                        title: title.trim().to_string(),
                        level,
                        id,
                    });
                }
            }
            Event::Start(_) if current.is_some() => depth += 1,
            Event::End(_) if current.is_some() => depth = depth.saturating_sub(1),
            Event::Text(text) if depth == 0 => {
                if let Some((_, _, title)) = current.as_mut() {
                    title.push_str(text);
                }
            }
            _ => {}
        }
    }

    toc
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Code block highlighting with syntect, emitting inline styles.
#[derive(Debug)]
struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    fn new(theme_name: &str) -> Result<Self, MarkdownError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| MarkdownError::UnknownTheme(theme_name.to_string()))?;
        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(error = %err, lang, "highlighting failed, emitting plain code block");
                let class = lang
                    .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
                    .unwrap_or_default();
                format!("<pre><code{class}>{}</code></pre>\n", html_escape(code))
            }
        }
    }

    /// Replace every code block in `events` with its highlighted HTML.
    fn rewrite<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        // (language, collected code) of the block being read
        let mut block: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    block = Some((lang, String::new()));
                }
                Event::Text(text) if block.is_some() => {
                    if let Some((_, code)) = block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = block.take() {
                        out.push(Event::Html(self.highlight(&code, lang.as_deref()).into()));
                    }
                }
                other => out.push(other),
            }
        }

        out
    }
}

/// Stock engine: pulldown-cmark with GFM extensions, heading anchors and
/// syntect highlighting.
#[derive(Debug)]
pub struct PulldownEngine {
    options: Options,
    auto_heading_ids: bool,
    highlighter: Option<Highlighter>,
}

impl PulldownEngine {
    /// Build an engine from config. Fails if the highlight theme is unknown.
    pub fn new(config: &MarkdownConfig) -> Result<Self, MarkdownError> {
        let highlighter = if config.highlight {
            Some(Highlighter::new(&config.theme)?)
        } else {
            None
        };

        Ok(Self {
            auto_heading_ids: config.auto_heading_ids,
            highlighter,
            ..Self::plain()
        })
    }

    /// Engine with automatic anchors and no highlighting.
    pub fn plain() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            auto_heading_ids: true,
            highlighter: None,
        }
    }

    /// Names of the highlight themes bundled with syntect.
    pub fn available_themes() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    fn parse<'a>(&self, text: &'a str) -> Vec<Event<'a>> {
        let mut events: Vec<Event<'a>> = Parser::new_ext(text, self.options).collect();
        if self.auto_heading_ids {
            assign_heading_ids(&mut events);
        }
        events
    }
}

impl MarkdownEngine for PulldownEngine {
    fn convert(&self, markdown: &[u8]) -> Result<String, MarkdownError> {
        let text = std::str::from_utf8(markdown)?;
        let events = self.parse(text);

        let mut out = String::with_capacity(text.len() * 3 / 2);
        match &self.highlighter {
            Some(highlighter) => html::push_html(&mut out, highlighter.rewrite(events).into_iter()),
            None => html::push_html(&mut out, events.into_iter()),
        }
        Ok(out)
    }

    fn extract_toc(&self, markdown: &[u8]) -> Result<Vec<TocEntry>, MarkdownError> {
        let text = std::str::from_utf8(markdown)?;
        Ok(toc_from_events(&self.parse(text)))
    }
}
