//! Named page layouts.
//!
//! The registry holds a fixed set of top-level layouts, each composed from the
//! same pieces:
//!
//! ```text
//! base_document ─┬─ sidebar   (directory listing)
//!                ├─ body      (leaf: `single` or `index`)
//!                └─ toc       (table of contents, if the page has headings)
//! ```
//!
//! | Name | Used for |
//! |------|----------|
//! | `single` | One rendered markdown document |
//! | `index`  | A directory index: its `index.md` (or `.markdown`, `.mkd`) if present, else a listing |
//!
//! Layouts are [maud](https://maud.lambda.xyz/) functions compiled into the
//! binary, so the composition is fixed at build time and every interpolated
//! value is escaped. Only `TemplateData::content`, which is already HTML, is
//! inserted raw.

use crate::types::{FileEntry, TemplateData, TocEntry};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use thiserror::Error;

const CSS: &str = include_str!("../static/style.css");

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {0} not found")]
    NotFound(String),
}

/// A compiled layout.
type Layout = fn(&TemplateData) -> Markup;

/// The layouts every registry starts with.
const LAYOUTS: &[(&str, Layout)] = &[("single", single), ("index", index)];

/// Read-only set of named layouts, built once per generator.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    layouts: BTreeMap<&'static str, Layout>,
}

impl TemplateRegistry {
    pub fn load() -> Self {
        Self {
            layouts: LAYOUTS.iter().copied().collect(),
        }
    }

    /// Names of the loaded layouts, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.layouts.keys().copied()
    }

    /// Render the layout called `name` with `data`.
    pub fn render(&self, name: &str, data: &TemplateData) -> Result<String, TemplateError> {
        let layout = self
            .layouts
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        Ok(layout(data).into_string())
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn base_document(data: &TemplateData, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (data.title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[data.is_index.then_some("index-page")] {
                (sidebar(&data.files))
                main.content {
                    (body)
                }
                (toc(&data.toc))
            }
        }
    }
}

/// Navigation listing of the current directory.
fn sidebar(files: &[FileEntry]) -> Markup {
    html! {
        nav.sidebar {
            ul {
                @for entry in files {
                    li class=[entry.is_dir.then_some("dir")] {
                        a href=(entry.url) {
                            (entry.name)
                            @if entry.is_dir && entry.name != ".." { "/" }
                        }
                    }
                }
            }
        }
    }
}

/// Table of contents. Renders nothing for a page without headings.
fn toc(entries: &[TocEntry]) -> Markup {
    html! {
        @if !entries.is_empty() {
            aside.toc {
                p.toc-heading { "On this page" }
                ul {
                    @for entry in entries {
                        li class={ "toc-level-" (entry.level) } {
                            a href={ "#" (entry.id) } { (entry.title) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Layouts
// ============================================================================

fn single(data: &TemplateData) -> Markup {
    base_document(
        data,
        html! {
            article.document {
                (PreEscaped(&data.content))
            }
        },
    )
}

fn index(data: &TemplateData) -> Markup {
    base_document(
        data,
        html! {
            @if data.content.is_empty() {
                h1 { (data.title) }
                ul.listing {
                    @for entry in data.files.iter().filter(|e| e.name != "..") {
                        li class=[entry.is_dir.then_some("dir")] {
                            a href=(entry.url) { (entry.name) }
                        }
                    }
                }
            } @else {
                article.document {
                    (PreEscaped(&data.content))
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, is_dir: bool, url: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            is_dir,
            path: PathBuf::from(name),
            route_path: PathBuf::from(name),
            url: url.to_string(),
        }
    }

    fn sample() -> TemplateData {
        TemplateData {
            content: "<h1 id=\"hello\">Hello</h1>".to_string(),
            title: "hello".to_string(),
            files: vec![
                entry("..", true, "/"),
                entry("guide", true, "/docs/guide/"),
                entry("hello.md", false, "/docs/hello.html"),
            ],
            toc: vec![TocEntry {
                title: "Hello".to_string(),
                level: 1,
                id: "hello".to_string(),
            }],
            is_index: false,
        }
    }

    #[test]
    fn registry_has_fixed_layouts() {
        let registry = TemplateRegistry::load();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["index", "single"]);
    }

    #[test]
    fn unknown_template_is_not_found() {
        let registry = TemplateRegistry::load();
        let err = registry.render("base", &sample()).unwrap_err();
        assert_eq!(err, TemplateError::NotFound("base".to_string()));
        assert_eq!(err.to_string(), "template base not found");
    }

    #[test]
    fn single_inserts_content_unescaped() {
        let html = TemplateRegistry::load().render("single", &sample()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>hello</title>"));
        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
    }

    #[test]
    fn sidebar_links_every_entry() {
        let html = TemplateRegistry::load().render("single", &sample()).unwrap();
        assert!(html.contains(r#"href="/docs/guide/""#));
        assert!(html.contains(r#"href="/docs/hello.html""#));
        assert!(html.contains("guide/"));
        assert!(html.contains(">..<"));
    }

    #[test]
    fn toc_links_anchors_with_levels() {
        let mut data = sample();
        data.toc.push(TocEntry {
            title: "Deeper".to_string(),
            level: 3,
            id: "deeper".to_string(),
        });
        let html = TemplateRegistry::load().render("single", &data).unwrap();
        assert!(html.contains(r##"href="#hello""##));
        assert!(html.contains(r#"class="toc-level-3""#));
    }

    #[test]
    fn toc_omitted_without_headings() {
        let mut data = sample();
        data.toc.clear();
        let html = TemplateRegistry::load().render("single", &data).unwrap();
        assert!(!html.contains("On this page"));
    }

    #[test]
    fn empty_index_lists_directory() {
        let data = TemplateData {
            content: String::new(),
            title: "Index of docs".to_string(),
            is_index: true,
            toc: vec![],
            ..sample()
        };
        let html = TemplateRegistry::load().render("index", &data).unwrap();
        assert!(html.contains("<h1>Index of docs</h1>"));
        assert!(html.contains(r#"<ul class="listing">"#));
        assert!(html.contains(r#"class="index-page""#));
    }

    #[test]
    fn index_with_content_renders_it() {
        let data = TemplateData {
            is_index: true,
            ..sample()
        };
        let html = TemplateRegistry::load().render("index", &data).unwrap();
        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(!html.contains(r#"<ul class="listing">"#));
    }

    #[test]
    fn titles_and_names_are_escaped() {
        let mut data = sample();
        data.title = "<script>alert('xss')</script>".to_string();
        data.files = vec![entry("<b>.md", false, "/x.html")];
        let html = TemplateRegistry::load().render("single", &data).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;.md"));
    }
}
