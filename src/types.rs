//! Records shared by the pipeline, the markdown engine and the templates.
//!
//! These are plain data: the walker builds them, the engine fills in
//! [`TocEntry`] values, and the template registry reads [`TemplateData`].

use std::path::PathBuf;

/// One navigable child of a directory, as shown in sidebars and index pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File or directory name (`..` for the synthetic parent entry)
    pub name: String,
    pub is_dir: bool,
    /// Source path of the entry
    pub path: PathBuf,
    /// `path` with its markdown extension stripped
    pub route_path: PathBuf,
    /// Site-absolute link to the generated page (`/docs/`, `/docs/page.html`)
    pub url: String,
}

/// One heading extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    /// Heading depth, 1–6
    pub level: u8,
    /// In-page anchor
    pub id: String,
}

/// The record handed to a named layout in the template registry.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    /// Pre-rendered HTML fragment, inserted unescaped
    pub content: String,
    pub title: String,
    /// Listing of the directory the rendered page lives in
    pub files: Vec<FileEntry>,
    pub toc: Vec<TocEntry>,
    /// Set for directory index pages
    pub is_index: bool,
}
