//! Source-to-output path mapping.
//!
//! The output tree mirrors the source tree one to one:
//!
//! ```text
//! docs/                       public/
//! ├── index.md          →     ├── index.html
//! ├── intro.md          →     ├── intro.html
//! └── guide/            →     └── guide/
//!     └── setup.markdown →        ├── index.html      (synthesized)
//!                                 └── setup.html
//! ```
//!
//! Everything here except [`index_source`] is a pure function of the root,
//! the output directory and the source path.

use std::path::{Component, Path, PathBuf};

/// Extensions recognized as markdown documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mkd"];

/// Stem of the per-directory source that feeds the synthesized index, in
/// any of the [`MARKDOWN_EXTENSIONS`].
pub const INDEX_STEM: &str = "index";

/// Name of the per-directory generated index.
pub const INDEX_PAGE: &str = "index.html";

/// Names starting with `.` or `_` are never published.
pub fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// Whether `name` carries one of [`MARKDOWN_EXTENSIONS`].
///
/// The match is case-sensitive: `README.MD` is not a document.
pub fn is_markdown(name: &str) -> bool {
    markdown_extension(name).is_some()
}

fn markdown_extension(name: &str) -> Option<&'static str> {
    MARKDOWN_EXTENSIONS.iter().copied().find(|ext| {
        name.len() > ext.len() + 1
            && name.ends_with(ext)
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}

/// Whether `name` is a directory's index source (`index.md`,
/// `index.markdown` or `index.mkd`). Such files are never rendered as
/// documents: their page would land on the directory's `index.html`.
pub fn is_index_source(name: &str) -> bool {
    markdown_extension(name).is_some_and(|ext| name.len() == INDEX_STEM.len() + ext.len() + 1)
        && name.starts_with(INDEX_STEM)
}

/// The index source present in `dir`, checked in [`MARKDOWN_EXTENSIONS`]
/// order.
pub fn index_source(dir: &Path) -> Option<PathBuf> {
    MARKDOWN_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{INDEX_STEM}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Strip a trailing markdown extension from `path`, if it has one.
///
/// ```
/// use mdtree::paths::route_path;
/// use std::path::Path;
///
/// assert_eq!(route_path(Path::new("a/b.md")), Path::new("a/b"));
/// assert_eq!(route_path(Path::new("a/b.txt")), Path::new("a/b.txt"));
/// ```
pub fn route_path(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    match markdown_extension(name) {
        Some(ext) => path.with_file_name(&name[..name.len() - ext.len() - 1]),
        None => path.to_path_buf(),
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the start of a relative path is kept, and
/// one that would climb above `/` is dropped, matching how the OS resolves
/// `/..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Maps source paths under `root` to their mirrored location under `output`.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    root: PathBuf,
    output: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Path of `path` relative to the root. Paths outside the root map to
    /// themselves, which only happens if a caller hands in a foreign path.
    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Destination of a markdown document: its extension becomes `.html`.
    pub fn page_path(&self, source: &Path) -> PathBuf {
        self.output
            .join(self.relative(source))
            .with_extension("html")
    }

    /// Destination of a directory's index page. The root maps to
    /// `output/index.html`.
    pub fn index_path(&self, dir: &Path) -> PathBuf {
        self.output.join(self.relative(dir)).join(INDEX_PAGE)
    }

    /// Site-absolute URL of the page generated for `path`.
    ///
    /// Directories link to their index (`/guide/`), documents to their page
    /// (`/guide/setup.html`), and the root to `/`.
    pub fn url_for(&self, path: &Path, is_dir: bool) -> String {
        let relative = normalize(self.relative(path));
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            return "/".to_string();
        }

        let joined = segments.join("/");
        if is_dir {
            format!("/{joined}/")
        } else {
            let stem = route_path(Path::new(&joined));
            format!("/{}.html", stem.to_string_lossy())
        }
    }
}
