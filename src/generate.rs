//! HTML site generation.
//!
//! Walks the source tree once, depth first, and mirrors it into the output
//! directory. Every node gets an explicit [`Decision`]:
//!
//! | Node | Decision | Effect |
//! |------|----------|--------|
//! | the output directory | `Skip(OutputDir)` | subtree not visited |
//! | `.name` / `_name` directory (not the root) | `Skip(Ignored)` | subtree not visited |
//! | any other directory | `Index` | `index.html` guaranteed |
//! | `*.md` / `*.markdown` / `*.mkd` file | `Render` | page written |
//! | `index.md` / `index.markdown` / `index.mkd` | `Ignore` | read by the parent's `Index` |
//! | anything else | `Ignore` | nothing |
//!
//! ## Output Structure
//!
//! ```text
//! docs/                      public/
//! ├── index.md         →     ├── index.html          # from index.md
//! ├── intro.md         →     ├── intro.html
//! ├── _drafts/               │                       # ignored
//! └── guide/           →     └── guide/
//!     └── setup.md     →         ├── index.html      # synthesized listing
//!                                └── setup.html
//! ```
//!
//! ## Index pages
//!
//! An existing `index.html` is never touched: the synthesizer only fills
//! gaps. Document pages, by contrast, are rewritten on every run.
//!
//! Index files are opened with create-new semantics, so the existence check
//! and the write cannot race with another writer.
//!
//! ## Failure
//!
//! The first error stops the walk. Pages written before it stay on disk.

use crate::config::GeneratorConfig;
use crate::listing::directory_listing;
use crate::markdown::{MarkdownEngine, MarkdownError};
use crate::paths::{self, OutputPaths};
use crate::templates::{TemplateError, TemplateRegistry};
use crate::types::{FileEntry, TemplateData, TocEntry};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to list {path}: {source}")]
    List { path: PathBuf, source: io::Error },
    #[error("failed to convert {path}: {source}")]
    Convert {
        path: PathBuf,
        source: MarkdownError,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("failed to resolve {path}: {source}")]
    Resolve { path: PathBuf, source: io::Error },
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("output directory {0} is the source root")]
    OutputIsRoot(PathBuf),
}

/// Why a directory's subtree is not visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutputDir,
    Ignored,
}

/// What the walker does with one node of the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Index,
    Render,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Written,
    /// An `index.html` was already there.
    Kept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub outcome: IndexOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Everything one run wrote or kept, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub root: PathBuf,
    pub output: PathBuf,
    pub indexes: Vec<IndexRecord>,
    pub pages: Vec<PageRecord>,
    /// Directories whose subtree was skipped.
    pub skipped: usize,
}

impl GenerateReport {
    pub fn indexes_written(&self) -> usize {
        self.indexes
            .iter()
            .filter(|r| r.outcome == IndexOutcome::Written)
            .count()
    }
}

/// Owns the resolved paths, the layouts and the markdown engine for a run.
pub struct Generator<E> {
    paths: OutputPaths,
    templates: TemplateRegistry,
    engine: E,
}

impl<E: MarkdownEngine> Generator<E> {
    /// Resolve both paths to absolute, normalized form.
    ///
    /// Fails if they resolve to the same directory: the output would then be
    /// both skipped and written into.
    pub fn new(config: GeneratorConfig, engine: E) -> Result<Self, GenerateError> {
        let root = resolve(&config.root_path)?;
        let output = resolve(&config.output_path)?;
        if root == output {
            return Err(GenerateError::OutputIsRoot(output));
        }
        Ok(Self {
            paths: OutputPaths::new(root, output),
            templates: TemplateRegistry::load(),
            engine,
        })
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Classify one node. `path` must be absolute and under the root.
    pub fn decide(&self, path: &Path, is_dir: bool) -> Decision {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if is_dir {
            if path == self.paths.output() {
                Decision::Skip(SkipReason::OutputDir)
            } else if path != self.paths.root() && paths::is_ignored(name) {
                Decision::Skip(SkipReason::Ignored)
            } else {
                Decision::Index
            }
        } else if paths::is_ignored(name)
            || !paths::is_markdown(name)
            || paths::is_index_source(name)
        {
            Decision::Ignore
        } else {
            Decision::Render
        }
    }

    /// Walk the whole tree, stopping at the first error.
    pub fn generate(&self) -> Result<GenerateReport, GenerateError> {
        let mut report = GenerateReport {
            root: self.paths.root().to_path_buf(),
            output: self.paths.output().to_path_buf(),
            ..Default::default()
        };

        let mut walker = WalkDir::new(self.paths.root())
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|source| GenerateError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.paths.root().to_path_buf()),
                source,
            })?;
            let path = entry.path();

            match self.decide(path, entry.file_type().is_dir()) {
                Decision::Skip(reason) => {
                    debug!(path = %path.display(), ?reason, "skipping directory");
                    walker.skip_current_dir();
                    report.skipped += 1;
                }
                Decision::Index => {
                    let listing =
                        directory_listing(path, &self.paths).map_err(|source| {
                            GenerateError::List {
                                path: path.to_path_buf(),
                                source,
                            }
                        })?;
                    report.indexes.push(self.ensure_index(path, listing)?);
                }
                Decision::Render => {
                    report.pages.push(self.render_document(path)?);
                }
                Decision::Ignore => {
                    trace!(path = %path.display(), "ignoring file");
                }
            }
        }

        info!(
            pages = report.pages.len(),
            indexes = report.indexes_written(),
            "generation complete"
        );
        Ok(report)
    }

    /// Guarantee `index.html` for `dir`, leaving an existing one untouched.
    ///
    /// Content comes from `dir/index.md` (or `index.markdown`, `index.mkd`)
    /// when present. Without it the page is just the title and `listing`.
    pub fn ensure_index(
        &self,
        dir: &Path,
        listing: Vec<FileEntry>,
    ) -> Result<IndexRecord, GenerateError> {
        let output = self.paths.index_path(dir);
        let record = |outcome| IndexRecord {
            dir: dir.to_path_buf(),
            output: output.clone(),
            outcome,
        };

        if output.exists() {
            debug!(path = %output.display(), "index exists, keeping");
            return Ok(record(IndexOutcome::Kept));
        }

        let (content, toc) = match paths::index_source(dir) {
            Some(source) => self.convert(&source)?,
            None => (String::new(), Vec::new()),
        };

        let data = TemplateData {
            content,
            title: format!("Index of {}", base_name(dir)),
            files: listing,
            toc,
            is_index: true,
        };
        let html = self.templates.render("index", &data)?;

        create_parent(&output)?;
        let written = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&output)
            .and_then(|mut file| file.write_all(html.as_bytes()));
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %output.display(), "index appeared concurrently, keeping");
                return Ok(record(IndexOutcome::Kept));
            }
            Err(source) => {
                return Err(GenerateError::Write {
                    path: output.clone(),
                    source,
                });
            }
        }

        info!(path = %output.display(), "wrote index");
        Ok(record(IndexOutcome::Written))
    }

    /// Render one markdown document, overwriting any previous output.
    pub fn render_document(&self, path: &Path) -> Result<PageRecord, GenerateError> {
        let (content, toc) = self.convert(path)?;

        let dir = path.parent().unwrap_or(self.paths.root());
        let files = directory_listing(dir, &self.paths).map_err(|source| GenerateError::List {
            path: dir.to_path_buf(),
            source,
        })?;

        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = TemplateData {
            content,
            title,
            files,
            toc,
            is_index: false,
        };
        let html = self.templates.render("single", &data)?;

        let output = self.paths.page_path(path);
        create_parent(&output)?;
        fs::write(&output, html).map_err(|source| GenerateError::Write {
            path: output.clone(),
            source,
        })?;

        info!(source = %path.display(), output = %output.display(), "rendered page");
        Ok(PageRecord {
            source: path.to_path_buf(),
            output,
        })
    }

    /// Read `path` and run both engine operations on it.
    fn convert(&self, path: &Path) -> Result<(String, Vec<TocEntry>), GenerateError> {
        let bytes = fs::read(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let converted = self
            .engine
            .convert(&bytes)
            .and_then(|html| Ok((html, self.engine.extract_toc(&bytes)?)));
        converted.map_err(|source| GenerateError::Convert {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn resolve(path: &Path) -> Result<PathBuf, GenerateError> {
    std::path::absolute(path)
        .map(|p| paths::normalize(&p))
        .map_err(|source| GenerateError::Resolve {
            path: path.to_path_buf(),
            source,
        })
}

fn create_parent(path: &Path) -> Result<(), GenerateError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|source| GenerateError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })
}

fn base_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}
