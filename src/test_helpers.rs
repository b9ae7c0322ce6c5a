//! Shared test utilities for the mdtree test suite.
//!
//! Provides tree writers, fixture setup, and markdown engine doubles so
//! generator tests don't depend on the real converter.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_tree(tmp.path(), &["guide/", "guide/setup.md", "_drafts/wip.md"]);
//! write_file(tmp.path(), "index.md", "# Home\n");
//!
//! let generator = stub_generator(tmp.path(), &tmp.path().join("public"));
//! generator.generate().unwrap();
//! assert_output_files(&tmp.path().join("public"), &["guide/index.html", "index.html"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::GeneratorConfig;
use crate::generate::Generator;
use crate::markdown::{MarkdownEngine, MarkdownError, fallback_slug};
use crate::types::TocEntry;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create each entry under `root`. Entries ending in `/` become directories;
/// anything else becomes a file with a one-line heading, parents included.
pub fn write_tree(root: &Path, entries: &[&str]) {
    for entry in entries {
        if let Some(dir) = entry.strip_suffix('/') {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        } else {
            let stem = Path::new(entry)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            write_file(root, entry, &format!("# {stem}\n"));
        }
    }
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

// =========================================================================
// Engine doubles
// =========================================================================

/// Wraps the raw text in `<p>` and reports every `#`-prefixed line as a
/// heading with a fallback slug.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubEngine;

impl MarkdownEngine for StubEngine {
    fn convert(&self, markdown: &[u8]) -> Result<String, MarkdownError> {
        let text = std::str::from_utf8(markdown)?;
        Ok(format!("<p>{}</p>", text.trim()))
    }

    fn extract_toc(&self, markdown: &[u8]) -> Result<Vec<TocEntry>, MarkdownError> {
        let text = std::str::from_utf8(markdown)?;
        Ok(text
            .lines()
            .filter_map(|line| {
                let level = line.bytes().take_while(|b| *b == b'#').count();
                let title = line[level..].trim();
                (level > 0 && !title.is_empty()).then(|| TocEntry {
                    title: title.to_string(),
                    level: level as u8,
                    id: fallback_slug(title),
                })
            })
            .collect())
    }
}

/// Fails every conversion of a document whose text contains `trigger`.
#[derive(Debug, Clone)]
pub struct FailingEngine {
    pub trigger: &'static str,
}

impl MarkdownEngine for FailingEngine {
    fn convert(&self, markdown: &[u8]) -> Result<String, MarkdownError> {
        let text = std::str::from_utf8(markdown)?;
        if text.contains(self.trigger) {
            let invalid = std::str::from_utf8(&[0xff]).unwrap_err();
            return Err(MarkdownError::Utf8(invalid));
        }
        StubEngine.convert(markdown)
    }

    fn extract_toc(&self, markdown: &[u8]) -> Result<Vec<TocEntry>, MarkdownError> {
        StubEngine.extract_toc(markdown)
    }
}

/// Generator over `root` writing to `output`, backed by [`StubEngine`].
pub fn stub_generator(root: &Path, output: &Path) -> Generator<StubEngine> {
    Generator::new(
        GeneratorConfig {
            root_path: root.to_path_buf(),
            output_path: output.to_path_buf(),
        },
        StubEngine,
    )
    .unwrap()
}

// =========================================================================
// Output assertions
// =========================================================================

/// All files under `dir`, relative and `/`-separated, sorted.
pub fn relative_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// Assert the exact set of files under `dir`.
pub fn assert_output_files(dir: &Path, expected: &[&str]) {
    let actual = relative_files(dir);
    let mut expected: Vec<&str> = expected.to_vec();
    expected.sort();
    assert_eq!(
        actual, expected,
        "output files under {} differ",
        dir.display()
    );
}

/// Read a UTF-8 file, panicking with the path on failure.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
